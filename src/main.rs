use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use pagepilot::cli::{Cli, Commands};
use pagepilot::config::PilotConfig;
use pagepilot::runtime;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = PilotConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Run {
            url,
            headless,
            attach,
        } => {
            let options = runtime::RunOptions {
                start_url: url,
                headless: headless || config.headless,
                attach,
            };
            runtime::run_agent(config, options).await
        }
        Commands::Status => runtime::show_status(&config).await,
        Commands::Reset => runtime::reset_state(&config).await,
    }
}
