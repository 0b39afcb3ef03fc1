//! Command-line surface.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("GIT_HASH"),
    ", built ",
    env!("BUILD_DATE"),
    ")"
);

#[derive(Parser, Debug)]
#[command(name = "pagepilot", version, long_version = LONG_VERSION)]
#[command(about = "Controller-driven web page automation agent")]
pub struct Cli {
    /// Path to a configuration file (TOML/JSON/YAML).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Launch the browser and drive the page under controller command.
    Run {
        /// Start URL; defaults to the configured one.
        #[arg(long)]
        url: Option<String>,
        /// Run the browser headless.
        #[arg(long)]
        headless: bool,
        /// Attach to a running browser's devtools endpoint instead of
        /// launching one (e.g. http://127.0.0.1:9222).
        #[arg(long)]
        attach: Option<String>,
    },
    /// Probe controller connectivity and show persisted progress.
    Status,
    /// Clear persisted step state.
    Reset,
}
