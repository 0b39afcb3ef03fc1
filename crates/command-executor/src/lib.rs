//! Interprets one controller command against the live page.
//!
//! Every execution path produces a [`CommandReport`]: either a typed
//! success payload or a typed failure. Nothing thrown by the page or
//! the primitives escapes this boundary uncaught — the poll loop above
//! only ever sees reports.

mod resolve;

use tracing::{info, warn};

use element_locator::{locate, RoleHint, Strategy};
use interaction_primitives::{click, type_text, wait, Pacing, PrimitiveError};
use page_port::{PageError, PagePort};
use pagepilot_core_types::{
    CheckObservation, Command, CommandFailure, CommandKind, CommandOutcome, CommandReport,
    SessionId,
};

use resolve::{by_field_name, by_index, by_selector};

/// Internal fault channel: typed failures go out as such, page-level
/// faults go out as raw error strings, exactly like the wire expects.
#[derive(Debug)]
pub(crate) enum ExecError {
    Failure(CommandFailure),
    Infra(String),
}

impl From<CommandFailure> for ExecError {
    fn from(failure: CommandFailure) -> Self {
        ExecError::Failure(failure)
    }
}

impl From<PageError> for ExecError {
    fn from(err: PageError) -> Self {
        ExecError::Infra(err.to_string())
    }
}

impl From<PrimitiveError> for ExecError {
    fn from(err: PrimitiveError) -> Self {
        match err {
            // "Not interactable at call time" is the visibility gate
            // firing late; report it as such.
            PrimitiveError::NotInteractable(detail) => {
                ExecError::Failure(CommandFailure::ElementNotVisible(detail))
            }
            PrimitiveError::Page(err) => ExecError::Infra(err.to_string()),
        }
    }
}

pub struct CommandExecutor<'a> {
    page: &'a dyn PagePort,
    session: SessionId,
    pacing: Pacing,
}

impl<'a> CommandExecutor<'a> {
    pub fn new(page: &'a dyn PagePort, session: SessionId, pacing: Pacing) -> Self {
        Self {
            page,
            session,
            pacing,
        }
    }

    /// Execute the command and return its report. Infallible by
    /// construction: failures become failure reports.
    pub async fn execute(&self, command: &Command) -> CommandReport {
        let url = self
            .page
            .current_url()
            .await
            .unwrap_or_else(|_| "unknown".to_string());

        match self.run(command).await {
            Ok(outcome) => {
                info!(command = command.kind.name(), "command succeeded");
                CommandReport::new(self.session.clone(), command.clone(), url, Ok(outcome))
            }
            Err(ExecError::Failure(failure)) => {
                warn!(command = command.kind.name(), %failure, "command failed");
                CommandReport::new(self.session.clone(), command.clone(), url, Err(failure))
            }
            Err(ExecError::Infra(error)) => {
                warn!(command = command.kind.name(), error, "command failed on page fault");
                CommandReport::failed(self.session.clone(), command.clone(), url, error)
            }
        }
    }

    async fn run(&self, command: &Command) -> Result<CommandOutcome, ExecError> {
        match &command.kind {
            CommandKind::Click {
                selector,
                index,
                role,
                text,
                delay_ms,
            } => {
                self.run_click(
                    selector.as_deref(),
                    *index,
                    *role,
                    text.as_deref(),
                    *delay_ms,
                )
                .await
            }
            CommandKind::TypeText {
                selector,
                index,
                name,
                value,
            } => {
                self.run_type(selector.as_deref(), *index, name.as_deref(), value)
                    .await
            }
            CommandKind::Wait { duration_ms } => {
                let duration = duration_ms.unwrap_or(1000);
                wait(std::time::Duration::from_millis(duration)).await;
                Ok(CommandOutcome::waited(duration))
            }
            CommandKind::Navigate { url } => self.run_navigate(url).await,
            CommandKind::Check {
                condition,
                selector,
                text,
            } => {
                self.run_check(condition, selector.as_deref(), text.as_deref())
                    .await
            }
            CommandKind::Complete { message } => Ok(CommandOutcome::completed(message.clone())),
        }
    }

    async fn run_click(
        &self,
        selector: Option<&str>,
        index: Option<usize>,
        role: Option<pagepilot_core_types::ElementRole>,
        text: Option<&str>,
        delay_ms: Option<u64>,
    ) -> Result<CommandOutcome, ExecError> {
        wait(self.pacing.pre_action(delay_ms)).await;

        let located = if let Some(selector) = selector {
            by_selector(self.page, selector).await?
        } else if let Some(index) = index {
            let role = role.ok_or_else(|| {
                CommandFailure::ElementNotFound(format!(
                    "index {} given without an element role",
                    index
                ))
            })?;
            by_index(self.page, role, index).await?
        } else if let Some(text) = text {
            locate(self.page, &[Strategy::text(text)], RoleHint::Clickable)
                .await
                .map_err(|_| CommandFailure::ElementNotFound(format!("text:{}", text)))?
        } else {
            return Err(CommandFailure::ElementNotFound(
                "click without selector, index or text".to_string(),
            )
            .into());
        };

        click(self.page, &located.handle, &self.pacing).await?;

        let label = located.info.match_text();
        let label = if label.is_empty() {
            None
        } else {
            Some(label.to_string())
        };
        Ok(CommandOutcome::clicked(located.info.tag.clone(), label))
    }

    async fn run_type(
        &self,
        selector: Option<&str>,
        index: Option<usize>,
        name: Option<&str>,
        value: &str,
    ) -> Result<CommandOutcome, ExecError> {
        let located = if let Some(selector) = selector {
            by_selector(self.page, selector).await?
        } else if let Some(index) = index {
            by_index(self.page, pagepilot_core_types::ElementRole::Input, index).await?
        } else if let Some(name) = name {
            by_field_name(self.page, name).await?
        } else {
            return Err(CommandFailure::ElementNotFound(
                "type without selector, index or field name".to_string(),
            )
            .into());
        };

        type_text(self.page, &located.handle, value, &self.pacing).await?;

        let field = if !located.info.name.is_empty() {
            located.info.name.clone()
        } else if !located.info.placeholder.is_empty() {
            located.info.placeholder.clone()
        } else {
            located.strategy.describe()
        };
        Ok(CommandOutcome::typed(field, value))
    }

    async fn run_navigate(&self, url: &str) -> Result<CommandOutcome, ExecError> {
        // Never fails locally: the navigation may tear this agent
        // instance down, and a port-level error changes nothing about
        // that either way.
        if let Err(err) = self.page.navigate(url).await {
            warn!(url, error = %err, "navigate reported a port error");
        }
        Ok(CommandOutcome::navigated(url))
    }

    async fn run_check(
        &self,
        condition: &str,
        selector: Option<&str>,
        text: Option<&str>,
    ) -> Result<CommandOutcome, ExecError> {
        let observation = match condition {
            "element_exists" => {
                let selector = selector.unwrap_or_default();
                let exists = match self.page.query(selector).await {
                    Ok(handles) => !handles.is_empty(),
                    Err(PageError::InvalidSelector(_)) => false,
                    Err(err) => return Err(err.into()),
                };
                CheckObservation::Exists {
                    exists,
                    selector: selector.to_string(),
                }
            }
            "text_contains" => {
                let needle = text.unwrap_or_default();
                let contains = !needle.is_empty() && self.page.body_text().await?.contains(needle);
                CheckObservation::TextContains {
                    contains,
                    text: needle.to_string(),
                }
            }
            "url_contains" => {
                let needle = text.unwrap_or_default();
                let current_url = self.page.current_url().await?;
                CheckObservation::UrlContains {
                    url_match: !needle.is_empty() && current_url.contains(needle),
                    current_url,
                }
            }
            other => {
                return Err(CommandFailure::UnknownCheckCondition(other.to_string()).into());
            }
        };
        Ok(CommandOutcome::Checked(observation))
    }
}
