//! Target resolution for click/type commands.

use element_locator::{probe, Located, Probe, RoleHint};
use page_port::PagePort;
use pagepilot_core_types::{CommandFailure, ElementRole};

use crate::ExecError;

pub(crate) async fn by_selector(
    page: &dyn PagePort,
    selector: &str,
) -> Result<Located, ExecError> {
    match probe(page, selector).await? {
        Probe::Visible(located) => Ok(located),
        Probe::Hidden(_) => Err(CommandFailure::ElementNotVisible(selector.to_string()).into()),
        Probe::Missing => Err(CommandFailure::ElementNotFound(selector.to_string()).into()),
    }
}

/// Positional lookup against the role's collection, the same collection
/// the page snapshot reported, so controller indexes line up.
pub(crate) async fn by_index(
    page: &dyn PagePort,
    role: ElementRole,
    index: usize,
) -> Result<Located, ExecError> {
    let hint = match role {
        ElementRole::Button => RoleHint::Button,
        ElementRole::Link => RoleHint::Link,
        ElementRole::Input => RoleHint::Input,
    };
    let handles = page.query(hint.selector()).await?;
    let handle = handles.get(index).cloned().ok_or_else(|| {
        CommandFailure::ElementNotFound(format!("{}[{}]", hint.selector(), index))
    })?;
    let info = page.info(&handle).await?;
    if !info.visible {
        return Err(
            CommandFailure::ElementNotVisible(format!("{}[{}]", hint.selector(), index)).into(),
        );
    }
    Ok(Located {
        handle,
        info,
        strategy: element_locator::Strategy::css(hint.selector()),
    })
}

pub(crate) async fn by_field_name(page: &dyn PagePort, name: &str) -> Result<Located, ExecError> {
    let selector = format!(
        "input[name=\"{name}\"], textarea[name=\"{name}\"], select[name=\"{name}\"]"
    );
    match probe(page, &selector).await? {
        Probe::Visible(located) => Ok(located),
        Probe::Hidden(_) => Err(CommandFailure::ElementNotVisible(name.to_string()).into()),
        Probe::Missing => Err(CommandFailure::ElementNotFound(name.to_string()).into()),
    }
}
