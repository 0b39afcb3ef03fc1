//! Selection strategy descriptors.

use serde::{Deserialize, Serialize};

use page_port::{ElementHandle, ElementInfo, PageError, PagePort};

/// Elements `button`-shaped positional and text lookups resolve against.
pub const BUTTON_SELECTOR: &str = "button, input[type=\"submit\"], input[type=\"button\"]";
/// Anchor elements with a destination.
pub const LINK_SELECTOR: &str = "a[href]";
/// Form controls a `type` command can target.
pub const INPUT_SELECTOR: &str = "input, textarea, select";
/// Union scanned by text-containment lookups with no narrower role.
pub const CLICKABLE_SELECTOR: &str =
    "button, a[href], input[type=\"submit\"], input[type=\"button\"]";

/// Which element family a lookup should consider.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoleHint {
    Button,
    Link,
    Input,
    /// Anything a user could click.
    #[default]
    Clickable,
}

impl RoleHint {
    pub fn selector(self) -> &'static str {
        match self {
            RoleHint::Button => BUTTON_SELECTOR,
            RoleHint::Link => LINK_SELECTOR,
            RoleHint::Input => INPUT_SELECTOR,
            RoleHint::Clickable => CLICKABLE_SELECTOR,
        }
    }
}

/// One ranked method of finding a target element. Strategies are tried
/// strictly in the order given; the first one with a visible match wins.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Strategy {
    /// Attribute/CSS selector match.
    Css { selector: String },
    /// Case-insensitive text containment over the hinted element family.
    Text { needle: String },
}

impl Strategy {
    pub fn css(selector: impl Into<String>) -> Self {
        Strategy::Css {
            selector: selector.into(),
        }
    }

    pub fn text(needle: impl Into<String>) -> Self {
        Strategy::Text {
            needle: needle.into(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Strategy::Css { .. } => "css",
            Strategy::Text { .. } => "text",
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Strategy::Css { selector } => format!("css:{}", selector),
            Strategy::Text { needle } => format!("text:{}", needle),
        }
    }

    /// All raw matches for this strategy, visibility not yet applied.
    /// Invalid selector syntax is reported as an error so the resolver
    /// can skip the entry.
    pub(crate) async fn resolve(
        &self,
        page: &dyn PagePort,
        role: RoleHint,
    ) -> Result<Vec<(ElementHandle, ElementInfo)>, PageError> {
        match self {
            Strategy::Css { selector } => collect(page, selector, |_| true).await,
            Strategy::Text { needle } => {
                let needle = needle.to_lowercase();
                collect(page, role.selector(), |info| {
                    info.match_text().to_lowercase().contains(&needle)
                })
                .await
            }
        }
    }
}

async fn collect<F>(
    page: &dyn PagePort,
    selector: &str,
    keep: F,
) -> Result<Vec<(ElementHandle, ElementInfo)>, PageError>
where
    F: Fn(&ElementInfo) -> bool,
{
    let mut out = Vec::new();
    for handle in page.query(selector).await? {
        match page.info(&handle).await {
            Ok(info) => {
                if keep(&info) {
                    out.push((handle, info));
                }
            }
            // The DOM moved between query and read; skip the casualty.
            Err(PageError::StaleHandle(_)) => continue,
            Err(err) => return Err(err),
        }
    }
    Ok(out)
}
