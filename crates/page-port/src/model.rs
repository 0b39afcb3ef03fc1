use serde::{Deserialize, Serialize};

/// Opaque handle to a DOM element. Valid until the page navigates or
/// the node is removed; stale handles surface as
/// [`PageError::StaleHandle`](crate::PageError::StaleHandle).
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct ElementHandle(pub String);

impl ElementHandle {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Rendered state of one element, read in a single round trip.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ElementInfo {
    /// Lowercase tag name.
    pub tag: String,
    /// Trimmed visible text content.
    pub text: String,
    pub name: String,
    /// The `type` attribute, or the tag's default.
    #[serde(rename = "type")]
    pub kind: String,
    pub placeholder: String,
    pub href: String,
    pub class_name: String,
    pub id: String,
    pub value: String,
    /// Whether the element currently has a rendered layout box.
    pub visible: bool,
}

impl ElementInfo {
    /// Text used for containment matching: visible text, falling back
    /// to the control's value for value-only buttons.
    pub fn match_text(&self) -> &str {
        if self.text.is_empty() {
            &self.value
        } else {
            &self.text
        }
    }

    /// A short human-readable description for logs and reports.
    pub fn describe(&self) -> String {
        let label = self.match_text();
        if label.is_empty() {
            self.tag.clone()
        } else {
            format!("{} \"{}\"", self.tag, label)
        }
    }
}
