use async_trait::async_trait;

use crate::errors::PageError;
use crate::model::{ElementHandle, ElementInfo};

/// The agent's only window onto the live DOM.
///
/// Query results are handles, not data: the DOM is mutable underneath
/// us, so callers re-read element state through [`info`](Self::info) at
/// the moment they act. Event dispatch is explicit because the target
/// pages run client-side frameworks that only react to the synthetic
/// events a real user would produce.
#[async_trait]
pub trait PagePort: Send + Sync {
    /// All elements matching a CSS selector, in DOM order. An invalid
    /// selector is a typed error so strategy chains can skip it.
    async fn query(&self, selector: &str) -> Result<Vec<ElementHandle>, PageError>;

    /// Rendered state of an element. Visibility here means a non-null
    /// layout box — matching but hidden elements must never be acted on.
    async fn info(&self, handle: &ElementHandle) -> Result<ElementInfo, PageError>;

    async fn scroll_into_view(&self, handle: &ElementHandle) -> Result<(), PageError>;
    async fn focus(&self, handle: &ElementHandle) -> Result<(), PageError>;
    async fn click(&self, handle: &ElementHandle) -> Result<(), PageError>;
    async fn blur(&self, handle: &ElementHandle) -> Result<(), PageError>;

    /// Select the current value so the next append replaces it.
    async fn select_all(&self, handle: &ElementHandle) -> Result<(), PageError>;
    async fn clear_value(&self, handle: &ElementHandle) -> Result<(), PageError>;

    /// Append one character to the element's value and dispatch the
    /// input-changed notification for it.
    async fn append_char(&self, handle: &ElementHandle, ch: char) -> Result<(), PageError>;

    /// Dispatch the final change notification after a typing run.
    async fn dispatch_change(&self, handle: &ElementHandle) -> Result<(), PageError>;

    async fn current_url(&self) -> Result<String, PageError>;
    async fn body_text(&self) -> Result<String, PageError>;
    async fn navigate(&self, url: &str) -> Result<(), PageError>;
}
