//! Low-level, human-paced operations on a located element.
//!
//! Target pages run client-side frameworks that only react to synthetic
//! input events, and bulk value assignment without paced events gets
//! silently ignored or flagged as bot traffic. Reproducing human
//! cadence here is a functional requirement, not cosmetics.
//!
//! All primitives are safe to re-invoke after a transient failure: a
//! retried click has no side effects beyond what re-clicking the same
//! control would naturally cause.

pub mod errors;
pub mod tempo;

pub use errors::PrimitiveError;
pub use tempo::Pacing;

use std::time::Duration;

use tracing::debug;

use page_port::{ElementHandle, PageError, PagePort};

/// Scroll the element into view, let the page settle, then click.
pub async fn click(
    page: &dyn PagePort,
    handle: &ElementHandle,
    pacing: &Pacing,
) -> Result<(), PrimitiveError> {
    page.scroll_into_view(handle).await.map_err(gone)?;
    sleep(pacing.settle()).await;
    page.click(handle).await.map_err(gone)?;
    debug!(handle = handle.as_str(), "click dispatched");
    Ok(())
}

/// A handle that went stale mid-operation means the element stopped
/// being interactable under us, not that the page broke.
fn gone(err: PageError) -> PrimitiveError {
    match err {
        PageError::StaleHandle(handle) => PrimitiveError::NotInteractable(handle),
        other => PrimitiveError::Page(other),
    }
}

/// Focus, select-all, clear, then append characters one at a time with
/// an input notification per character and a single final change
/// notification.
pub async fn type_text(
    page: &dyn PagePort,
    handle: &ElementHandle,
    text: &str,
    pacing: &Pacing,
) -> Result<(), PrimitiveError> {
    page.focus(handle).await.map_err(gone)?;
    page.select_all(handle).await.map_err(gone)?;
    page.clear_value(handle).await.map_err(gone)?;

    for ch in text.chars() {
        page.append_char(handle, ch).await.map_err(gone)?;
        sleep(pacing.keystroke()).await;
    }

    page.dispatch_change(handle).await.map_err(gone)?;
    page.blur(handle).await.map_err(gone)?;
    debug!(handle = handle.as_str(), chars = text.chars().count(), "typing finished");
    Ok(())
}

/// Suspend the calling flow without blocking anything else scheduled on
/// the runtime.
pub async fn wait(duration: Duration) {
    sleep(duration).await;
}

async fn sleep(duration: Duration) {
    if !duration.is_zero() {
        tokio::time::sleep(duration).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use page_port::fake::{FakeElement, FakePage, PageEvent};

    #[tokio::test]
    async fn click_scrolls_then_clicks() {
        let page = FakePage::new("about:blank");
        let button = page.add(FakeElement::new("button").with_text("Go"));
        click(&page, &button, &Pacing::none()).await.unwrap();
        assert_eq!(
            page.events_for(&button),
            vec![PageEvent::ScrollIntoView, PageEvent::Click]
        );
    }

    #[tokio::test]
    async fn typing_emits_one_input_per_char_and_one_change() {
        let page = FakePage::new("about:blank");
        let field = page.add(FakeElement::new("input").with_name("email"));
        type_text(&page, &field, "a@b.co", &Pacing::none())
            .await
            .unwrap();

        assert_eq!(page.value_of(&field).unwrap(), "a@b.co");

        let events = page.events_for(&field);
        let inputs = events
            .iter()
            .filter(|ev| matches!(ev, PageEvent::Input))
            .count();
        let changes = events
            .iter()
            .filter(|ev| matches!(ev, PageEvent::Change))
            .count();
        assert_eq!(inputs, "a@b.co".chars().count());
        assert_eq!(changes, 1);

        // Focus first, change strictly after every input, blur last.
        assert_eq!(events.first(), Some(&PageEvent::Focus));
        assert_eq!(events.last(), Some(&PageEvent::Blur));
        let change_pos = events
            .iter()
            .position(|ev| matches!(ev, PageEvent::Change))
            .unwrap();
        let last_input = events
            .iter()
            .rposition(|ev| matches!(ev, PageEvent::Input))
            .unwrap();
        assert!(change_pos > last_input);
    }

    #[tokio::test]
    async fn typing_replaces_any_prior_value() {
        let page = FakePage::new("about:blank");
        let field = page.add(FakeElement::new("input").with_value("stale"));
        type_text(&page, &field, "new", &Pacing::none())
            .await
            .unwrap();
        assert_eq!(page.value_of(&field).unwrap(), "new");
    }

    #[tokio::test]
    async fn vanished_element_reports_not_interactable() {
        let page = FakePage::new("about:blank");
        let button = page.add(FakeElement::new("button"));
        page.remove(&button);
        let err = click(&page, &button, &Pacing::none()).await.unwrap_err();
        assert!(matches!(err, PrimitiveError::NotInteractable(_)));
    }

    #[tokio::test]
    async fn retry_after_transient_failure_is_safe() {
        let page = FakePage::new("about:blank");
        let field = page.add(FakeElement::new("input"));
        type_text(&page, &field, "ok", &Pacing::none())
            .await
            .unwrap();
        // A second run replaces, it does not double-append.
        type_text(&page, &field, "ok", &Pacing::none())
            .await
            .unwrap();
        assert_eq!(page.value_of(&field).unwrap(), "ok");
    }
}
