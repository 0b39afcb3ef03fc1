//! Page snapshot scan for controller reporting.
//!
//! Produces the same element inventory positional commands resolve
//! against, so an index the controller sends back refers to the element
//! the snapshot described.

use url::Url;

use page_port::{PageError, PagePort};
use pagepilot_core_types::{
    ButtonEntry, ElementInventory, InputEntry, LinkEntry, PageSnapshot, SessionId, SiteHosts,
};

use crate::strategies::{BUTTON_SELECTOR, INPUT_SELECTOR, LINK_SELECTOR};

/// Compute a fresh snapshot of the current page.
pub async fn scan_page(
    page: &dyn PagePort,
    session_id: &SessionId,
    hosts: &SiteHosts,
) -> Result<PageSnapshot, PageError> {
    let url = page.current_url().await?;
    let (hostname, pathname) = split_url(&url);
    let page_type = hosts.classify(&url);

    let mut elements = ElementInventory::default();

    for (index, handle) in page.query(BUTTON_SELECTOR).await?.iter().enumerate() {
        let info = match page.info(handle).await {
            Ok(info) => info,
            Err(PageError::StaleHandle(_)) => continue,
            Err(err) => return Err(err),
        };
        elements.buttons.push(ButtonEntry {
            index,
            text: pick_text(&info.text, &info.value),
            kind: info.kind,
            class_name: info.class_name,
            id: info.id,
            visible: info.visible,
        });
    }

    for (index, handle) in page.query(LINK_SELECTOR).await?.iter().enumerate() {
        let info = match page.info(handle).await {
            Ok(info) => info,
            Err(PageError::StaleHandle(_)) => continue,
            Err(err) => return Err(err),
        };
        elements.links.push(LinkEntry {
            index,
            text: info.text,
            href: info.href,
            class_name: info.class_name,
            id: info.id,
            visible: info.visible,
        });
    }

    for (index, handle) in page.query(INPUT_SELECTOR).await?.iter().enumerate() {
        let info = match page.info(handle).await {
            Ok(info) => info,
            Err(PageError::StaleHandle(_)) => continue,
            Err(err) => return Err(err),
        };
        elements.inputs.push(InputEntry {
            index,
            name: info.name,
            kind: info.kind,
            placeholder: info.placeholder,
            class_name: info.class_name,
            id: info.id,
            visible: info.visible,
        });
    }

    Ok(PageSnapshot {
        session_id: session_id.clone(),
        url,
        hostname,
        pathname,
        page_type,
        elements,
    })
}

fn pick_text(text: &str, value: &str) -> String {
    if text.is_empty() {
        value.to_string()
    } else {
        text.to_string()
    }
}

fn split_url(url: &str) -> (String, String) {
    match Url::parse(url) {
        Ok(parsed) => (
            parsed.host_str().unwrap_or_default().to_string(),
            parsed.path().to_string(),
        ),
        Err(_) => (String::new(), String::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use page_port::fake::{FakeElement, FakePage};
    use pagepilot_core_types::PageType;

    fn hosts() -> SiteHosts {
        SiteHosts::new("app.example.com", "auth.example.com")
    }

    #[tokio::test]
    async fn inventories_buttons_links_and_inputs() {
        let page = FakePage::new("https://app.example.com/");
        page.add(
            FakeElement::new("button")
                .with_text("Sign in")
                .with_class("btn btn--ghost"),
        );
        page.add(
            FakeElement::new("input")
                .with_kind("submit")
                .with_value("Go"),
        );
        page.add(
            FakeElement::new("a")
                .with_href("https://app.example.com/dashboard")
                .with_text("Dashboard")
                .hidden(),
        );
        page.add(FakeElement::new("input").with_name("q"));

        let session = SessionId("session-scan".into());
        let snap = scan_page(&page, &session, &hosts()).await.unwrap();

        assert_eq!(snap.page_type, PageType::Main);
        assert_eq!(snap.hostname, "app.example.com");
        assert_eq!(snap.pathname, "/");

        assert_eq!(snap.elements.buttons.len(), 2);
        assert_eq!(snap.elements.buttons[0].text, "Sign in");
        // Value-only submit buttons fall back to their value.
        assert_eq!(snap.elements.buttons[1].text, "Go");
        assert_eq!(snap.elements.buttons[1].index, 1);

        assert_eq!(snap.elements.links.len(), 1);
        assert!(!snap.elements.links[0].visible);

        // The submit input is also part of the input collection.
        assert_eq!(snap.elements.inputs.len(), 2);
    }

    #[tokio::test]
    async fn identical_pages_produce_equal_snapshots() {
        let page = FakePage::new("https://auth.example.com/sign-up");
        page.add(FakeElement::new("input").with_name("email"));
        let session = SessionId("session-scan".into());
        let first = scan_page(&page, &session, &hosts()).await.unwrap();
        let second = scan_page(&page, &session, &hosts()).await.unwrap();
        assert_eq!(first, second);
    }
}
