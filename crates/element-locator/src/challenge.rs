//! CAPTCHA / verification challenge detection.
//!
//! A visible challenge is always fatal to the current run: the agent
//! surfaces it and halts, never attempts a bypass.

use page_port::{PageError, PagePort};
use tracing::warn;

const CHALLENGE_SELECTORS: &[&str] = &[
    "iframe[src*=\"recaptcha\"]",
    "iframe[src*=\"hcaptcha\"]",
    "div[class*=\"captcha\"]",
    "div[class*=\"challenge\"]",
    "div[class*=\"verification\"]",
    "[data-testid*=\"captcha\"]",
    ".cf-challenge-form",
    "#challenge-form",
    ".challenge-running",
];

/// Returns the selector of the first visible challenge indicator, if
/// any. Selector-syntax misses are skipped like everywhere else.
pub async fn detect_challenge(page: &dyn PagePort) -> Result<Option<String>, PageError> {
    for selector in CHALLENGE_SELECTORS {
        let handles = match page.query(selector).await {
            Ok(handles) => handles,
            Err(PageError::InvalidSelector(_)) => continue,
            Err(err) => return Err(err),
        };
        for handle in handles {
            match page.info(&handle).await {
                Ok(info) if info.visible => {
                    warn!(selector, "challenge indicator visible");
                    return Ok(Some(selector.to_string()));
                }
                Ok(_) => continue,
                Err(PageError::StaleHandle(_)) => continue,
                Err(err) => return Err(err),
            }
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use page_port::fake::{FakeElement, FakePage};

    #[tokio::test]
    async fn visible_challenge_is_detected() {
        let page = FakePage::new("https://auth.example.com/sign-up");
        page.add(FakeElement::new("iframe").with_href("x").with_attr(
            "src",
            "https://www.google.com/recaptcha/api2/anchor",
        ));
        let hit = detect_challenge(&page).await.unwrap();
        assert_eq!(hit.as_deref(), Some("iframe[src*=\"recaptcha\"]"));
    }

    #[tokio::test]
    async fn hidden_challenge_markup_is_ignored() {
        let page = FakePage::new("https://auth.example.com/sign-up");
        page.add(
            FakeElement::new("div")
                .with_class("captcha-placeholder")
                .hidden(),
        );
        assert_eq!(detect_challenge(&page).await.unwrap(), None);
    }

    #[tokio::test]
    async fn class_containment_matches() {
        let page = FakePage::new("about:blank");
        page.add(FakeElement::new("div").with_class("challenge-box"));
        let hit = detect_challenge(&page).await.unwrap();
        assert_eq!(hit.as_deref(), Some("div[class*=\"challenge\"]"));
    }
}
