//! Ranked strategy resolution with the visibility gate.

use tracing::{debug, trace};

use page_port::{ElementHandle, ElementInfo, PageError, PagePort};

use crate::errors::LocateError;
use crate::strategies::{RoleHint, Strategy};

/// A successfully located element, with the state it had at match time
/// and the strategy that won.
#[derive(Clone, Debug)]
pub struct Located {
    pub handle: ElementHandle,
    pub info: ElementInfo,
    pub strategy: Strategy,
}

/// Walk the strategy chain in order and return the first visible match.
///
/// Hidden matches do not win and do not stop the chain. Invalid
/// selectors are expected across browsers and selector dialects; they
/// are skipped, not raised.
pub async fn locate(
    page: &dyn PagePort,
    strategies: &[Strategy],
    role: RoleHint,
) -> Result<Located, LocateError> {
    for strategy in strategies {
        let matches = match strategy.resolve(page, role).await {
            Ok(matches) => matches,
            Err(PageError::InvalidSelector(selector)) => {
                trace!(selector, "skipping unsupported selector");
                continue;
            }
            Err(err) => return Err(err.into()),
        };

        let total = matches.len();
        if let Some((handle, info)) = matches.into_iter().find(|(_, info)| info.visible) {
            debug!(
                strategy = %strategy.describe(),
                element = %info.describe(),
                "strategy matched"
            );
            return Ok(Located {
                handle,
                info,
                strategy: strategy.clone(),
            });
        }
        if total > 0 {
            trace!(
                strategy = %strategy.describe(),
                matches = total,
                "matches present but none visible"
            );
        }
    }

    Err(LocateError::NotFound {
        target: describe_chain(strategies),
    })
}

/// Outcome of resolving one concrete selector, visibility included.
/// Unlike [`locate`], a hidden match is reported as such so the caller
/// can distinguish "not found" from "found but not interactable".
#[derive(Clone, Debug)]
pub enum Probe {
    Visible(Located),
    Hidden(ElementHandle),
    Missing,
}

pub async fn probe(page: &dyn PagePort, selector: &str) -> Result<Probe, PageError> {
    let handles = match page.query(selector).await {
        Ok(handles) => handles,
        Err(PageError::InvalidSelector(_)) => return Ok(Probe::Missing),
        Err(err) => return Err(err),
    };

    let mut hidden = None;
    for handle in handles {
        match page.info(&handle).await {
            Ok(info) if info.visible => {
                return Ok(Probe::Visible(Located {
                    handle,
                    info,
                    strategy: Strategy::css(selector),
                }));
            }
            Ok(_) => {
                hidden.get_or_insert(handle);
            }
            Err(PageError::StaleHandle(_)) => continue,
            Err(err) => return Err(err),
        }
    }

    Ok(match hidden {
        Some(handle) => Probe::Hidden(handle),
        None => Probe::Missing,
    })
}

fn describe_chain(strategies: &[Strategy]) -> String {
    let parts: Vec<String> = strategies.iter().map(Strategy::describe).collect();
    parts.join(" | ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use page_port::fake::{FakeElement, FakePage};

    fn sign_in_chain() -> Vec<Strategy> {
        vec![
            Strategy::css("a[href*=\"login\"]"),
            Strategy::css("a:contains(\"Sign in\")"),
            Strategy::text("sign in"),
        ]
    }

    #[tokio::test]
    async fn strategy_order_is_total() {
        // Only the last strategy matches.
        let page = FakePage::new("https://app.example.com/");
        let by_text = page.add(FakeElement::new("button").with_text("Sign in now"));
        let located = locate(&page, &sign_in_chain(), RoleHint::Clickable)
            .await
            .unwrap();
        assert_eq!(located.handle, by_text);
        assert_eq!(located.strategy, Strategy::text("sign in"));

        // With an earlier match present, the earlier strategy wins.
        let link = page.add(
            FakeElement::new("a")
                .with_href("https://app.example.com/login")
                .with_text("Log in"),
        );
        let located = locate(&page, &sign_in_chain(), RoleHint::Clickable)
            .await
            .unwrap();
        assert_eq!(located.handle, link);
        assert_eq!(located.strategy, Strategy::css("a[href*=\"login\"]"));
    }

    #[tokio::test]
    async fn hidden_matches_never_win() {
        let page = FakePage::new("https://app.example.com/");
        page.add(
            FakeElement::new("a")
                .with_href("https://app.example.com/login")
                .with_text("Sign in")
                .hidden(),
        );
        let err = locate(&page, &sign_in_chain(), RoleHint::Clickable)
            .await
            .unwrap_err();
        assert!(matches!(err, LocateError::NotFound { .. }));
    }

    #[tokio::test]
    async fn hidden_match_falls_through_to_later_strategy() {
        let page = FakePage::new("https://app.example.com/");
        page.add(
            FakeElement::new("a")
                .with_href("https://app.example.com/login")
                .hidden(),
        );
        let visible = page.add(FakeElement::new("button").with_text("Sign In"));
        let located = locate(&page, &sign_in_chain(), RoleHint::Clickable)
            .await
            .unwrap();
        assert_eq!(located.handle, visible);
    }

    #[tokio::test]
    async fn unsupported_selectors_are_skipped_not_fatal() {
        let page = FakePage::new("https://app.example.com/");
        let target = page.add(FakeElement::new("button").with_text("Sign in"));
        let chain = vec![
            Strategy::css("a:has-text(\"Sign in\")"),
            Strategy::text("sign in"),
        ];
        let located = locate(&page, &chain, RoleHint::Button).await.unwrap();
        assert_eq!(located.handle, target);
    }

    #[tokio::test]
    async fn text_match_is_case_insensitive_containment() {
        let page = FakePage::new("about:blank");
        let target = page.add(FakeElement::new("a").with_href("/x").with_text("SIGN UP today"));
        let located = locate(&page, &[Strategy::text("sign up")], RoleHint::Link)
            .await
            .unwrap();
        assert_eq!(located.handle, target);
    }

    #[tokio::test]
    async fn probe_distinguishes_hidden_from_missing() {
        let page = FakePage::new("about:blank");
        assert!(matches!(
            probe(&page, "#missing").await.unwrap(),
            Probe::Missing
        ));

        page.add(FakeElement::new("button").with_id("ghost").hidden());
        assert!(matches!(
            probe(&page, "#ghost").await.unwrap(),
            Probe::Hidden(_)
        ));

        page.add(FakeElement::new("button").with_id("ghost"));
        assert!(matches!(
            probe(&page, "#ghost").await.unwrap(),
            Probe::Visible(_)
        ));
    }
}
