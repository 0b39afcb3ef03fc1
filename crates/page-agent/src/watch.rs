//! Bounded condition watches against the live page.

use std::time::Duration;

use tokio::time::Instant;

use element_locator::{probe, Located, Probe};
use page_port::{PageError, PagePort};

/// Poll until `condition` yields `Some`, or the window elapses.
pub async fn wait_until<T, F, Fut>(
    window: Duration,
    poll: Duration,
    mut condition: F,
) -> Result<Option<T>, PageError>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<Option<T>, PageError>>,
{
    let deadline = Instant::now() + window;
    loop {
        if let Some(value) = condition().await? {
            return Ok(Some(value));
        }
        if Instant::now() >= deadline {
            return Ok(None);
        }
        tokio::time::sleep(poll).await;
    }
}

/// Wait for the first visible match of any selector in the list.
pub async fn wait_for_visible(
    page: &dyn PagePort,
    selectors: &[&str],
    window: Duration,
    poll: Duration,
) -> Result<Option<Located>, PageError> {
    wait_until(window, poll, || async move {
        for selector in selectors {
            if let Probe::Visible(located) = probe(page, selector).await? {
                return Ok(Some(located));
            }
        }
        Ok(None)
    })
    .await
}

/// Wait for the URL to contain any of the needles.
pub async fn wait_for_url(
    page: &dyn PagePort,
    needles: &[&str],
    window: Duration,
    poll: Duration,
) -> Result<Option<String>, PageError> {
    wait_until(window, poll, || async move {
        let url = page.current_url().await?;
        if needles.iter().any(|needle| url.contains(needle)) {
            Ok(Some(url))
        } else {
            Ok(None)
        }
    })
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use page_port::fake::{FakeElement, FakePage};

    #[tokio::test]
    async fn finds_immediately_present_element() {
        let page = FakePage::new("about:blank");
        page.add(FakeElement::new("input").with_name("password"));
        let found = wait_for_visible(
            &page,
            &["input[name=\"password\"]"],
            Duration::from_millis(50),
            Duration::from_millis(5),
        )
        .await
        .unwrap();
        assert!(found.is_some());
    }

    #[tokio::test]
    async fn times_out_when_nothing_appears() {
        tokio::time::pause();
        let page = FakePage::new("about:blank");
        let found = wait_for_visible(
            &page,
            &["input[name=\"password\"]"],
            Duration::from_millis(50),
            Duration::from_millis(5),
        )
        .await
        .unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn url_watch_sees_late_navigation() {
        let page = FakePage::new("https://auth.example.com/login");
        page.set_url("https://auth.example.com/sign-up");
        let url = wait_for_url(
            &page,
            &["/sign-up"],
            Duration::from_millis(50),
            Duration::from_millis(5),
        )
        .await
        .unwrap();
        assert_eq!(url.as_deref(), Some("https://auth.example.com/sign-up"));
    }
}
