//! Combined-field form detection.
//!
//! Markup for sign-up forms varies too much for one selector, but the
//! *combination* of a first-name-like input, a last-name-like input and
//! an email-typed input is a strong signal on its own. This is a page
//! classification aid, not an element locator.

use page_port::{PageError, PagePort};
use tracing::debug;

const FIRST_NAME_FIELDS: &str = "input[name*=\"first\" i], input[placeholder*=\"first\" i]";
const LAST_NAME_FIELDS: &str = "input[name*=\"last\" i], input[placeholder*=\"last\" i]";
const EMAIL_FIELDS: &str = "input[type=\"email\"], input[name=\"email\"]";

/// True when the current DOM carries a visible first-name, last-name
/// and email field at the same time.
pub async fn detect_signup_form(page: &dyn PagePort) -> Result<bool, PageError> {
    let detected = has_visible_match(page, FIRST_NAME_FIELDS).await?
        && has_visible_match(page, LAST_NAME_FIELDS).await?
        && has_visible_match(page, EMAIL_FIELDS).await?;
    if detected {
        debug!("signup form detected via combined field heuristic");
    }
    Ok(detected)
}

async fn has_visible_match(page: &dyn PagePort, selector: &str) -> Result<bool, PageError> {
    let handles = match page.query(selector).await {
        Ok(handles) => handles,
        Err(PageError::InvalidSelector(_)) => return Ok(false),
        Err(err) => return Err(err),
    };
    for handle in handles {
        match page.info(&handle).await {
            Ok(info) if info.visible => return Ok(true),
            Ok(_) => continue,
            Err(PageError::StaleHandle(_)) => continue,
            Err(err) => return Err(err),
        }
    }
    Ok(false)
}
