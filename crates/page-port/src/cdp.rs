//! Chromium-backed [`PagePort`] implementation.
//!
//! All DOM access is routed through injected JavaScript evaluations.
//! Query results are pinned with a `data-pp-handle` attribute so later
//! operations can re-find the exact node; a node that lost its handle
//! (navigation, removal) surfaces as a stale-handle error.

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::page::Page;
use futures::StreamExt;
use tracing::{debug, warn};

use crate::errors::PageError;
use crate::model::{ElementHandle, ElementInfo};
use crate::port::PagePort;

/// Owns the browser process and the CDP event loop task.
pub struct CdpBrowser {
    browser: Browser,
    event_loop: tokio::task::JoinHandle<()>,
}

impl CdpBrowser {
    /// Launch a fresh Chromium instance.
    pub async fn launch(headless: bool) -> Result<Self, PageError> {
        let mut builder = BrowserConfig::builder();
        if !headless {
            builder = builder.with_head();
        }
        let config = builder.build().map_err(PageError::Io)?;
        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|err| PageError::Io(err.to_string()))?;
        let event_loop = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(err) = event {
                    debug!(error = %err, "cdp event loop error");
                }
            }
        });
        Ok(Self {
            browser,
            event_loop,
        })
    }

    /// Attach to an already-running browser exposing a devtools endpoint.
    pub async fn connect(url: &str) -> Result<Self, PageError> {
        let (browser, mut handler) = Browser::connect(url)
            .await
            .map_err(|err| PageError::Io(err.to_string()))?;
        let event_loop = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(err) = event {
                    debug!(error = %err, "cdp event loop error");
                }
            }
        });
        Ok(Self {
            browser,
            event_loop,
        })
    }

    pub async fn open(&self, url: &str) -> Result<CdpPage, PageError> {
        let page = self
            .browser
            .new_page(url)
            .await
            .map_err(|err| PageError::Navigation(err.to_string()))?;
        Ok(CdpPage { page })
    }

    pub async fn shutdown(mut self) {
        if let Err(err) = self.browser.close().await {
            warn!(error = %err, "browser close failed");
        }
        self.event_loop.abort();
    }
}

/// One live tab.
pub struct CdpPage {
    page: Page,
}

impl CdpPage {
    pub fn new(page: Page) -> Self {
        Self { page }
    }

    async fn eval<T: serde::de::DeserializeOwned>(&self, js: String) -> Result<T, PageError> {
        let result = self
            .page
            .evaluate(js)
            .await
            .map_err(|err| PageError::Io(err.to_string()))?;
        result
            .into_value::<T>()
            .map_err(|err| PageError::Io(err.to_string()))
    }

    /// Run a script body against the element pinned by `handle`.
    /// The body must `return` a JSON-serializable value; a `null`
    /// wrapper result means the handle went stale.
    async fn eval_on_element<T: serde::de::DeserializeOwned>(
        &self,
        handle: &ElementHandle,
        body: &str,
    ) -> Result<T, PageError> {
        let selector = serde_json::to_string(&format!("[data-pp-handle=\"{}\"]", handle.0))
            .map_err(|err| PageError::Io(err.to_string()))?;
        let js = format!(
            "(() => {{\n  const el = document.querySelector({selector});\n  if (!el) return null;\n  {body}\n}})()"
        );
        let value: Option<T> = self.eval(js).await?;
        value.ok_or_else(|| PageError::StaleHandle(handle.0.clone()))
    }
}

#[async_trait]
impl PagePort for CdpPage {
    async fn query(&self, selector: &str) -> Result<Vec<ElementHandle>, PageError> {
        let quoted =
            serde_json::to_string(selector).map_err(|err| PageError::Io(err.to_string()))?;
        let js = format!(
            r#"(() => {{
  let list;
  try {{ list = document.querySelectorAll({quoted}); }} catch (err) {{ return null; }}
  window.__ppSeq = window.__ppSeq || 0;
  const out = [];
  for (const el of list) {{
    if (!el.dataset.ppHandle) {{
      window.__ppSeq += 1;
      el.dataset.ppHandle = 'pp-' + window.__ppSeq;
    }}
    out.push(el.dataset.ppHandle);
  }}
  return out;
}})()"#
        );
        let handles: Option<Vec<String>> = self.eval(js).await?;
        match handles {
            Some(handles) => Ok(handles.into_iter().map(ElementHandle).collect()),
            None => Err(PageError::InvalidSelector(selector.to_string())),
        }
    }

    async fn info(&self, handle: &ElementHandle) -> Result<ElementInfo, PageError> {
        self.eval_on_element(
            handle,
            r#"return {
    tag: el.tagName.toLowerCase(),
    text: (el.textContent || '').trim(),
    name: el.name || '',
    type: el.type || '',
    placeholder: el.placeholder || '',
    href: el.href || '',
    className: typeof el.className === 'string' ? el.className : '',
    id: el.id || '',
    value: el.value || '',
    visible: el.offsetParent !== null || el.tagName === 'BODY'
  };"#,
        )
        .await
    }

    async fn scroll_into_view(&self, handle: &ElementHandle) -> Result<(), PageError> {
        let _: bool = self
            .eval_on_element(
                handle,
                "el.scrollIntoView({ behavior: 'smooth', block: 'center' });\n  return true;",
            )
            .await?;
        Ok(())
    }

    async fn focus(&self, handle: &ElementHandle) -> Result<(), PageError> {
        let _: bool = self
            .eval_on_element(handle, "el.focus();\n  return true;")
            .await?;
        Ok(())
    }

    async fn click(&self, handle: &ElementHandle) -> Result<(), PageError> {
        let _: bool = self
            .eval_on_element(handle, "el.click();\n  return true;")
            .await?;
        Ok(())
    }

    async fn blur(&self, handle: &ElementHandle) -> Result<(), PageError> {
        let _: bool = self
            .eval_on_element(handle, "el.blur();\n  return true;")
            .await?;
        Ok(())
    }

    async fn select_all(&self, handle: &ElementHandle) -> Result<(), PageError> {
        let _: bool = self
            .eval_on_element(
                handle,
                "if (typeof el.select === 'function') el.select();\n  return true;",
            )
            .await?;
        Ok(())
    }

    async fn clear_value(&self, handle: &ElementHandle) -> Result<(), PageError> {
        let _: bool = self
            .eval_on_element(handle, "el.value = '';\n  return true;")
            .await?;
        Ok(())
    }

    async fn append_char(&self, handle: &ElementHandle, ch: char) -> Result<(), PageError> {
        let quoted = serde_json::to_string(&ch.to_string())
            .map_err(|err| PageError::Io(err.to_string()))?;
        let body = format!(
            "el.value = el.value + {quoted};\n  el.dispatchEvent(new Event('input', {{ bubbles: true }}));\n  return true;"
        );
        let _: bool = self.eval_on_element(handle, &body).await?;
        Ok(())
    }

    async fn dispatch_change(&self, handle: &ElementHandle) -> Result<(), PageError> {
        let _: bool = self
            .eval_on_element(
                handle,
                "el.dispatchEvent(new Event('change', { bubbles: true }));\n  return true;",
            )
            .await?;
        Ok(())
    }

    async fn current_url(&self) -> Result<String, PageError> {
        let url = self
            .page
            .url()
            .await
            .map_err(|err| PageError::Io(err.to_string()))?;
        Ok(url.unwrap_or_else(|| "about:blank".to_string()))
    }

    async fn body_text(&self) -> Result<String, PageError> {
        self.eval("document.body ? document.body.innerText : ''".to_string())
            .await
    }

    async fn navigate(&self, url: &str) -> Result<(), PageError> {
        self.page
            .goto(url)
            .await
            .map_err(|err| PageError::Navigation(err.to_string()))?;
        Ok(())
    }
}
