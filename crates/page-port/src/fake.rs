//! Deterministic in-memory page for tests.
//!
//! Models a flat element list with a practical subset of CSS selector
//! matching: tag, `#id`, `.class`, and attribute tests (presence, `=`,
//! `*=`, `^=`, `$=`, optional ` i` flag), plus selector groups joined
//! by commas. Pseudo-classes and combinators are rejected with
//! [`PageError::InvalidSelector`], which mirrors how a real selector
//! engine throws on them — locator chains are expected to skip those
//! entries and move on.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::errors::PageError;
use crate::model::{ElementHandle, ElementInfo};
use crate::port::PagePort;

/// Observable event dispatched against a fake element.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PageEvent {
    ScrollIntoView,
    Focus,
    Click,
    Input,
    Change,
    Blur,
}

/// One element in the fake DOM.
#[derive(Clone, Debug, Default)]
pub struct FakeElement {
    pub tag: String,
    pub id: String,
    pub class_name: String,
    pub name: String,
    pub kind: String,
    pub placeholder: String,
    pub href: String,
    pub text: String,
    pub value: String,
    pub visible: bool,
    pub attrs: HashMap<String, String>,
}

impl FakeElement {
    pub fn new(tag: impl Into<String>) -> Self {
        let tag = tag.into();
        let kind = match tag.as_str() {
            "input" => "text".to_string(),
            "button" => "button".to_string(),
            _ => String::new(),
        };
        Self {
            tag,
            kind,
            visible: true,
            ..Default::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_class(mut self, class_name: impl Into<String>) -> Self {
        self.class_name = class_name.into();
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = kind.into();
        self
    }

    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    pub fn with_href(mut self, href: impl Into<String>) -> Self {
        self.href = href.into();
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(key.into(), value.into());
        self
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    fn attribute(&self, name: &str) -> Option<&str> {
        let value = match name {
            "id" => &self.id,
            "class" => &self.class_name,
            "name" => &self.name,
            "type" => &self.kind,
            "placeholder" => &self.placeholder,
            "href" => &self.href,
            "value" => &self.value,
            other => return self.attrs.get(other).map(String::as_str),
        };
        if value.is_empty() {
            None
        } else {
            Some(value)
        }
    }
}

struct Inner {
    url: String,
    seq: u64,
    elements: Vec<(ElementHandle, FakeElement)>,
    events: Vec<(ElementHandle, PageEvent)>,
    navigations: Vec<String>,
}

/// In-memory [`PagePort`] implementation.
pub struct FakePage {
    inner: Mutex<Inner>,
}

impl FakePage {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            inner: Mutex::new(Inner {
                url: url.into(),
                seq: 0,
                elements: Vec::new(),
                events: Vec::new(),
                navigations: Vec::new(),
            }),
        }
    }

    pub fn add(&self, element: FakeElement) -> ElementHandle {
        let mut inner = self.inner.lock();
        inner.seq += 1;
        let handle = ElementHandle(format!("fake-{}", inner.seq));
        inner.elements.push((handle.clone(), element));
        handle
    }

    /// Remove an element, simulating a DOM mutation under the agent.
    pub fn remove(&self, handle: &ElementHandle) {
        self.inner.lock().elements.retain(|(h, _)| h != handle);
    }

    pub fn set_url(&self, url: impl Into<String>) {
        self.inner.lock().url = url.into();
    }

    pub fn events(&self) -> Vec<(ElementHandle, PageEvent)> {
        self.inner.lock().events.clone()
    }

    pub fn events_for(&self, handle: &ElementHandle) -> Vec<PageEvent> {
        self.inner
            .lock()
            .events
            .iter()
            .filter(|(h, _)| h == handle)
            .map(|(_, ev)| *ev)
            .collect()
    }

    pub fn value_of(&self, handle: &ElementHandle) -> Option<String> {
        self.inner
            .lock()
            .elements
            .iter()
            .find(|(h, _)| h == handle)
            .map(|(_, el)| el.value.clone())
    }

    pub fn navigations(&self) -> Vec<String> {
        self.inner.lock().navigations.clone()
    }

    fn record(&self, handle: &ElementHandle, event: PageEvent) -> Result<(), PageError> {
        let mut inner = self.inner.lock();
        if !inner.elements.iter().any(|(h, _)| h == handle) {
            return Err(PageError::StaleHandle(handle.0.clone()));
        }
        inner.events.push((handle.clone(), event));
        Ok(())
    }

    fn mutate<F>(&self, handle: &ElementHandle, f: F) -> Result<(), PageError>
    where
        F: FnOnce(&mut FakeElement),
    {
        let mut inner = self.inner.lock();
        match inner.elements.iter_mut().find(|(h, _)| h == handle) {
            Some((_, element)) => {
                f(element);
                Ok(())
            }
            None => Err(PageError::StaleHandle(handle.0.clone())),
        }
    }
}

#[async_trait]
impl PagePort for FakePage {
    async fn query(&self, selector: &str) -> Result<Vec<ElementHandle>, PageError> {
        let groups = parse_selector_list(selector)?;
        let inner = self.inner.lock();
        let mut out = Vec::new();
        for (handle, element) in &inner.elements {
            if groups.iter().any(|group| group.matches(element)) {
                out.push(handle.clone());
            }
        }
        Ok(out)
    }

    async fn info(&self, handle: &ElementHandle) -> Result<ElementInfo, PageError> {
        let inner = self.inner.lock();
        let element = inner
            .elements
            .iter()
            .find(|(h, _)| h == handle)
            .map(|(_, el)| el)
            .ok_or_else(|| PageError::StaleHandle(handle.0.clone()))?;
        Ok(ElementInfo {
            tag: element.tag.clone(),
            text: element.text.clone(),
            name: element.name.clone(),
            kind: element.kind.clone(),
            placeholder: element.placeholder.clone(),
            href: element.href.clone(),
            class_name: element.class_name.clone(),
            id: element.id.clone(),
            value: element.value.clone(),
            visible: element.visible,
        })
    }

    async fn scroll_into_view(&self, handle: &ElementHandle) -> Result<(), PageError> {
        self.record(handle, PageEvent::ScrollIntoView)
    }

    async fn focus(&self, handle: &ElementHandle) -> Result<(), PageError> {
        self.record(handle, PageEvent::Focus)
    }

    async fn click(&self, handle: &ElementHandle) -> Result<(), PageError> {
        self.record(handle, PageEvent::Click)
    }

    async fn blur(&self, handle: &ElementHandle) -> Result<(), PageError> {
        self.record(handle, PageEvent::Blur)
    }

    async fn select_all(&self, _handle: &ElementHandle) -> Result<(), PageError> {
        Ok(())
    }

    async fn clear_value(&self, handle: &ElementHandle) -> Result<(), PageError> {
        self.mutate(handle, |element| element.value.clear())
    }

    async fn append_char(&self, handle: &ElementHandle, ch: char) -> Result<(), PageError> {
        self.mutate(handle, |element| element.value.push(ch))?;
        self.record(handle, PageEvent::Input)
    }

    async fn dispatch_change(&self, handle: &ElementHandle) -> Result<(), PageError> {
        self.record(handle, PageEvent::Change)
    }

    async fn current_url(&self) -> Result<String, PageError> {
        Ok(self.inner.lock().url.clone())
    }

    async fn body_text(&self) -> Result<String, PageError> {
        let inner = self.inner.lock();
        let mut parts: Vec<&str> = Vec::new();
        for (_, element) in &inner.elements {
            if element.visible && !element.text.is_empty() {
                parts.push(&element.text);
            }
        }
        Ok(parts.join("\n"))
    }

    async fn navigate(&self, url: &str) -> Result<(), PageError> {
        let mut inner = self.inner.lock();
        inner.navigations.push(url.to_string());
        inner.url = url.to_string();
        Ok(())
    }
}

#[derive(Debug)]
struct AttrTest {
    name: String,
    op: AttrOp,
    value: String,
    case_insensitive: bool,
}

#[derive(Debug, Eq, PartialEq)]
enum AttrOp {
    Present,
    Equals,
    Contains,
    StartsWith,
    EndsWith,
}

#[derive(Debug, Default)]
struct CompoundSelector {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attrs: Vec<AttrTest>,
}

impl CompoundSelector {
    fn matches(&self, element: &FakeElement) -> bool {
        if let Some(tag) = &self.tag {
            if !tag.eq_ignore_ascii_case(&element.tag) {
                return false;
            }
        }
        if let Some(id) = &self.id {
            if *id != element.id {
                return false;
            }
        }
        for class in &self.classes {
            if !element
                .class_name
                .split_whitespace()
                .any(|c| c == class.as_str())
            {
                return false;
            }
        }
        for attr in &self.attrs {
            let actual = element.attribute(&attr.name);
            let matched = match (&attr.op, actual) {
                (AttrOp::Present, actual) => actual.is_some(),
                (_, None) => false,
                (op, Some(actual)) => {
                    let (actual, expected) = if attr.case_insensitive {
                        (actual.to_lowercase(), attr.value.to_lowercase())
                    } else {
                        (actual.to_string(), attr.value.clone())
                    };
                    match op {
                        AttrOp::Present => true,
                        AttrOp::Equals => actual == expected,
                        AttrOp::Contains => actual.contains(&expected),
                        AttrOp::StartsWith => actual.starts_with(&expected),
                        AttrOp::EndsWith => actual.ends_with(&expected),
                    }
                }
            };
            if !matched {
                return false;
            }
        }
        true
    }
}

fn parse_selector_list(selector: &str) -> Result<Vec<CompoundSelector>, PageError> {
    if selector.trim().is_empty() {
        return Err(PageError::InvalidSelector(selector.to_string()));
    }
    split_top_level(selector)
        .into_iter()
        .map(|part| parse_compound(selector, part.trim()))
        .collect()
}

/// Split on commas that sit outside attribute brackets.
fn split_top_level(selector: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;
    for (idx, ch) in selector.char_indices() {
        match ch {
            '[' => depth += 1,
            ']' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(&selector[start..idx]);
                start = idx + 1;
            }
            _ => {}
        }
    }
    parts.push(&selector[start..]);
    parts
}

fn parse_compound(full: &str, part: &str) -> Result<CompoundSelector, PageError> {
    let invalid = || PageError::InvalidSelector(full.to_string());
    if part.is_empty() {
        return Err(invalid());
    }

    let mut compound = CompoundSelector::default();
    let chars: Vec<char> = part.chars().collect();
    let mut i = 0usize;

    while i < chars.len() {
        match chars[i] {
            '[' => {
                let close = chars[i..]
                    .iter()
                    .position(|&c| c == ']')
                    .map(|offset| i + offset)
                    .ok_or_else(invalid)?;
                let body: String = chars[i + 1..close].iter().collect();
                compound.attrs.push(parse_attr_test(full, &body)?);
                i = close + 1;
            }
            '#' | '.' => {
                let marker = chars[i];
                i += 1;
                let start = i;
                while i < chars.len() && !matches!(chars[i], '#' | '.' | '[' ) {
                    if is_rejected_syntax(chars[i]) {
                        return Err(invalid());
                    }
                    i += 1;
                }
                let word: String = chars[start..i].iter().collect();
                if word.is_empty() {
                    return Err(invalid());
                }
                if marker == '#' {
                    compound.id = Some(word);
                } else {
                    compound.classes.push(word);
                }
            }
            c if c.is_ascii_alphanumeric() || c == '*' || c == '-' || c == '_' => {
                let start = i;
                while i < chars.len() && !matches!(chars[i], '#' | '.' | '[') {
                    if is_rejected_syntax(chars[i]) {
                        return Err(invalid());
                    }
                    i += 1;
                }
                let word: String = chars[start..i].iter().collect();
                if word != "*" {
                    compound.tag = Some(word);
                }
            }
            _ => return Err(invalid()),
        }
    }

    Ok(compound)
}

/// Pseudo-classes, combinators and descendant whitespace are outside
/// the supported subset.
fn is_rejected_syntax(c: char) -> bool {
    matches!(c, ':' | '>' | '+' | '~') || c.is_whitespace()
}

fn parse_attr_test(full: &str, body: &str) -> Result<AttrTest, PageError> {
    let invalid = || PageError::InvalidSelector(full.to_string());
    let mut body = body.trim().to_string();

    let case_insensitive = if body.ends_with(" i") || body.ends_with(" I") {
        body.truncate(body.len() - 2);
        true
    } else {
        false
    };
    let body = body.trim();

    let (name, op, raw_value) = if let Some(pos) = body.find("*=") {
        (&body[..pos], AttrOp::Contains, &body[pos + 2..])
    } else if let Some(pos) = body.find("^=") {
        (&body[..pos], AttrOp::StartsWith, &body[pos + 2..])
    } else if let Some(pos) = body.find("$=") {
        (&body[..pos], AttrOp::EndsWith, &body[pos + 2..])
    } else if let Some(pos) = body.find('=') {
        (&body[..pos], AttrOp::Equals, &body[pos + 1..])
    } else {
        (body, AttrOp::Present, "")
    };

    let name = name.trim();
    if name.is_empty() || name.contains(':') {
        return Err(invalid());
    }

    let value = raw_value.trim();
    let value = value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .or_else(|| value.strip_prefix('\'').and_then(|v| v.strip_suffix('\'')))
        .unwrap_or(value);

    Ok(AttrTest {
        name: name.to_string(),
        op,
        value: value.to_string(),
        case_insensitive,
    })
}
