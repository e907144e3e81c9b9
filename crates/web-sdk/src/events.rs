//! DOM events handed to the dispatcher by the host page.
//!
//! The dispatcher never touches the document itself. The host translates the
//! browser events it observes into these types and passes them in by shared
//! reference, so hooks can read an event but never cancel or alter it.

use std::collections::HashMap;

/// Snapshot of one element: tag name and attributes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    pub tag: String,
    pub attributes: HashMap<String, String>,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into().to_ascii_lowercase(),
            attributes: HashMap::new(),
        }
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn is(&self, tag: &str) -> bool {
        self.tag.eq_ignore_ascii_case(tag)
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    /// Attribute value, with an empty or missing attribute falling back to
    /// `default`.
    pub fn attr_or<'a>(&'a self, name: &str, default: &'a str) -> &'a str {
        match self.attr(name) {
            Some(value) if !value.is_empty() => value,
            _ => default,
        }
    }
}

/// Phase in which a listener observes an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerPhase {
    /// Document-level listener running before the target's own handlers.
    Capture,
    /// Listener attached to the target element.
    Target,
    Bubble,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DomEvent {
    /// A form was submitted. `fields` holds the submitted form data.
    Submit {
        form: Element,
        fields: HashMap<String, String>,
    },
    /// A click. `path` starts at the clicked element and walks up through its
    /// ancestors.
    Click { path: Vec<Element> },
}

impl DomEvent {
    pub fn submit(form: Element, fields: impl IntoIterator<Item = (String, String)>) -> Self {
        DomEvent::Submit {
            form,
            fields: fields.into_iter().collect(),
        }
    }

    pub fn click(path: Vec<Element>) -> Self {
        DomEvent::Click { path }
    }

    /// Nearest element on the click path (target first) matching `predicate`.
    pub fn closest(&self, predicate: impl Fn(&Element) -> bool) -> Option<&Element> {
        match self {
            DomEvent::Click { path } => path.iter().find(|el| predicate(el)),
            DomEvent::Submit { .. } => None,
        }
    }
}

/// Page the dispatcher was initialized on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageContext {
    pub path: String,
    pub title: String,
}

impl PageContext {
    pub fn new(path: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            title: title.into(),
        }
    }
}
