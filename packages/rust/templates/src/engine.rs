//! Named-placeholder rendering.
//!
//! Placeholders are written `{{ name }}` (inner whitespace optional). A
//! placeholder with no value in the context renders as an empty string.

use std::collections::BTreeMap;
use std::fmt::Display;
use std::sync::LazyLock;

use regex::{Captures, Regex};
use tracing::debug;

/// Matches `{{ identifier }}`.
static PLACEHOLDER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{\s*([A-Za-z_][A-Za-z0-9_]*)\s*\}\}").expect("placeholder regex")
});

/// Values supplied to a template, keyed by placeholder name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Context {
    values: BTreeMap<String, String>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a value, builder style.
    pub fn with(mut self, key: &str, value: impl Display) -> Self {
        self.set(key, value);
        self
    }

    /// Set a value in place.
    pub fn set(&mut self, key: &str, value: impl Display) {
        self.values.insert(key.to_string(), value.to_string());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }
}

/// A named template body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    name: String,
    text: String,
}

impl Template {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Placeholder names used by this template, in order of first appearance.
    pub fn placeholders(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for caps in PLACEHOLDER_RE.captures_iter(&self.text) {
            if let Some(m) = caps.get(1) {
                if !names.contains(&m.as_str()) {
                    names.push(m.as_str());
                }
            }
        }
        names
    }

    /// Substitute every placeholder with its context value.
    pub fn render(&self, ctx: &Context) -> String {
        PLACEHOLDER_RE
            .replace_all(&self.text, |caps: &Captures<'_>| {
                let key = &caps[1];
                match ctx.get(key) {
                    Some(value) => value.to_string(),
                    None => {
                        debug!(template = %self.name, placeholder = key, "no value supplied, rendering empty");
                        String::new()
                    }
                }
            })
            .into_owned()
    }
}
