//! String templates for configured renderers, extractors and name formatting
//!
//! Placeholders: `{name}`, `{value}`, `{id}`, `{tag}`. Unknown placeholders are
//! copied through unchanged.

use serde::{Deserialize, Serialize};

use crate::mentions::Mention;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Template(String);

impl Template {
    pub fn new(source: impl Into<String>) -> Self {
        Self(source.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Expand against a registered mention
    pub fn render(&self, mention: &Mention) -> String {
        let tag = mention.tag.to_string();
        self.expand(|key| match key {
            "name" => Some(mention.name.as_str()),
            "value" => Some(mention.value.as_str()),
            "id" => Some(mention.id.as_str()),
            "tag" => Some(tag.as_str()),
            _ => None,
        })
    }

    /// Expand with only `{name}` (and `{value}`) bound, for formatting display names
    pub fn format_name(&self, name: &str) -> String {
        self.expand(|key| match key {
            "name" | "value" => Some(name),
            _ => None,
        })
    }

    fn expand<'a>(&self, lookup: impl Fn(&str) -> Option<&'a str>) -> String {
        let mut out = String::with_capacity(self.0.len());
        let mut rest = self.0.as_str();

        while let Some(open) = rest.find('{') {
            out.push_str(&rest[..open]);
            let after = &rest[open + 1..];
            match after.find('}') {
                Some(close) => {
                    let key = &after[..close];
                    match lookup(key) {
                        Some(value) => out.push_str(value),
                        None => {
                            out.push('{');
                            out.push_str(key);
                            out.push('}');
                        }
                    }
                    rest = &after[close + 1..];
                }
                None => {
                    out.push_str(&rest[open..]);
                    rest = "";
                }
            }
        }
        out.push_str(rest);
        out
    }
}

impl From<&str> for Template {
    fn from(source: &str) -> Self {
        Self::new(source)
    }
}

impl Default for Template {
    fn default() -> Self {
        Self::new("{name}")
    }
}
