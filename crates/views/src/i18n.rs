//! Translation function used by the views
//!
//! Views call `t(key, default, params)`. A [`Catalog`] loaded from JSON
//! supplies translations; missing keys fall back to the English default
//! passed by the caller.

use chill_core::{Error, Result};
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;

/// Source of translated templates
pub trait Translate {
    /// Template for `key`, if this translator has one
    fn lookup(&self, key: &str) -> Option<&str>;

    /// Locale tag, e.g. `en` or `pt-BR`
    fn locale(&self) -> &str;

    /// Translate `key`, interpolating `{name}` placeholders from `params`
    fn t(&self, key: &str, default: &str, params: &[(&str, &str)]) -> String {
        interpolate(self.lookup(key).unwrap_or(default), params)
    }
}

/// Replace `{name}` placeholders in one pass; unknown placeholders are left as-is
/// and substituted values are never scanned again
pub fn interpolate(template: &str, params: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let value = after.find('}').and_then(|close| {
            let name = &after[..close];
            params
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (*value, close))
        });
        match value {
            Some((value, close)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

/// Flat key -> template map
#[derive(Debug, Clone)]
pub struct Catalog {
    locale: String,
    entries: HashMap<String, String>,
}

impl Catalog {
    /// Catalog with no entries; every lookup uses the caller's default
    pub fn empty(locale: &str) -> Self {
        Self {
            locale: locale.to_string(),
            entries: HashMap::new(),
        }
    }

    /// Parse a JSON catalog. Nested objects are flattened with `.`:
    /// `{"rewards": {"title": "..."}}` defines `rewards.title`.
    pub fn from_json(locale: &str, raw: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(raw)?;
        let Value::Object(root) = value else {
            return Err(Error::InvalidData("translation catalog must be a JSON object".to_string()));
        };

        let mut entries = HashMap::new();
        let mut stack: Vec<(String, Value)> = root.into_iter().collect();
        while let Some((key, value)) = stack.pop() {
            match value {
                Value::String(text) => {
                    entries.insert(key, text);
                }
                Value::Object(children) => {
                    stack.extend(
                        children
                            .into_iter()
                            .map(|(child, v)| (format!("{}.{}", key, child), v)),
                    );
                }
                _ => {
                    tracing::warn!("Ignoring non-string translation for '{}'", key);
                }
            }
        }

        Ok(Self {
            locale: locale.to_string(),
            entries,
        })
    }

    /// Read a JSON catalog from disk
    pub fn load(locale: &str, path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| Error::ConfigError(format!("cannot read {}: {}", path.display(), e)))?;
        Self::from_json(locale, &raw)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::empty("en")
    }
}

impl Translate for Catalog {
    fn lookup(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    fn locale(&self) -> &str {
        &self.locale
    }
}

/// Short date for tables and warnings
pub fn format_date(date: &DateTime<Utc>, locale: &str) -> String {
    if locale == "en" || locale.starts_with("en-") {
        date.format("%b %-d, %Y").to_string()
    } else {
        date.format("%d/%m/%Y").to_string()
    }
}
