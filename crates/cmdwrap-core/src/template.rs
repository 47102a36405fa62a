//! `{{field}}` placeholder substitution.
//!
//! ```ignore
//! let prefix = template("{{name}}/{{version}}", &pkg);
//! // "base/1.0.0"
//! ```
//!
//! Field names are lowercase ASCII letters. A field the data does not know
//! substitutes the empty string.

use regex_lite::{Captures, Regex};
use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::OnceLock;

/// A record whose fields can be substituted into a template.
pub trait TemplateData {
    /// Value for `key`, or `None` when the field is unknown.
    fn field(&self, key: &str) -> Option<Cow<'_, str>>;
}

impl TemplateData for [(&str, &str)] {
    fn field(&self, key: &str) -> Option<Cow<'_, str>> {
        self.iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| Cow::Borrowed(*v))
    }
}

impl<const N: usize> TemplateData for [(&str, &str); N] {
    fn field(&self, key: &str) -> Option<Cow<'_, str>> {
        self.as_slice().field(key)
    }
}

impl TemplateData for HashMap<String, String> {
    fn field(&self, key: &str) -> Option<Cow<'_, str>> {
        self.get(key).map(|v| Cow::Borrowed(v.as_str()))
    }
}

fn placeholder() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{\{([a-z]*)\}\}").expect("placeholder pattern is valid"))
}

/// Substitute `{{field}}` placeholders in `format` with fields of `data`.
#[must_use]
pub fn template<D: TemplateData + ?Sized>(format: &str, data: &D) -> String {
    if format.is_empty() {
        return String::new();
    }
    placeholder()
        .replace_all(format, |caps: &Captures| {
            data.field(&caps[1])
                .map(Cow::into_owned)
                .unwrap_or_default()
        })
        .into_owned()
}

/// Field names referenced by `format`, in order of appearance.
#[must_use]
pub fn fields(format: &str) -> Vec<&str> {
    placeholder()
        .captures_iter(format)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
        .collect()
}
