//! Stylesheet `@import` flattening.
//!
//! Relative imports are resolved inside the importing package, bare imports
//! through its dependency map. Every physical file is inlined at most once
//! per call, and two versions of one package is an error. Local `url()`
//! references can be redirected to one flat output directory.

mod conflict;
mod inliner;
mod resources;

pub use conflict::ConflictTracker;
pub use inliner::{inline_css, inline_css_with_resources, InlinedCss, StyleInliner};
pub use resources::Resource;

use regex_lite::Regex;
use std::sync::OnceLock;

fn blank_lines() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\n{2,}").expect("blank line pattern is valid"))
}

/// Collapse runs of blank lines to a single one.
#[must_use]
pub fn collapse_blank_lines(css: &str) -> String {
    blank_lines().replace_all(css, "\n\n").into_owned()
}
