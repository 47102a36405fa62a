//! Body transforms for non-JS sources.

use crate::error::{Result, TransportError};
use lightningcss::printer::PrinterOptions;
use lightningcss::rules::CssRule;
use lightningcss::stylesheet::{MinifyOptions, ParserOptions, StyleSheet};
use lightningcss::targets::{Features, Targets};
use lightningcss::traits::ToCss;

/// `module.exports = <json>;` after checking the JSON parses.
///
/// A trailing `;` left over from hand-edited files is dropped first.
pub fn json_body(source: &str, path: &str) -> Result<String> {
    let json = source.trim_end().trim_end_matches(';').trim_end();
    serde_json::from_str::<serde::de::IgnoredAny>(json).map_err(|source| TransportError::Json {
        path: path.to_string(),
        source,
    })?;
    Ok(format!("module.exports = {json};\n"))
}

/// Single-line, single-quoted `module.exports='...';` for templates.
#[must_use]
pub fn tpl_body(source: &str) -> String {
    let mut code = String::with_capacity(source.len() + 20);
    code.push_str("module.exports='");
    for c in source.chars() {
        match c {
            '\n' | '\r' => {}
            '\\' => code.push_str("\\\\"),
            '\'' => code.push_str("\\'"),
            other => code.push(other),
        }
    }
    code.push_str("';");
    code
}

/// `require('import-style')('<css>');` injecting a stylesheet at runtime.
///
/// The stylesheet is minified onto one line. With `prefix`, every style
/// rule is scoped under it, including rules inside `@media` and
/// `@supports`; keyframes, font faces and statement at-rules are kept
/// as they are.
pub fn css_body(css: &str, prefix: Option<&str>, path: &str) -> Result<String> {
    let flat = minify(css, path, false)?;
    let flat = match prefix {
        Some(prefix) => minify(&nest_under(&flat, prefix, path)?, path, true)?,
        None => flat,
    };
    Ok(format!("require('import-style')('{}');\n", escape_single(&flat)))
}

/// Parse, minify and print `source`. `flatten` compiles nested rules
/// away, so the output only uses plain descendant selectors.
fn minify(source: &str, path: &str, flatten: bool) -> Result<String> {
    let options = ParserOptions {
        filename: path.to_string(),
        ..ParserOptions::default()
    };
    let mut stylesheet = StyleSheet::parse(source, options).map_err(|e| css_error(path, e))?;

    stylesheet
        .minify(MinifyOptions {
            targets: targets(flatten),
            ..Default::default()
        })
        .map_err(|e| css_error(path, e))?;

    let output = stylesheet
        .to_css(PrinterOptions {
            minify: true,
            targets: targets(flatten),
            ..Default::default()
        })
        .map_err(|e| css_error(path, e))?;

    Ok(output.code)
}

fn targets(flatten: bool) -> Targets {
    if flatten {
        Targets {
            include: Features::Nesting,
            ..Targets::default()
        }
    } else {
        Targets::default()
    }
}

/// Wrap each top-level rule that holds selectors in `prefix{...}`.
fn nest_under(css: &str, prefix: &str, path: &str) -> Result<String> {
    let stylesheet = StyleSheet::parse(css, ParserOptions::default()).map_err(|e| css_error(path, e))?;

    let mut out = String::with_capacity(css.len() + prefix.len() * 8);
    for rule in &stylesheet.rules.0 {
        let text = rule
            .to_css_string(PrinterOptions {
                minify: true,
                ..Default::default()
            })
            .map_err(|e| css_error(path, e))?;

        if holds_selectors(rule) {
            out.push_str(prefix);
            out.push('{');
            out.push_str(&text);
            out.push('}');
        } else {
            out.push_str(&text);
        }
    }
    Ok(out)
}

fn holds_selectors(rule: &CssRule<'_>) -> bool {
    matches!(
        rule,
        CssRule::Style(_)
            | CssRule::Media(_)
            | CssRule::Supports(_)
            | CssRule::LayerBlock(_)
            | CssRule::Container(_)
    )
}

fn css_error(path: &str, err: impl std::fmt::Display) -> TransportError {
    TransportError::Css {
        path: path.to_string(),
        message: err.to_string(),
    }
}

fn escape_single(s: &str) -> String {
    s.replace('\\', "\\\\").replace('\'', "\\'")
}
