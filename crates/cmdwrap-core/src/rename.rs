//! Cosmetic filename rewriting.
//!
//! A rename rule turns `src/index.js` into e.g. `src/index-debug.js` or
//! `src/index-1a2b3c4d.js`. Renaming is best-effort: [`apply`] returns a
//! [`RenameError`] and the caller decides the fallback.

use crate::paths;
use crate::template::{self, TemplateData};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// A path split the way rename rules see it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileParts {
    /// Directory, empty for a top-level file.
    pub dirname: String,
    /// File name without extension.
    pub basename: String,
    /// Extension including the dot, or empty.
    pub extname: String,
}

impl FileParts {
    /// Split a forward-slash path.
    #[must_use]
    pub fn parse(path: &str) -> Self {
        let extname = paths::extname(path).to_string();
        let base = paths::basename(path);
        Self {
            dirname: paths::dirname(path).to_string(),
            basename: base[..base.len() - extname.len()].to_string(),
            extname,
        }
    }

    /// Reassemble into a forward-slash path.
    #[must_use]
    pub fn to_path(&self) -> String {
        let file = format!("{}{}", self.basename, self.extname);
        if self.dirname.is_empty() {
            file
        } else if self.dirname.ends_with('/') {
            format!("{}{file}", self.dirname)
        } else {
            format!("{}/{file}", self.dirname)
        }
    }
}

/// Declarative rename rule. Every field may reference `{{hash}}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenameSpec {
    /// Replace the directory.
    pub dirname: Option<String>,
    /// Prepend to the file name.
    pub prefix: Option<String>,
    /// Replace the file name (without extension).
    pub basename: Option<String>,
    /// Append to the file name, before the extension.
    pub suffix: Option<String>,
    /// Replace the extension.
    pub extname: Option<String>,
}

impl RenameSpec {
    /// Suffix-only rule, e.g. `-debug`.
    #[must_use]
    pub fn suffix(suffix: impl Into<String>) -> Self {
        Self {
            suffix: Some(suffix.into()),
            ..Self::default()
        }
    }

    fn fields(&self) -> impl Iterator<Item = &str> {
        [
            &self.dirname,
            &self.prefix,
            &self.basename,
            &self.suffix,
            &self.extname,
        ]
        .into_iter()
        .filter_map(|f| f.as_deref())
    }
}

/// User callback rename.
pub type RenameFn = Arc<dyn Fn(FileParts) -> Result<FileParts, RenameError> + Send + Sync>;

/// How to rename files.
#[derive(Clone)]
pub enum RenameRule {
    Spec(RenameSpec),
    Callback(RenameFn),
}

impl RenameRule {
    /// Wrap a callback.
    pub fn callback(
        f: impl Fn(FileParts) -> Result<FileParts, RenameError> + Send + Sync + 'static,
    ) -> Self {
        Self::Callback(Arc::new(f))
    }
}

impl fmt::Debug for RenameRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Spec(spec) => f.debug_tuple("Spec").field(spec).finish(),
            Self::Callback(_) => f.write_str("Callback(..)"),
        }
    }
}

impl From<RenameSpec> for RenameRule {
    fn from(spec: RenameSpec) -> Self {
        Self::Spec(spec)
    }
}

/// Rename failure. Never fatal to resolution.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenameError {
    #[error("{path} has no content hash for {{{{hash}}}}")]
    MissingHash { path: String },

    #[error("{path} was renamed outside of its package")]
    OutsideRoot { path: String },

    #[error("{path} {message}")]
    Callback { path: String, message: String },
}

impl RenameError {
    /// Error for a callback that rejected `path`.
    pub fn callback(path: &str, message: impl Into<String>) -> Self {
        Self::Callback {
            path: path.to_string(),
            message: message.into(),
        }
    }
}

struct HashField<'a>(Option<&'a str>);

impl TemplateData for HashField<'_> {
    fn field(&self, key: &str) -> Option<Cow<'_, str>> {
        match key {
            "hash" => self.0.map(Cow::Borrowed),
            _ => None,
        }
    }
}

/// Rename `path` (extension-less paths are treated as `.js`).
///
/// `hash` is the file's short content hash, required only when the rule
/// references `{{hash}}`.
pub fn apply(path: &str, rule: &RenameRule, hash: Option<&str>) -> Result<String, RenameError> {
    let path = paths::add_ext(path);
    let parts = FileParts::parse(&path);

    let renamed = match rule {
        RenameRule::Spec(spec) => {
            if hash.is_none() && spec.fields().any(|f| template::fields(f).contains(&"hash")) {
                return Err(RenameError::MissingHash { path });
            }
            apply_spec(parts, spec, &HashField(hash))
        }
        RenameRule::Callback(f) => f(parts)?,
    };

    Ok(renamed.to_path())
}

/// Rename a package file through its full path under `root`.
///
/// The result is relative to `root` again; a rename that moves the file out
/// of `root` fails.
pub fn apply_in_root(
    root: &str,
    path: &str,
    rule: &RenameRule,
    hash: Option<&str>,
) -> Result<String, RenameError> {
    let full = paths::join(root, path);
    let renamed = apply(&full, rule, hash)?;

    if root.is_empty() {
        return Ok(renamed);
    }
    let prefix = format!("{}/", root.trim_end_matches('/'));
    renamed
        .strip_prefix(&prefix)
        .map(str::to_string)
        .ok_or(RenameError::OutsideRoot { path: renamed.clone() })
}

fn apply_spec(mut parts: FileParts, spec: &RenameSpec, data: &HashField<'_>) -> FileParts {
    let fill = |s: &str| template::template(s, data);

    if let Some(dirname) = &spec.dirname {
        parts.dirname = fill(dirname);
    }
    if let Some(basename) = &spec.basename {
        parts.basename = fill(basename);
    }
    if let Some(prefix) = &spec.prefix {
        parts.basename = format!("{}{}", fill(prefix), parts.basename);
    }
    if let Some(suffix) = &spec.suffix {
        parts.basename = format!("{}{}", parts.basename, fill(suffix));
    }
    if let Some(extname) = &spec.extname {
        parts.extname = fill(extname);
    }
    parts
}
