//! Module identifier and dependency resolution.
//!
//! [`resolve_id`] turns a registered file into its `define()` id;
//! [`resolve_deps`] walks the file's requires and returns the ids that go
//! into its dependency array; [`collect_files`] lists the files bundled
//! with it. All take a [`ResolveOptions`] per call and keep no state
//! between calls.

mod deps;
mod id;
mod include;

pub use deps::{dependency_of, implicit_seeds, resolve_deps};
pub use include::collect_files;
pub use id::{resolve_id, resolve_path_id, style_id};

use crate::graph::Package;
use crate::rename::RenameRule;
use crate::template;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Default id prefix template.
pub const DEFAULT_IDLEADING: &str = "{{name}}/{{version}}";

/// User callback producing an id prefix for `(path, package)`.
pub type IdleadingFn = Arc<dyn Fn(&str, &Package) -> String + Send + Sync>;

/// Source of the id prefix.
#[derive(Clone)]
pub enum Idleading {
    /// `{{field}}` template over the package record.
    Template(String),
    /// Called once per resolution; the result is used verbatim.
    Callback(IdleadingFn),
}

impl Idleading {
    pub fn callback(f: impl Fn(&str, &Package) -> String + Send + Sync + 'static) -> Self {
        Self::Callback(Arc::new(f))
    }

    /// Prefix for `path` in `package`.
    #[must_use]
    pub fn prefix(&self, path: &str, package: &Package) -> String {
        match self {
            Self::Template(format) => template::template(format, package),
            Self::Callback(f) => f(path, package),
        }
    }
}

impl Default for Idleading {
    fn default() -> Self {
        Self::Template(DEFAULT_IDLEADING.to_string())
    }
}

impl From<&str> for Idleading {
    fn from(format: &str) -> Self {
        Self::Template(format.to_string())
    }
}

impl From<String> for Idleading {
    fn from(format: String) -> Self {
        Self::Template(format)
    }
}

impl fmt::Debug for Idleading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Template(format) => f.debug_tuple("Template").field(format).finish(),
            Self::Callback(_) => f.write_str("Callback(..)"),
        }
    }
}

/// How far dependency resolution reaches beyond the root package.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Include {
    /// Ids of the root package's files and of every reached package entry.
    #[default]
    Relative,
    /// Ids of the root package's files only.
    #[serde(rename = "self")]
    SelfOnly,
    /// Only the ignored package names that are reachable. Also spelled
    /// `standalone`, the name older configurations use for it.
    #[serde(alias = "standalone")]
    All,
}

impl Include {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Relative => "relative",
            Self::SelfOnly => "self",
            Self::All => "all",
        }
    }
}

impl fmt::Display for Include {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Accepts `relative`, `self`, `all`, and `standalone` as an alias of
/// `all`.
impl FromStr for Include {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "relative" => Ok(Self::Relative),
            "self" => Ok(Self::SelfOnly),
            "all" | "standalone" => Ok(Self::All),
            other => Err(format!(
                "unknown include \"{other}\", expected relative, self or all"
            )),
        }
    }
}

/// A dependency implied by the presence of files with some extension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImplicitDep {
    /// Triggering extension, without the dot.
    pub extension: String,
    /// Package name added to the dependency set.
    pub package: String,
    /// Only trigger when the file is reached from a `.js` dependent.
    #[serde(default)]
    pub js_dependent_only: bool,
}

impl ImplicitDep {
    #[must_use]
    pub fn new(extension: &str, package: &str) -> Self {
        Self {
            extension: extension.to_string(),
            package: package.to_string(),
            js_dependent_only: false,
        }
    }

    #[must_use]
    pub fn js_dependent_only(mut self) -> Self {
        self.js_dependent_only = true;
        self
    }

    /// Built-in table: handlebars templates need the runtime, stylesheets
    /// required from JS need the style injector.
    #[must_use]
    pub fn defaults() -> Vec<Self> {
        vec![
            Self::new("handlebars", "handlebars-runtime"),
            Self::new("css", "import-style").js_dependent_only(),
        ]
    }
}

/// Per-call resolution options.
#[derive(Debug, Clone)]
pub struct ResolveOptions {
    pub idleading: Idleading,
    /// Package names or ids that are provided externally.
    pub ignore: Vec<String>,
    pub include: Include,
    pub rename: Option<RenameRule>,
    pub implicit: Vec<ImplicitDep>,
    /// Wrap stylesheet rules in a per-package class.
    pub style_box: bool,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            idleading: Idleading::default(),
            ignore: Vec::new(),
            include: Include::default(),
            rename: None,
            implicit: ImplicitDep::defaults(),
            style_box: false,
        }
    }
}

impl ResolveOptions {
    #[must_use]
    pub fn with_idleading(mut self, idleading: impl Into<Idleading>) -> Self {
        self.idleading = idleading.into();
        self
    }

    #[must_use]
    pub fn with_ignore<I, S>(mut self, ignore: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignore = ignore.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_include(mut self, include: Include) -> Self {
        self.include = include;
        self
    }

    #[must_use]
    pub fn with_rename(mut self, rename: impl Into<RenameRule>) -> Self {
        self.rename = Some(rename.into());
        self
    }

    #[must_use]
    pub fn with_implicit(mut self, implicit: Vec<ImplicitDep>) -> Self {
        self.implicit = implicit;
        self
    }

    #[must_use]
    pub fn with_style_box(mut self, style_box: bool) -> Self {
        self.style_box = style_box;
        self
    }

    /// Whether a bare name is in the ignore list.
    #[must_use]
    pub fn ignores(&self, name: &str) -> bool {
        self.ignore.iter().any(|i| i == name)
    }

    /// Whether a package is ignored by name or by id.
    #[must_use]
    pub fn is_ignored(&self, package: &Package) -> bool {
        self.ignores(&package.name) || self.ignores(&package.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_include_parse() {
        assert_eq!("relative".parse::<Include>().unwrap(), Include::Relative);
        assert_eq!("self".parse::<Include>().unwrap(), Include::SelfOnly);
        assert_eq!("standalone".parse::<Include>().unwrap(), Include::All);
        assert!("everything".parse::<Include>().is_err());
    }

    #[test]
    fn test_include_serde() {
        let include: Include = serde_json::from_str("\"self\"").unwrap();
        assert_eq!(include, Include::SelfOnly);
        let include: Include = serde_json::from_str("\"standalone\"").unwrap();
        assert_eq!(include, Include::All);
        assert_eq!(serde_json::to_string(&Include::All).unwrap(), "\"all\"");
    }

    #[test]
    fn test_idleading_callback() {
        let pkg = Package::new("a", "1.0.0", "/a");
        let idleading = Idleading::callback(|path, pkg| format!("{}-{path}", pkg.name));
        assert_eq!(idleading.prefix("x.js", &pkg), "a-x.js");
        assert_eq!(Idleading::default().prefix("x.js", &pkg), "a/1.0.0");
    }

    #[test]
    fn test_ignore_by_name_or_id() {
        let options = ResolveOptions::default().with_ignore(["b@1.0.0", "c"]);
        assert!(options.is_ignored(&Package::new("b", "1.0.0", "/b")));
        assert!(!options.is_ignored(&Package::new("b", "1.1.0", "/b")));
        assert!(options.is_ignored(&Package::new("c", "2.0.0", "/c")));
    }

    #[test]
    fn test_implicit_dep_serde() {
        let dep: ImplicitDep =
            serde_json::from_str(r#"{"extension":"less","package":"import-style","jsDependentOnly":true}"#)
                .unwrap();
        assert_eq!(dep, ImplicitDep::new("less", "import-style").js_dependent_only());
    }
}
