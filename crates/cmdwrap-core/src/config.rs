use crate::error::{Result, TransportError};
use crate::graph::{LoadOptions, DEFAULT_MODULE_DIR};
use crate::rename::RenameSpec;
use crate::resolve::{Idleading, ImplicitDep, Include, ResolveOptions};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Runtime configuration for the cmdwrap CLI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Current working directory.
    pub cwd: PathBuf,

    /// Whether to emit JSON logs.
    pub json_logs: bool,

    /// Verbosity level (0 = INFO, 1 = DEBUG, 2+ = TRACE).
    pub verbosity: u8,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cwd: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            json_logs: false,
            verbosity: 0,
        }
    }
}

impl Config {
    /// Create a new config with the given working directory.
    #[must_use]
    pub fn new(cwd: PathBuf) -> Self {
        Self {
            cwd,
            ..Default::default()
        }
    }

    /// Set verbosity level.
    #[must_use]
    pub fn with_verbosity(mut self, verbosity: u8) -> Self {
        self.verbosity = verbosity;
        self
    }

    /// Set JSON log output.
    #[must_use]
    pub fn with_json_logs(mut self, json: bool) -> Self {
        self.json_logs = json;
        self
    }
}

/// Declarative options read from `cmdwrap.json`.
///
/// ```json
/// {
///   "idleading": "{{name}}/{{version}}",
///   "include": "relative",
///   "ignore": ["jquery"],
///   "rename": { "suffix": "-debug" },
///   "moduleDir": "sea-modules",
///   "styleBox": false
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OptionsFile {
    pub idleading: Option<String>,
    pub ignore: Vec<String>,
    pub include: Option<Include>,
    pub rename: Option<RenameSpec>,
    /// Replaces the built-in implicit dependency table when set.
    pub implicit: Option<Vec<ImplicitDep>>,
    pub module_dir: Option<String>,
    pub style_box: bool,
    /// Extra entry files of the root package.
    pub entries: Vec<String>,
}

impl OptionsFile {
    /// File name looked up at the project root.
    pub const FILE_NAME: &'static str = "cmdwrap.json";

    /// Read and parse an options file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| TransportError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| TransportError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load `cmdwrap.json` from `root` if it exists.
    pub fn discover(root: &Path) -> Result<Option<Self>> {
        let path = root.join(Self::FILE_NAME);
        if path.is_file() {
            Self::load(&path).map(Some)
        } else {
            Ok(None)
        }
    }

    /// Resolution options, defaults filled in.
    #[must_use]
    pub fn resolve_options(&self) -> ResolveOptions {
        let mut options = ResolveOptions::default()
            .with_ignore(self.ignore.iter().cloned())
            .with_include(self.include.unwrap_or_default())
            .with_style_box(self.style_box);
        if let Some(idleading) = &self.idleading {
            options = options.with_idleading(Idleading::from(idleading.as_str()));
        }
        if let Some(rename) = &self.rename {
            options = options.with_rename(rename.clone());
        }
        if let Some(implicit) = &self.implicit {
            options = options.with_implicit(implicit.clone());
        }
        options
    }

    /// Graph loading options.
    #[must_use]
    pub fn load_options(&self) -> LoadOptions {
        LoadOptions::default()
            .with_module_dir(self.module_dir.as_deref().unwrap_or(DEFAULT_MODULE_DIR))
            .with_entries(self.entries.iter().cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::codes;
    use tempfile::tempdir;

    #[test]
    fn test_config_builders() {
        let config = Config::new(PathBuf::from("/work"))
            .with_verbosity(2)
            .with_json_logs(true);
        assert_eq!(config.cwd, PathBuf::from("/work"));
        assert_eq!(config.verbosity, 2);
        assert!(config.json_logs);
    }

    #[test]
    fn test_options_file_defaults() {
        let file: OptionsFile = serde_json::from_str("{}").unwrap();
        let options = file.resolve_options();
        assert_eq!(options.include, Include::Relative);
        assert!(options.ignore.is_empty());
        assert!(options.rename.is_none());
        assert_eq!(options.implicit, ImplicitDep::defaults());
        assert_eq!(file.load_options().module_dir, DEFAULT_MODULE_DIR);
    }

    #[test]
    fn test_options_file_fields() {
        let file: OptionsFile = serde_json::from_str(
            r#"{
                "idleading": "lib/{{name}}",
                "ignore": ["jquery"],
                "include": "self",
                "rename": {"suffix": "-debug"},
                "moduleDir": "spm_modules",
                "styleBox": true
            }"#,
        )
        .unwrap();
        let options = file.resolve_options();
        assert_eq!(options.include, Include::SelfOnly);
        assert!(options.ignores("jquery"));
        assert!(options.style_box);
        assert!(options.rename.is_some());
        assert_eq!(file.load_options().module_dir, "spm_modules");
    }

    #[test]
    fn test_discover() {
        let dir = tempdir().unwrap();
        assert!(OptionsFile::discover(dir.path()).unwrap().is_none());

        std::fs::write(dir.path().join(OptionsFile::FILE_NAME), r#"{"ignore":["a"]}"#).unwrap();
        let file = OptionsFile::discover(dir.path()).unwrap().unwrap();
        assert_eq!(file.ignore, vec!["a"]);
    }

    #[test]
    fn test_load_invalid() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(OptionsFile::FILE_NAME);
        std::fs::write(&path, r#"{"include": "everything"}"#).unwrap();
        let err = OptionsFile::load(&path).unwrap_err();
        assert_eq!(err.code(), codes::CONFIG_INVALID);

        let err = OptionsFile::load(&dir.path().join("missing.json")).unwrap_err();
        assert_eq!(err.code(), codes::CONFIG_READ_FAILED);
    }
}
