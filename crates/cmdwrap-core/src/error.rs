use std::path::PathBuf;
use thiserror::Error;

/// Stable error codes.
///
/// All codes are SCREAMING_SNAKE_CASE and stable across versions; they are
/// what `--json` output reports.
pub mod codes {
    pub const TRANSPORT_RELATIVE_PATH: &str = "TRANSPORT_RELATIVE_PATH";
    pub const TRANSPORT_OUT_OF_BOUNDS: &str = "TRANSPORT_OUT_OF_BOUNDS";
    pub const TRANSPORT_FILE_NOT_REGISTERED: &str = "TRANSPORT_FILE_NOT_REGISTERED";
    pub const TRANSPORT_MISSING_PACKAGE: &str = "TRANSPORT_MISSING_PACKAGE";
    pub const TRANSPORT_IMPLICIT_PACKAGE_MISSING: &str = "TRANSPORT_IMPLICIT_PACKAGE_MISSING";
    pub const CSS_PACKAGE_NOT_FOUND: &str = "CSS_PACKAGE_NOT_FOUND";
    pub const CSS_VERSION_CONFLICT: &str = "CSS_VERSION_CONFLICT";
    pub const TRANSPORT_UNSUPPORTED_EXTENSION: &str = "TRANSPORT_UNSUPPORTED_EXTENSION";
    pub const TRANSPORT_JSON_INVALID: &str = "TRANSPORT_JSON_INVALID";
    pub const CSS_INVALID: &str = "CSS_INVALID";
    pub const MANIFEST_READ_FAILED: &str = "MANIFEST_READ_FAILED";
    pub const MANIFEST_INVALID: &str = "MANIFEST_INVALID";
    pub const CONFIG_READ_FAILED: &str = "CONFIG_READ_FAILED";
    pub const CONFIG_INVALID: &str = "CONFIG_INVALID";
    pub const IO_ERROR: &str = "IO_ERROR";
}

/// Error raised by identifier/dependency resolution, style inlining, graph
/// loading and module wrapping.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("no base path of {path}")]
    RelativePath { path: String },

    #[error("{path} is out of bound")]
    OutOfBounds { path: String },

    #[error("{path} is not included in {package}")]
    FileNotRegistered { path: String, package: String },

    #[error("package {name} not found (required by {from})")]
    MissingPackage { name: String, from: String },

    #[error("package {name} required by .{extension} files is not a dependency of {package}")]
    ImplicitPackageMissing {
        name: String,
        extension: String,
        package: String,
    },

    #[error("package {name} not exists")]
    PackageNotFound { name: String, from: String },

    #[error("{id} conflict with {existing}")]
    VersionConflict { id: String, existing: String },

    #[error("extension \"{extension}\" not supported")]
    UnsupportedExtension { extension: String, path: String },

    #[error("invalid JSON in {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid CSS in {path}: {message}")]
    Css { path: String, message: String },

    #[error("Failed to read package manifest at {path}: {source}")]
    ManifestRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse package manifest at {path}: {source}")]
    ManifestParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to read config at {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config at {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl TransportError {
    /// Stable error code for machine-readable output.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::RelativePath { .. } => codes::TRANSPORT_RELATIVE_PATH,
            Self::OutOfBounds { .. } => codes::TRANSPORT_OUT_OF_BOUNDS,
            Self::FileNotRegistered { .. } => codes::TRANSPORT_FILE_NOT_REGISTERED,
            Self::MissingPackage { .. } => codes::TRANSPORT_MISSING_PACKAGE,
            Self::ImplicitPackageMissing { .. } => codes::TRANSPORT_IMPLICIT_PACKAGE_MISSING,
            Self::PackageNotFound { .. } => codes::CSS_PACKAGE_NOT_FOUND,
            Self::VersionConflict { .. } => codes::CSS_VERSION_CONFLICT,
            Self::UnsupportedExtension { .. } => codes::TRANSPORT_UNSUPPORTED_EXTENSION,
            Self::Json { .. } => codes::TRANSPORT_JSON_INVALID,
            Self::Css { .. } => codes::CSS_INVALID,
            Self::ManifestRead { .. } => codes::MANIFEST_READ_FAILED,
            Self::ManifestParse { .. } => codes::MANIFEST_INVALID,
            Self::ConfigRead { .. } => codes::CONFIG_READ_FAILED,
            Self::ConfigParse { .. } => codes::CONFIG_INVALID,
            Self::Io { .. } => codes::IO_ERROR,
        }
    }

    /// The file or package path the error points at, when there is one.
    #[must_use]
    pub fn path(&self) -> Option<String> {
        match self {
            Self::RelativePath { path }
            | Self::OutOfBounds { path }
            | Self::UnsupportedExtension { path, .. }
            | Self::Json { path, .. }
            | Self::Css { path, .. } => Some(path.clone()),
            Self::FileNotRegistered { path, package } => Some(format!("{package}:{path}")),
            Self::MissingPackage { from, .. } | Self::PackageNotFound { from, .. } => {
                Some(from.clone())
            }
            Self::ImplicitPackageMissing { package, .. } => Some(package.clone()),
            Self::VersionConflict { .. } => None,
            Self::ManifestRead { path, .. }
            | Self::ManifestParse { path, .. }
            | Self::ConfigRead { path, .. }
            | Self::ConfigParse { path, .. }
            | Self::Io { path, .. } => Some(path.display().to_string()),
        }
    }
}

pub type Result<T, E = TransportError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_codes_are_screaming_snake_case() {
        let codes = [
            codes::TRANSPORT_RELATIVE_PATH,
            codes::TRANSPORT_OUT_OF_BOUNDS,
            codes::TRANSPORT_FILE_NOT_REGISTERED,
            codes::TRANSPORT_MISSING_PACKAGE,
            codes::TRANSPORT_IMPLICIT_PACKAGE_MISSING,
            codes::CSS_PACKAGE_NOT_FOUND,
            codes::CSS_VERSION_CONFLICT,
            codes::TRANSPORT_UNSUPPORTED_EXTENSION,
            codes::TRANSPORT_JSON_INVALID,
            codes::CSS_INVALID,
            codes::MANIFEST_READ_FAILED,
            codes::MANIFEST_INVALID,
            codes::CONFIG_READ_FAILED,
            codes::CONFIG_INVALID,
            codes::IO_ERROR,
        ];

        for code in codes {
            assert!(
                code.chars().all(|c| c.is_ascii_uppercase() || c == '_'),
                "Code '{code}' should be SCREAMING_SNAKE_CASE"
            );
        }
    }

    #[test]
    fn test_conflict_message_names_both_ids() {
        let err = TransportError::VersionConflict {
            id: "c@1.0.0".to_string(),
            existing: "c@1.0.1".to_string(),
        };
        assert_eq!(err.to_string(), "c@1.0.0 conflict with c@1.0.1");
        assert_eq!(err.code(), codes::CSS_VERSION_CONFLICT);
        assert!(err.path().is_none());
    }

    #[test]
    fn test_css_missing_package_message() {
        let err = TransportError::PackageNotFound {
            name: "c".to_string(),
            from: "a5.css".to_string(),
        };
        assert_eq!(err.to_string(), "package c not exists");
        assert_eq!(err.path().as_deref(), Some("a5.css"));
    }
}
