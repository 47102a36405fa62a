pub mod css;
pub mod deps;
pub mod graph;
pub mod id;
pub mod version;
pub mod wrap;

use cmdwrap_core::TransportError;
use miette::{IntoDiagnostic, Result};
use serde::Serialize;

/// Error object embedded in every `--json` result.
#[derive(Debug, Serialize)]
pub struct ErrorJson {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl From<&TransportError> for ErrorJson {
    fn from(err: &TransportError) -> Self {
        Self {
            code: err.code().to_string(),
            message: err.to_string(),
            path: err.path(),
        }
    }
}

/// Print one JSON document on stdout.
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let line = serde_json::to_string(value).into_diagnostic()?;
    println!("{line}");
    Ok(())
}

/// Human-readable error on stderr.
pub fn report(err: &TransportError) {
    eprintln!("error: {err}");
    if let Some(path) = err.path() {
        eprintln!("  at {path}");
    }
}
