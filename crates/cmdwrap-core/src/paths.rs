//! Package-relative path helpers.
//!
//! Paths inside a package are always forward-slash strings relative to the
//! package root (`src/a.js`), independent of the host path convention.

use crate::error::{Result, TransportError};
use std::path::{Path, PathBuf};

/// Find the project root by walking up from `cwd` looking for `package.json`.
#[must_use]
pub fn project_root(cwd: &Path) -> Option<PathBuf> {
    let mut current = cwd.to_path_buf();

    loop {
        if current.join("package.json").exists() {
            return Some(current);
        }

        if !current.pop() {
            return None;
        }
    }
}

/// A require or import path is relative when it starts with `.`.
#[must_use]
pub fn is_relative(path: &str) -> bool {
    path.starts_with('.')
}

/// Convert backslashes to forward slashes.
#[must_use]
pub fn win_path(path: &str) -> String {
    path.replace('\\', "/")
}

/// Normalize `.` and `..` segments and duplicate slashes.
///
/// Leading `..` segments that cannot be collapsed are kept, so a path that
/// escapes its root still starts with `..`.
#[must_use]
pub fn normalize(path: &str) -> String {
    let path = win_path(path);
    let absolute = path.starts_with('/');
    let mut parts: Vec<&str> = Vec::new();

    for seg in path.split('/') {
        match seg {
            "" | "." => {}
            ".." => match parts.last() {
                Some(&last) if last != ".." => {
                    parts.pop();
                }
                _ if absolute => {}
                _ => parts.push(".."),
            },
            other => parts.push(other),
        }
    }

    let joined = parts.join("/");
    if absolute {
        format!("/{joined}")
    } else {
        joined
    }
}

/// Join two package paths and normalize the result.
#[must_use]
pub fn join(base: &str, path: &str) -> String {
    if base.is_empty() {
        normalize(path)
    } else {
        normalize(&format!("{base}/{path}"))
    }
}

/// Whether a normalized path climbs above its root.
#[must_use]
pub fn escapes_root(path: &str) -> bool {
    path == ".." || path.starts_with("../")
}

/// Directory part of a path, empty for a top-level file.
#[must_use]
pub fn dirname(path: &str) -> &str {
    match path.rfind('/') {
        Some(0) => "/",
        Some(idx) => &path[..idx],
        None => "",
    }
}

/// Final path segment.
#[must_use]
pub fn basename(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Extension of the final segment including the dot (`.js`), or empty.
///
/// A leading dot names a hidden file, not an extension.
#[must_use]
pub fn extname(path: &str) -> &str {
    let base = basename(path);
    match base.rfind('.') {
        Some(idx) if idx > 0 => &base[idx..],
        _ => "",
    }
}

/// Extension without the dot (`js`), or empty.
#[must_use]
pub fn extension(path: &str) -> &str {
    extname(path).trim_start_matches('.')
}

/// Hide a trailing `.js`.
#[must_use]
pub fn hide_ext(path: &str) -> &str {
    if extname(path) == ".js" {
        &path[..path.len() - 3]
    } else {
        path
    }
}

/// Append `.js` when the path has no extension.
#[must_use]
pub fn add_ext(path: &str) -> String {
    if extname(path).is_empty() {
        format!("{path}.js")
    } else {
        path.to_string()
    }
}

/// Resolve `path` against the directory of `base`.
///
/// Non-relative paths are returned normalized. A relative path with no
/// base, or one whose resolution climbs above the package root, fails.
pub fn resolve_path(path: &str, base: Option<&str>) -> Result<String> {
    if !is_relative(path) {
        return Ok(normalize(path));
    }

    let base = base.ok_or_else(|| TransportError::RelativePath {
        path: path.to_string(),
    })?;

    let resolved = join(dirname(base), path);
    if escapes_root(&resolved) {
        return Err(TransportError::OutOfBounds {
            path: path.to_string(),
        });
    }
    Ok(resolved)
}

/// Find a file by trying `path`, `path.js` and `path/index.js` in order.
///
/// Returns `None` when no candidate satisfies `exists`.
pub fn find_file(path: &str, exists: impl Fn(&str) -> bool) -> Option<String> {
    let mut candidates = vec![path.to_string()];
    let ext = extname(path);
    if ext != ".js" {
        candidates.push(format!("{path}.js"));
    }
    if ext.is_empty() {
        candidates.push(format!("{path}/index.js"));
    }

    candidates.into_iter().find(|c| exists(c))
}
