use super::ResolveOptions;
use crate::error::Result;
use crate::graph::{FileRef, Package, PackageGraph};
use crate::paths;
use crate::rename;
use tracing::debug;

/// Module id of a registered file.
pub fn resolve_id(graph: &PackageGraph, file: FileRef, options: &ResolveOptions) -> Result<String> {
    let package = graph.package(file.package);
    resolve_path_id(package, &graph.file(file).path, None, options)
}

/// Module id of `path` inside `package`.
///
/// A relative `path` is resolved against the file `base`; without a base
/// it fails, and so does a path that climbs out of the package.
pub fn resolve_path_id(
    package: &Package,
    path: &str,
    base: Option<&str>,
    options: &ResolveOptions,
) -> Result<String> {
    let path = paths::resolve_path(path, base)?;
    let prefix = options.idleading.prefix(&path, package);

    let path = match &options.rename {
        Some(rule) => {
            let hash = package
                .file(&paths::add_ext(&path))
                .and_then(|f| f.hash.as_deref());
            match rename::apply_in_root(&package.dest_str(), &path, rule, hash) {
                Ok(renamed) => renamed,
                Err(err) => {
                    debug!(package = %package.id, path = %path, error = %err, "rename skipped");
                    path
                }
            }
        }
        None => path,
    };

    let mut path = paths::hide_ext(&path).to_string();
    // Stylesheet ids always end in `.js` for the seajs loader.
    if paths::extname(&path) == ".css" {
        path.push_str(".js");
    }

    let id = join_id(&prefix, &path);
    debug!(package = %package.id, id = %id, "resolved id");
    Ok(id)
}

/// Class name used to box a package's stylesheet rules.
#[must_use]
pub fn style_id(package: &Package, path: &str, options: &ResolveOptions) -> String {
    options
        .idleading
        .prefix(path, package)
        .trim_end_matches('/')
        .replace('/', "-")
        .replace('.', "_")
}

fn join_id(prefix: &str, path: &str) -> String {
    let prefix = prefix.trim_end_matches('/');
    let id = if prefix.is_empty() {
        path.to_string()
    } else {
        format!("{prefix}/{path}")
    };
    paths::win_path(&id)
}
