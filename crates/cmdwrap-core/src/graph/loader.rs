//! Build a [`PackageGraph`] from `package.json` manifests on disk.
//!
//! Layout:
//!
//! ```text
//! <root>/package.json
//! <root>/<module_dir>/<name>/<version>/package.json
//! ```
//!
//! All dependencies, direct or nested, live under the root's module
//! directory. Versions are exact; nothing is selected or installed.

use super::scan::{scan_css_imports, scan_requires};
use super::{File, Package, PackageGraph, PackageKey};
use crate::error::{Result, TransportError};
use crate::paths;
use serde::de::{Deserializer, MapAccess, Visitor};
use serde::Deserialize;
use std::collections::VecDeque;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// Default directory holding installed dependency packages.
pub const DEFAULT_MODULE_DIR: &str = "sea-modules";

/// Manifest file name.
pub const MANIFEST: &str = "package.json";

/// Options for [`load_graph`].
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Directory under the root package holding dependencies.
    pub module_dir: String,
    /// Extra entry files of the root package, relative to its root.
    pub entries: Vec<String>,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            module_dir: DEFAULT_MODULE_DIR.to_string(),
            entries: Vec::new(),
        }
    }
}

impl LoadOptions {
    #[must_use]
    pub fn with_module_dir(mut self, module_dir: impl Into<String>) -> Self {
        self.module_dir = module_dir.into();
        self
    }

    #[must_use]
    pub fn with_entries<I, S>(mut self, entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.entries = entries.into_iter().map(Into::into).collect();
        self
    }
}

#[derive(Debug, Deserialize)]
struct Manifest {
    name: String,
    version: String,
    #[serde(default)]
    spm: SpmSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SpmSection {
    main: Option<String>,
    /// `name -> version` in manifest order.
    #[serde(deserialize_with = "ordered_map")]
    dependencies: Vec<(String, String)>,
    output: Vec<String>,
}

/// A JSON object of strings as pairs, keeping key order. A repeated key
/// keeps its first position and takes the last value.
fn ordered_map<'de, D>(deserializer: D) -> std::result::Result<Vec<(String, String)>, D::Error>
where
    D: Deserializer<'de>,
{
    struct Pairs;

    impl<'de> Visitor<'de> for Pairs {
        type Value = Vec<(String, String)>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a map of package names to versions")
        }

        fn visit_map<A>(self, mut map: A) -> std::result::Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut pairs: Vec<(String, String)> = Vec::with_capacity(map.size_hint().unwrap_or(0));
            while let Some((name, version)) = map.next_entry::<String, String>()? {
                match pairs.iter_mut().find(|(existing, _)| *existing == name) {
                    Some(pair) => pair.1 = version,
                    None => pairs.push((name, version)),
                }
            }
            Ok(pairs)
        }
    }

    deserializer.deserialize_map(Pairs)
}

/// Load the package rooted at `root` and every package it depends on.
///
/// Files of each package are those reachable from its entries (`spm.main`,
/// `spm.output`, plus `options.entries` for the root) through relative
/// requires and relative `@import`s.
pub fn load_graph(root: &Path, options: &LoadOptions) -> Result<PackageGraph> {
    let manifest = read_manifest(root)?;
    let mut package = Package::new(&manifest.name, &manifest.version, root);
    if let Some(main) = &manifest.spm.main {
        package = package.with_main(main);
    }

    let mut entries = entry_list(&package, &manifest);
    entries.extend(options.entries.iter().map(|e| paths::normalize(e)));

    let mut graph = PackageGraph::new(package);
    let root_key = graph.root();
    collect_files(&mut graph, root_key, &entries)?;

    let mut pending: VecDeque<(PackageKey, Vec<(String, String)>)> = VecDeque::new();
    pending.push_back((root_key, manifest.spm.dependencies));

    while let Some((from, dependencies)) = pending.pop_front() {
        for (name, version) in dependencies {
            let id = format!("{name}@{version}");
            if let Some(existing) = graph.find_package(&id) {
                graph.add_dependency(from, name, existing);
                continue;
            }

            let dest = package_dir(root, &options.module_dir, &name, &version);
            let manifest = read_manifest(&dest)?;
            let mut package = Package::new(&name, &version, &dest);
            if let Some(main) = &manifest.spm.main {
                package = package.with_main(main);
            }
            let entries = entry_list(&package, &manifest);

            let key = graph.add_package(package);
            graph.add_dependency(from, name, key);
            collect_files(&mut graph, key, &entries)?;
            pending.push_back((key, manifest.spm.dependencies));
        }
    }

    debug!(
        package = %graph.root_package().id,
        packages = graph.packages().count(),
        "loaded package graph"
    );
    Ok(graph)
}

fn read_manifest(dir: &Path) -> Result<Manifest> {
    let path = dir.join(MANIFEST);
    let content = std::fs::read_to_string(&path).map_err(|source| TransportError::ManifestRead {
        path: path.clone(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| TransportError::ManifestParse { path, source })
}

fn entry_list(package: &Package, manifest: &Manifest) -> Vec<String> {
    let mut entries = vec![package.main.clone()];
    entries.extend(manifest.spm.output.iter().map(|e| paths::normalize(e)));
    entries
}

/// Register every file reachable from `entries` in package `key`.
fn collect_files(graph: &mut PackageGraph, key: PackageKey, entries: &[String]) -> Result<()> {
    let dest = graph.package(key).dest.clone();
    let on_disk = |p: &str| dest.join(p).is_file();

    let mut queue: VecDeque<String> = VecDeque::new();
    for entry in entries {
        match paths::find_file(entry, on_disk) {
            Some(found) => queue.push_back(found),
            None => debug!(package = %graph.package(key).id, entry = %entry, "entry not found"),
        }
    }

    while let Some(path) = queue.pop_front() {
        if graph.package(key).file_index(&path).is_some() {
            continue;
        }

        let abs = dest.join(&path);
        let bytes = std::fs::read(&abs).map_err(|source| TransportError::Io {
            path: abs.clone(),
            source,
        })?;
        let text = String::from_utf8_lossy(&bytes);

        let (requires, local) = match paths::extension(&path) {
            "js" => js_requires(&path, &text, &on_disk),
            "css" => css_requires(&path, &text, &on_disk),
            _ => (Vec::new(), Vec::new()),
        };
        trace!(path = %path, requires = ?requires, "registered file");

        queue.extend(local);
        let file = File::new(path)
            .with_requires(requires)
            .with_hash(cmdwrap_util::hash::short_hash(&bytes));
        graph.package_mut(key).add_file(file);
    }

    Ok(())
}

/// Declared requires of a JS file plus the relative ones found on disk.
fn js_requires(
    path: &str,
    source: &str,
    on_disk: &impl Fn(&str) -> bool,
) -> (Vec<String>, Vec<String>) {
    let mut requires = Vec::new();
    let mut local = Vec::new();
    for call in scan_requires(source) {
        if paths::is_relative(&call.path) {
            // Unresolvable relative requires are kept; resolution reports them.
            if let Some(found) = paths::resolve_path(&call.path, Some(path))
                .ok()
                .and_then(|resolved| paths::find_file(&resolved, on_disk))
            {
                local.push(found);
            }
        }
        if !requires.contains(&call.path) {
            requires.push(call.path);
        }
    }
    (requires, local)
}

fn css_requires(
    path: &str,
    source: &str,
    on_disk: &impl Fn(&str) -> bool,
) -> (Vec<String>, Vec<String>) {
    let mut requires = Vec::new();
    let mut local = Vec::new();
    for import in scan_css_imports(source) {
        if import.is_remote() {
            continue;
        }
        if paths::is_relative(&import.path) {
            if let Ok(resolved) = paths::resolve_path(&import.path, Some(path)) {
                if on_disk(&resolved) {
                    local.push(resolved);
                }
            }
        }
        if !requires.contains(&import.path) {
            requires.push(import.path);
        }
    }
    (requires, local)
}

/// Absolute directory of a dependency package.
#[must_use]
pub fn package_dir(root: &Path, module_dir: &str, name: &str, version: &str) -> PathBuf {
    root.join(module_dir).join(name).join(version)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn fixture(root: &Path) {
        write(
            root,
            "package.json",
            r#"{"name":"p","version":"1.0.0","spm":{"main":"src/a.js","dependencies":{"c":"1.1.1"}}}"#,
        );
        write(root, "src/a.js", "require('./b');\nrequire('c');\n");
        write(root, "src/b.js", "require('./style.css');\n");
        write(root, "src/style.css", "@import './base.css';\nbody{}\n");
        write(root, "src/base.css", "html{}\n");
        write(root, "src/unused.js", "");
        write(
            root,
            "sea-modules/c/1.1.1/package.json",
            r#"{"name":"c","version":"1.1.1"}"#,
        );
        write(root, "sea-modules/c/1.1.1/index.js", "module.exports = 1;\n");
    }

    #[test]
    fn test_load_reachable_files() {
        let dir = tempdir().unwrap();
        fixture(dir.path());

        let graph = load_graph(dir.path(), &LoadOptions::default()).unwrap();
        let root = graph.root_package();
        assert_eq!(root.id, "p@1.0.0");
        assert_eq!(root.main, "src/a.js");

        let files: Vec<_> = root.files().iter().map(|f| f.path.as_str()).collect();
        assert_eq!(
            files,
            vec!["src/a.js", "src/b.js", "src/style.css", "src/base.css"]
        );
        assert_eq!(root.file("src/a.js").unwrap().requires, vec!["./b", "c"]);
        assert_eq!(
            root.file("src/style.css").unwrap().requires,
            vec!["./base.css"]
        );
        assert!(root.files().iter().all(|f| f.hash.as_deref().map(str::len) == Some(8)));
    }

    #[test]
    fn test_load_dependencies() {
        let dir = tempdir().unwrap();
        fixture(dir.path());

        let graph = load_graph(dir.path(), &LoadOptions::default()).unwrap();
        let c = graph.root_package().dependency("c").unwrap();
        let pkg = graph.package(c);
        assert_eq!(pkg.id, "c@1.1.1");
        assert_eq!(pkg.parent, Some(graph.root()));
        assert!(pkg.file("index.js").is_some());
    }

    #[test]
    fn test_dependencies_keep_manifest_order() {
        let dir = tempdir().unwrap();
        write(
            dir.path(),
            "package.json",
            r#"{"name":"p","version":"1.0.0","spm":{"dependencies":{"zeta":"1.0.0","alpha":"1.0.0","mid":"1.0.0"}}}"#,
        );
        for name in ["zeta", "alpha", "mid"] {
            write(
                dir.path(),
                &format!("sea-modules/{name}/1.0.0/package.json"),
                &format!(r#"{{"name":"{name}","version":"1.0.0"}}"#),
            );
        }

        let graph = load_graph(dir.path(), &LoadOptions::default()).unwrap();
        let names: Vec<&str> = graph
            .root_package()
            .dependencies()
            .iter()
            .map(|(name, _)| name.as_str())
            .collect();
        assert_eq!(names, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_dependency_versions_must_be_strings() {
        let dir = tempdir().unwrap();
        write(
            dir.path(),
            "package.json",
            r#"{"name":"p","version":"1.0.0","spm":{"dependencies":{"c":1}}}"#,
        );

        let err = load_graph(dir.path(), &LoadOptions::default()).unwrap_err();
        assert_eq!(err.code(), crate::error::codes::MANIFEST_INVALID);
    }

    #[test]
    fn test_extra_entries() {
        let dir = tempdir().unwrap();
        fixture(dir.path());

        let options = LoadOptions::default().with_entries(["src/unused.js"]);
        let graph = load_graph(dir.path(), &options).unwrap();
        assert!(graph.root_package().file("src/unused.js").is_some());
    }

    #[test]
    fn test_missing_dependency_manifest() {
        let dir = tempdir().unwrap();
        write(
            dir.path(),
            "package.json",
            r#"{"name":"p","version":"1.0.0","spm":{"dependencies":{"c":"1.1.1"}}}"#,
        );

        let err = load_graph(dir.path(), &LoadOptions::default()).unwrap_err();
        assert!(matches!(err, TransportError::ManifestRead { .. }));
    }

    #[test]
    fn test_invalid_manifest() {
        let dir = tempdir().unwrap();
        write(dir.path(), "package.json", r#"{"name":"p"}"#);

        let err = load_graph(dir.path(), &LoadOptions::default()).unwrap_err();
        assert_eq!(err.code(), crate::error::codes::MANIFEST_INVALID);
    }

    #[test]
    fn test_custom_module_dir() {
        let dir = tempdir().unwrap();
        write(
            dir.path(),
            "package.json",
            r#"{"name":"p","version":"1.0.0","spm":{"dependencies":{"c":"1.0.0"}}}"#,
        );
        write(dir.path(), "index.js", "require('c');");
        write(
            dir.path(),
            "spm_modules/c/1.0.0/package.json",
            r#"{"name":"c","version":"1.0.0"}"#,
        );
        write(dir.path(), "spm_modules/c/1.0.0/index.js", "");

        let options = LoadOptions::default().with_module_dir("spm_modules");
        let graph = load_graph(dir.path(), &options).unwrap();
        let c = graph.root_package().dependency("c").unwrap();
        assert_eq!(
            graph.package(c).dest,
            package_dir(dir.path(), "spm_modules", "c", "1.0.0")
        );
    }
}
