//! Package/file graph.
//!
//! Packages live in an arena and are addressed by [`PackageKey`]; files are
//! addressed by [`FileRef`]. Dependency edges are `name -> PackageKey`
//! entries on the depending package, so cyclic package declarations are
//! representable without shared ownership. Nothing in the graph records
//! visitation state; traversals own their visited sets.

mod loader;
mod lookup;
mod scan;

pub use loader::{load_graph, LoadOptions, DEFAULT_MODULE_DIR};
pub use lookup::{Edge, Seed, Step, Target};
pub use scan::{scan_css_imports, scan_requires, CssImport, RequireCall};

use crate::error::{Result, TransportError};
use crate::paths;
use crate::template::TemplateData;
use rustc_hash::FxHashMap as HashMap;
use std::borrow::Cow;
use std::path::{Path, PathBuf};

/// Index of a package in the graph arena.
pub type PackageKey = usize;

/// Identity of a file: owning package plus index in that package.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FileRef {
    pub package: PackageKey,
    pub index: usize,
}

/// A source file owned by a package.
#[derive(Debug, Clone, Default)]
pub struct File {
    /// Path relative to the package root, forward slashes.
    pub path: String,
    /// Declared requires in source order, relative (`./b`) or bare (`c`).
    pub requires: Vec<String>,
    /// Short content hash, for `{{hash}}` rename rules.
    pub hash: Option<String>,
    /// In-memory contents. When absent, the file is read from disk.
    pub source: Option<String>,
}

impl File {
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: paths::win_path(&path.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_requires<I, S>(mut self, requires: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.requires = requires.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    #[must_use]
    pub fn with_hash(mut self, hash: impl Into<String>) -> Self {
        self.hash = Some(hash.into());
        self
    }

    /// Extension without the dot (`js`, `css`, `handlebars`).
    #[must_use]
    pub fn extension(&self) -> &str {
        paths::extension(&self.path)
    }
}

/// A package: `name@version` with its files and resolved dependencies.
#[derive(Debug, Clone)]
pub struct Package {
    pub name: String,
    pub version: String,
    /// `name@version`.
    pub id: String,
    /// Entry file, relative to `dest`.
    pub main: String,
    /// Root directory of the package on disk.
    pub dest: PathBuf,
    /// Package that first declared this one as a dependency.
    pub parent: Option<PackageKey>,
    dependencies: Vec<(String, PackageKey)>,
    files: Vec<File>,
    file_index: HashMap<String, usize>,
}

impl Package {
    #[must_use]
    pub fn new(name: impl Into<String>, version: impl Into<String>, dest: impl Into<PathBuf>) -> Self {
        let name = name.into();
        let version = version.into();
        Self {
            id: format!("{name}@{version}"),
            name,
            version,
            main: "index.js".to_string(),
            dest: dest.into(),
            parent: None,
            dependencies: Vec::new(),
            files: Vec::new(),
            file_index: HashMap::default(),
        }
    }

    #[must_use]
    pub fn with_main(mut self, main: impl Into<String>) -> Self {
        self.main = paths::normalize(&main.into());
        self
    }

    #[must_use]
    pub fn with_file(mut self, file: File) -> Self {
        self.add_file(file);
        self
    }

    /// Register a file, replacing any file already registered at its path.
    pub fn add_file(&mut self, file: File) -> usize {
        if let Some(&idx) = self.file_index.get(&file.path) {
            self.files[idx] = file;
            return idx;
        }
        let idx = self.files.len();
        self.file_index.insert(file.path.clone(), idx);
        self.files.push(file);
        idx
    }

    /// Index of the file registered at `path`.
    #[must_use]
    pub fn file_index(&self, path: &str) -> Option<usize> {
        self.file_index.get(path).copied()
    }

    #[must_use]
    pub fn file(&self, path: &str) -> Option<&File> {
        self.file_index(path).map(|idx| &self.files[idx])
    }

    /// Files in registration order.
    #[must_use]
    pub fn files(&self) -> &[File] {
        &self.files
    }

    /// Declared dependencies in declaration order.
    #[must_use]
    pub fn dependencies(&self) -> &[(String, PackageKey)] {
        &self.dependencies
    }

    /// Resolve a bare dependency name.
    #[must_use]
    pub fn dependency(&self, name: &str) -> Option<PackageKey> {
        self.dependencies
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, key)| *key)
    }

    /// Root directory as a forward-slash string.
    #[must_use]
    pub fn dest_str(&self) -> String {
        cmdwrap_util::fs::to_slash(&self.dest)
    }

    fn file_list(&self) -> String {
        self.files
            .iter()
            .map(|f| f.path.as_str())
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl TemplateData for Package {
    fn field(&self, key: &str) -> Option<Cow<'_, str>> {
        match key {
            "name" => Some(Cow::Borrowed(&self.name)),
            "version" => Some(Cow::Borrowed(&self.version)),
            "id" => Some(Cow::Borrowed(&self.id)),
            "main" => Some(Cow::Borrowed(&self.main)),
            "dest" => Some(Cow::Owned(self.dest_str())),
            _ => None,
        }
    }
}

/// Read-only package graph rooted at the package being built.
#[derive(Debug, Clone)]
pub struct PackageGraph {
    packages: Vec<Package>,
    root: PackageKey,
}

impl PackageGraph {
    /// Create a graph with `root` as the package being built.
    #[must_use]
    pub fn new(root: Package) -> Self {
        Self {
            packages: vec![root],
            root: 0,
        }
    }

    /// Add a package, returning its key. Packages with the same id are
    /// shared.
    pub fn add_package(&mut self, package: Package) -> PackageKey {
        if let Some(key) = self.find_package(&package.id) {
            return key;
        }
        self.packages.push(package);
        self.packages.len() - 1
    }

    /// Declare that `from` depends on `to` under `name`.
    pub fn add_dependency(&mut self, from: PackageKey, name: impl Into<String>, to: PackageKey) {
        let name = name.into();
        if self.packages[to].parent.is_none() && to != self.root {
            self.packages[to].parent = Some(from);
        }
        let deps = &mut self.packages[from].dependencies;
        match deps.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = to,
            None => deps.push((name, to)),
        }
    }

    #[must_use]
    pub fn root(&self) -> PackageKey {
        self.root
    }

    #[must_use]
    pub fn root_package(&self) -> &Package {
        &self.packages[self.root]
    }

    #[must_use]
    pub fn package(&self, key: PackageKey) -> &Package {
        &self.packages[key]
    }

    pub fn package_mut(&mut self, key: PackageKey) -> &mut Package {
        &mut self.packages[key]
    }

    /// Find a package by `name@version`.
    #[must_use]
    pub fn find_package(&self, id: &str) -> Option<PackageKey> {
        self.packages.iter().position(|p| p.id == id)
    }

    pub fn packages(&self) -> impl Iterator<Item = (PackageKey, &Package)> {
        self.packages.iter().enumerate()
    }

    #[must_use]
    pub fn file(&self, file: FileRef) -> &File {
        &self.packages[file.package].files[file.index]
    }

    /// Look up a registered file of a package.
    pub fn file_ref(&self, package: PackageKey, path: &str) -> Result<FileRef> {
        let pkg = &self.packages[package];
        let path = paths::normalize(path);
        pkg.file_index(&path)
            .map(|index| FileRef { package, index })
            .ok_or_else(|| TransportError::FileNotRegistered {
                path,
                package: pkg.file_list(),
            })
    }

    /// The entry file of a package.
    pub fn main_file(&self, package: PackageKey) -> Result<FileRef> {
        self.file_ref(package, &self.packages[package].main)
    }

    /// Map an absolute path to the file it names, searching the root
    /// package first and then every dependency.
    pub fn locate(&self, path: &Path) -> Result<FileRef> {
        let path_str = cmdwrap_util::fs::to_slash(path);
        let root = &self.packages[self.root];
        let relative = relative_to(&path_str, &root.dest_str());

        if let Some(rel) = &relative {
            if let Some(index) = root.file_index(rel) {
                return Ok(FileRef {
                    package: self.root,
                    index,
                });
            }
        }

        // Dependencies usually live below the root's dest, so the longest
        // matching dest wins.
        let mut best: Option<(usize, FileRef)> = None;
        for (key, pkg) in self.packages() {
            if key == self.root {
                continue;
            }
            let dest = pkg.dest_str();
            if let Some(rel) = relative_to(&path_str, &dest) {
                if let Some(index) = pkg.file_index(&rel) {
                    if best.map_or(true, |(len, _)| dest.len() > len) {
                        best = Some((dest.len(), FileRef { package: key, index }));
                    }
                }
            }
        }

        best.map(|(_, file)| file)
            .ok_or_else(|| TransportError::FileNotRegistered {
                path: relative.unwrap_or(path_str),
                package: root.id.clone(),
            })
    }

    /// Contents of a file, from memory or from disk.
    pub fn source(&self, file: FileRef) -> Result<Cow<'_, str>> {
        let f = self.file(file);
        if let Some(source) = &f.source {
            return Ok(Cow::Borrowed(source));
        }
        let path = self.absolute_path(file);
        cmdwrap_util::fs::read_source(&path)
            .map(Cow::Owned)
            .map_err(|source| TransportError::Io { path, source })
    }

    /// Absolute path of a file on disk.
    #[must_use]
    pub fn absolute_path(&self, file: FileRef) -> PathBuf {
        self.packages[file.package]
            .dest
            .join(&self.file(file).path)
    }

    /// Resolve one declared require of `from` to its target.
    pub fn resolve_require(&self, from: FileRef, require: &str) -> Result<Target> {
        let pkg = &self.packages[from.package];

        if paths::is_relative(require) {
            let resolved = paths::resolve_path(require, Some(&self.file(from).path))?;
            let found = paths::find_file(&resolved, |p| pkg.file_index(p).is_some())
                .ok_or_else(|| TransportError::FileNotRegistered {
                    path: resolved.clone(),
                    package: pkg.file_list(),
                })?;
            return self
                .file_ref(from.package, &found)
                .map(|file| Target::File { file, crossed: false });
        }

        match pkg.dependency(require) {
            Some(dep) => self
                .main_file(dep)
                .map(|file| Target::File { file, crossed: true }),
            None => Ok(Target::Unresolved(require.to_string())),
        }
    }
}

/// `path` relative to `root` when it lies below it.
fn relative_to(path: &str, root: &str) -> Option<String> {
    let root = root.trim_end_matches('/');
    path.strip_prefix(root)
        .and_then(|rest| rest.strip_prefix('/'))
        .map(paths::normalize)
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_ref_not_registered_lists_files() {
        let graph = fixtures::simple();
        let err = graph.file_ref(0, "not-exist.js").unwrap_err();
        assert_eq!(
            err.to_string(),
            "not-exist.js is not included in src/a.js,src/b.js"
        );
    }

    #[test]
    fn test_resolve_require_relative() {
        let graph = fixtures::simple();
        let a = graph.file_ref(0, "src/a.js").unwrap();
        match graph.resolve_require(a, "./b").unwrap() {
            Target::File { file, crossed } => {
                assert_eq!(graph.file(file).path, "src/b.js");
                assert!(!crossed);
            }
            Target::Unresolved(name) => panic!("unexpected unresolved {name}"),
        }
    }

    #[test]
    fn test_resolve_require_bare() {
        let graph = fixtures::simple();
        let a = graph.file_ref(0, "src/a.js").unwrap();
        match graph.resolve_require(a, "c").unwrap() {
            Target::File { file, crossed } => {
                assert_eq!(graph.package(file.package).id, "C@1.1.1");
                assert!(crossed);
            }
            Target::Unresolved(name) => panic!("unexpected unresolved {name}"),
        }
        assert!(matches!(
            graph.resolve_require(a, "zzz").unwrap(),
            Target::Unresolved(name) if name == "zzz"
        ));
    }

    #[test]
    fn test_resolve_require_out_of_bound() {
        let graph = fixtures::simple();
        let a = graph.file_ref(0, "src/a.js").unwrap();
        let err = graph.resolve_require(a, "../../x").unwrap_err();
        assert!(matches!(err, TransportError::OutOfBounds { .. }));
    }

    #[test]
    fn test_locate_prefers_deepest_package() {
        let graph = fixtures::simple();
        let file = graph
            .locate(Path::new("/work/p/sea-modules/C/1.1.1/index.js"))
            .unwrap();
        assert_eq!(graph.package(file.package).name, "C");

        let file = graph.locate(Path::new("/work/p/src/b.js")).unwrap();
        assert_eq!(file.package, graph.root());
    }

    #[test]
    fn test_locate_unknown_file() {
        let graph = fixtures::simple();
        let err = graph.locate(Path::new("/work/p/sea-modules/b/1.0.1/index.css")).unwrap_err();
        assert_eq!(
            err.to_string(),
            "sea-modules/b/1.0.1/index.css is not included in P@1.0.0"
        );
    }

    #[test]
    fn test_dependency_parent_is_first_declarer() {
        let graph = fixtures::simple();
        let c = graph.package(0).dependency("c").unwrap();
        assert_eq!(graph.package(c).parent, Some(0));
        assert_eq!(graph.root_package().parent, None);
    }

    #[test]
    fn test_package_template_fields() {
        let pkg = Package::new("a", "1.0.0", "/x");
        assert_eq!(crate::template::template("{{id}}|{{dest}}", &pkg), "a@1.0.0|/x");
    }

    #[test]
    fn test_in_memory_source() {
        let root = Package::new("a", "1.0.0", "/nowhere")
            .with_file(File::new("index.js").with_source("var a;"));
        let graph = PackageGraph::new(root);
        let file = graph.main_file(0).unwrap();
        assert_eq!(graph.source(file).unwrap(), "var a;");
    }
}
