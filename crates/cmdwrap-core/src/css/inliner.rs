use super::resources::{Resource, Resources};
use super::{collapse_blank_lines, ConflictTracker};
use crate::error::{Result, TransportError};
use crate::graph::{scan_css_imports, FileRef, PackageGraph};
use crate::paths;
use crate::resolve::ResolveOptions;
use rustc_hash::FxHashSet as HashSet;
use serde::Serialize;
use std::path::PathBuf;
use tracing::debug;

/// A flattened stylesheet and the files its `url()`s point at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InlinedCss {
    pub css: String,
    pub resources: Vec<Resource>,
}

/// Flatten the `@import`s of one stylesheet.
///
/// State lives for a single [`StyleInliner::inline`] call.
pub struct StyleInliner<'g> {
    graph: &'g PackageGraph,
    options: &'g ResolveOptions,
    imported: HashSet<PathBuf>,
    conflicts: ConflictTracker,
    resources: Option<Resources>,
}

impl<'g> StyleInliner<'g> {
    #[must_use]
    pub fn new(graph: &'g PackageGraph, options: &'g ResolveOptions) -> Self {
        Self {
            graph,
            options,
            imported: HashSet::default(),
            conflicts: ConflictTracker::new(),
            resources: None,
        }
    }

    /// Also rewrite local `url()`s for a stylesheet written to `output`,
    /// a path below the output root. See [`inline_css_with_resources`].
    #[must_use]
    pub fn with_resources(mut self, output: &str) -> Self {
        self.resources = Some(Resources::new(output));
        self
    }

    /// Inline `root` and everything it imports.
    pub fn inline(self, root: FileRef) -> Result<String> {
        self.inline_with_resources(root).map(|out| out.css)
    }

    /// Inline `root`, returning the resources found when rewriting is on.
    pub fn inline_with_resources(mut self, root: FileRef) -> Result<InlinedCss> {
        self.imported.insert(self.graph.absolute_path(root));
        let css = self.inline_file(root)?;
        Ok(InlinedCss {
            css,
            resources: self.resources.map(|r| r.found).unwrap_or_default(),
        })
    }

    fn push_text(&mut self, out: &mut String, file: FileRef, text: &str) {
        match &mut self.resources {
            Some(resources) => out.push_str(&resources.rewrite(self.graph, file, text)),
            None => out.push_str(text),
        }
    }

    fn inline_file(&mut self, file: FileRef) -> Result<String> {
        let graph = self.graph;
        let source = graph.source(file)?;
        let mut out = String::with_capacity(source.len());
        let mut last = 0;

        for import in scan_css_imports(&source) {
            self.push_text(&mut out, file, &source[last..import.start]);
            last = import.end;

            if import.is_remote() {
                out.push_str(&source[import.start..import.end]);
                continue;
            }

            let Some(target) = self.resolve_import(file, &import.path)? else {
                continue;
            };
            if !self.imported.insert(graph.absolute_path(target)) {
                continue;
            }

            debug!(
                from = %graph.file(file).path,
                import = %graph.file(target).path,
                package = %graph.package(target.package).id,
                "inline import"
            );
            let inlined = self.inline_file(target)?;
            out.push_str(&inlined);
        }
        self.push_text(&mut out, file, &source[last..]);

        Ok(collapse_blank_lines(&out))
    }

    /// The file an import names, or `None` when it is elided.
    fn resolve_import(&mut self, from: FileRef, import: &str) -> Result<Option<FileRef>> {
        let graph = self.graph;

        if paths::is_relative(import) {
            let path = paths::resolve_path(import, Some(&graph.file(from).path))?;
            return graph.file_ref(from.package, &path).map(Some);
        }

        if self.options.ignores(import) {
            return Ok(None);
        }
        let package = graph.package(from.package);
        let Some(dep) = package.dependency(import) else {
            return Err(TransportError::PackageNotFound {
                name: import.to_string(),
                from: format!("{}:{}", package.id, graph.file(from).path),
            });
        };
        let dep_package = graph.package(dep);
        if self.options.is_ignored(dep_package) {
            return Ok(None);
        }

        self.conflicts.record(dep_package)?;
        graph.main_file(dep).map(Some)
    }
}

/// Inline the stylesheet `file` with fresh per-call state.
pub fn inline_css(graph: &PackageGraph, file: FileRef, options: &ResolveOptions) -> Result<String> {
    StyleInliner::new(graph, options).inline(file)
}

/// Inline `file` for writing to `output` below an output root.
///
/// Local `url()`s of every inlined file are pointed at one flat directory,
/// the output root, and returned as resources to copy there. Resources of
/// dependency packages are prefixed with their package id.
pub fn inline_css_with_resources(
    graph: &PackageGraph,
    file: FileRef,
    options: &ResolveOptions,
    output: &str,
) -> Result<InlinedCss> {
    StyleInliner::new(graph, options)
        .with_resources(output)
        .inline_with_resources(file)
}
