//! Project loading shared by the resolution commands.

use cmdwrap_core::paths;
use cmdwrap_core::{
    load_graph, FileRef, Idleading, Include, OptionsFile, PackageGraph, ResolveOptions,
    TransportError,
};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Resolution flags accepted by every command. They override `cmdwrap.json`.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct ResolveArgs {
    /// Which files to reach beyond the module itself: relative, self or all
    #[arg(long, global = true, value_name = "MODE")]
    pub include: Option<Include>,

    /// Package names or ids provided externally (repeatable)
    #[arg(long, global = true, value_name = "NAME")]
    pub ignore: Vec<String>,

    /// Id prefix template, e.g. "{{name}}/{{version}}"
    #[arg(long, global = true, value_name = "TEMPLATE")]
    pub idleading: Option<String>,

    /// Scope stylesheets under a per-module class
    #[arg(long, global = true)]
    pub style_box: bool,
}

impl ResolveArgs {
    /// Layer the flags over options read from a file.
    #[must_use]
    pub fn apply(&self, mut options: ResolveOptions) -> ResolveOptions {
        if let Some(include) = self.include {
            options = options.with_include(include);
        }
        if !self.ignore.is_empty() {
            options.ignore.extend(self.ignore.iter().cloned());
        }
        if let Some(idleading) = &self.idleading {
            options = options.with_idleading(Idleading::from(idleading.as_str()));
        }
        if self.style_box {
            options = options.with_style_box(true);
        }
        options
    }
}

/// Everything a command needs from the command line.
#[derive(Debug, Clone)]
pub struct Context {
    pub cwd: PathBuf,
    pub config: Option<PathBuf>,
    pub resolve: ResolveArgs,
    pub json: bool,
}

/// A loaded package graph with its effective options.
#[derive(Debug)]
pub struct Project {
    pub root: PathBuf,
    pub graph: PackageGraph,
    pub options: ResolveOptions,
}

impl Project {
    /// Load the project enclosing `ctx.cwd`.
    pub fn load(ctx: &Context) -> cmdwrap_core::Result<Self> {
        let root = paths::project_root(&ctx.cwd).unwrap_or_else(|| ctx.cwd.clone());
        let root = dunce::canonicalize(&root).unwrap_or(root);

        let file = match &ctx.config {
            Some(path) => OptionsFile::load(&absolute(&ctx.cwd, path))?,
            None => OptionsFile::discover(&root)?.unwrap_or_default(),
        };

        let graph = load_graph(&root, &file.load_options())?;
        let options = ctx.resolve.apply(file.resolve_options());
        debug!(
            root = %root.display(),
            packages = graph.packages().count(),
            "project loaded"
        );

        Ok(Self {
            root,
            graph,
            options,
        })
    }

    /// Map a command line path to a registered file.
    pub fn locate(&self, cwd: &Path, file: &Path) -> cmdwrap_core::Result<FileRef> {
        let path = absolute(cwd, file);
        let path = dunce::canonicalize(&path).map_err(|source| TransportError::Io {
            path: path.clone(),
            source,
        })?;
        self.graph.locate(&path)
    }

    /// Directory under `outdir` that a package's wrapped files go to.
    #[must_use]
    pub fn output_dir(&self, outdir: &Path, file: FileRef) -> PathBuf {
        outdir.join(self.package_prefix(file))
    }

    /// `file`'s path below the output directory, with `/` separators.
    #[must_use]
    pub fn output_relative(&self, file: FileRef) -> String {
        let path = &self.graph.file(file).path;
        let prefix = self.package_prefix(file);
        if prefix.is_empty() {
            path.clone()
        } else {
            format!("{prefix}/{path}")
        }
    }

    fn package_prefix(&self, file: FileRef) -> String {
        if file.package == self.graph.root() {
            String::new()
        } else {
            let package = self.graph.package(file.package);
            format!("{}/{}", package.name, package.version)
        }
    }
}

fn absolute(cwd: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        cwd.join(path)
    }
}
