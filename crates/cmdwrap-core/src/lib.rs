#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::return_self_not_must_use)]

//! Module id and dependency resolution for CMD (seajs) packages.
//!
//! A [`PackageGraph`] is loaded from `package.json` manifests with
//! [`load_graph`]; [`resolve_id`] and [`resolve_deps`] compute the id and
//! dependency array of any registered file, [`inline_css`] flattens
//! stylesheet imports, [`transport`] wraps a file into a `define()`
//! module and [`concat`] bundles it with the files it pulls in.

pub mod config;
pub mod css;
pub mod error;
pub mod graph;
pub mod paths;
pub mod rename;
pub mod resolve;
pub mod template;
pub mod version;
pub mod wrap;

pub use config::{Config, OptionsFile};
pub use css::{inline_css, inline_css_with_resources, ConflictTracker, InlinedCss, Resource, StyleInliner};
pub use error::{Result, TransportError};
pub use graph::{load_graph, File, FileRef, LoadOptions, Package, PackageGraph, PackageKey};
pub use rename::{RenameError, RenameRule, RenameSpec};
pub use resolve::{
    collect_files, resolve_deps, resolve_id, resolve_path_id, style_id, Idleading, ImplicitDep, Include,
    ResolveOptions,
};
pub use version::VERSION;
pub use wrap::{concat, define_header, transport, wrap_define, Bundle, Transported};
