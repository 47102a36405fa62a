//! CMD module wrapping.
//!
//! ```text
//! define("<id>", [<deps>], function(require, exports, module){
//! <body>
//! });
//! ```

mod body;

pub use body::{css_body, json_body, tpl_body};

use crate::css::inline_css;
use crate::error::{Result, TransportError};
use crate::graph::{scan_requires, FileRef, PackageGraph};
use crate::paths;
use crate::rename;
use crate::resolve::{collect_files, dependency_of, resolve_deps, resolve_id, resolve_path_id, style_id, ResolveOptions};
use crate::template::template;
use serde::Serialize;
use tracing::debug;

const HEADER: &str = "define(\"{{id}}\", [{{deps}}], function(require, exports, module){\n";
const FOOTER: &str = "\n});\n";

/// Output of [`transport`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Transported {
    pub id: String,
    pub deps: Vec<String>,
    pub code: String,
}

/// Output of [`concat`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Bundle {
    /// Id of the entry module.
    pub id: String,
    /// Dependency array of the entry module.
    pub deps: Vec<String>,
    /// Ids of every module in the bundle, entry first.
    pub modules: Vec<String>,
    pub code: String,
}

/// Double-quoted, comma-joined dependency list.
#[must_use]
pub fn format_deps(deps: &[String]) -> String {
    deps.iter()
        .map(|d| format!("\"{d}\""))
        .collect::<Vec<_>>()
        .join(",")
}

/// The `define(...)` line opening a module.
#[must_use]
pub fn define_header(id: &str, deps: &[String]) -> String {
    let deps = format_deps(deps);
    template(HEADER, &[("id", id), ("deps", deps.as_str())])
}

/// Wrap `body` in a complete `define(...)` call.
#[must_use]
pub fn wrap_define(id: &str, deps: &[String], body: &str) -> String {
    let mut code = define_header(id, deps);
    code.push_str(body);
    code.push_str(FOOTER);
    code
}

/// Rewrite `require("x")` calls in `code` to module ids, as seen from
/// `file`.
///
/// Relative requires become the id of the file they name; bare names of
/// declared, non-ignored packages become the id of the package entry,
/// with implied runtimes found through [`dependency_of`]. Anything else is
/// left as written.
pub fn replace_requires(
    graph: &PackageGraph,
    file: FileRef,
    code: &str,
    options: &ResolveOptions,
) -> Result<String> {
    let package = graph.package(file.package);
    let base = &graph.file(file).path;

    let mut out = String::with_capacity(code.len());
    let mut last = 0;
    for call in scan_requires(code) {
        let require = paths::hide_ext(&call.path);
        let id = if paths::is_relative(require) {
            let resolved = paths::resolve_path(require, Some(base))?;
            let found = paths::find_file(&resolved, |p| package.file_index(p).is_some())
                .unwrap_or(resolved);
            resolve_path_id(package, &found, None, options)?
        } else {
            match dependency_of(graph, file.package, require, options) {
                Some(dep) if !options.is_ignored(graph.package(dep)) && !options.ignores(require) => {
                    resolve_id(graph, graph.main_file(dep)?, options)?
                }
                _ => require.to_string(),
            }
        };

        out.push_str(&code[last..call.start]);
        out.push_str(&format!("require(\"{id}\")"));
        last = call.end;
    }
    out.push_str(&code[last..]);
    Ok(out)
}

/// Wrap one file as a CMD module.
///
/// `.js` is wrapped as is, `.css` is inlined and turned into a style
/// injecting module, `.json`, `.tpl` and `.html` become `module.exports`
/// bodies.
pub fn transport(graph: &PackageGraph, file: FileRef, options: &ResolveOptions) -> Result<Transported> {
    let f = graph.file(file);
    let package = graph.package(file.package);
    let extension = f.extension();

    let (deps, body) = match extension {
        "js" => {
            let deps = resolve_deps(graph, file, options)?;
            let source = graph.source(file)?;
            let mut body = replace_requires(graph, file, &source, options)?;
            if options.style_box {
                body.push_str(&format!(
                    "module.exports.outerBoxClass=\"{}\";\n",
                    style_id(package, &f.path, options)
                ));
            }
            (deps, body)
        }
        "css" => {
            let deps = resolve_deps(graph, file, options)?;
            let css = inline_css(graph, file, options)?;
            let prefix = options
                .style_box
                .then(|| format!(".{}", style_id(package, &f.path, options)));
            let body = css_body(&css, prefix.as_deref(), &f.path)?;
            (deps, replace_requires(graph, file, &body, options)?)
        }
        "json" => (Vec::new(), json_body(&graph.source(file)?, &f.path)?),
        "tpl" | "html" => (Vec::new(), tpl_body(&graph.source(file)?)),
        other => {
            return Err(TransportError::UnsupportedExtension {
                extension: other.to_string(),
                path: f.path.clone(),
            })
        }
    };

    let id = resolve_id(graph, file, options)?;
    debug!(package = %package.id, path = %f.path, id = %id, "wrapped");
    let code = wrap_define(&id, &deps, &body);
    Ok(Transported { id, deps, code })
}

/// Wrap `file` followed by every file [`collect_files`] bundles with it,
/// as one concatenated script.
pub fn concat(graph: &PackageGraph, file: FileRef, options: &ResolveOptions) -> Result<Bundle> {
    let entry = transport(graph, file, options)?;
    let mut modules = vec![entry.id.clone()];
    let mut code = entry.code;

    for member in collect_files(graph, file, options)? {
        let module = transport(graph, member, options)?;
        code.push_str(&module.code);
        modules.push(module.id);
    }

    debug!(id = %entry.id, modules = modules.len(), "concatenated");
    Ok(Bundle {
        id: entry.id,
        deps: entry.deps,
        modules,
        code,
    })
}

/// Package-relative path a wrapped file is written to.
///
/// Non-JS sources gain a `.js` suffix; the rename rule applies with the
/// same fallback as ids.
#[must_use]
pub fn output_path(graph: &PackageGraph, file: FileRef, options: &ResolveOptions) -> String {
    let package = graph.package(file.package);
    let f = graph.file(file);
    let path = if f.extension() == "js" {
        f.path.clone()
    } else {
        format!("{}.js", f.path)
    };

    let Some(rule) = &options.rename else {
        return path;
    };
    rename::apply_in_root(&package.dest_str(), &path, rule, f.hash.as_deref()).unwrap_or_else(|err| {
        debug!(path = %path, error = %err, "rename skipped");
        path
    })
}
