use super::{resolve_id, Include, ResolveOptions};
use crate::error::{Result, TransportError};
use crate::graph::{Edge, FileRef, PackageGraph, PackageKey, Seed, Step, Target};
use tracing::debug;

/// Ids that go into the dependency array of `file`, in first-discovery
/// order without duplicates.
///
/// Ignored packages appear as their bare name and are not descended into.
/// Stylesheets never appear; they are inlined elsewhere.
pub fn resolve_deps(graph: &PackageGraph, file: FileRef, options: &ResolveOptions) -> Result<Vec<String>> {
    let extra = implicit_seeds(graph, file, options)?;
    let root = file.package;

    let deps = graph.lookup(file, &extra, |edge| classify(graph, root, edge, options))?;

    debug!(
        package = %graph.package(root).id,
        path = %graph.file(file).path,
        deps = ?deps,
        "resolved deps"
    );
    Ok(deps)
}

fn classify(
    graph: &PackageGraph,
    root: PackageKey,
    edge: &Edge<'_>,
    options: &ResolveOptions,
) -> Result<Step> {
    let (file, crossed) = match &edge.target {
        Target::Unresolved(name) => {
            if options.ignores(name) {
                return Ok(Step::EmitAndStop(name.clone()));
            }
            let dependent = graph.package(edge.dependent.package);
            return Err(TransportError::MissingPackage {
                name: name.clone(),
                from: format!("{}:{}", dependent.id, graph.file(edge.dependent).path),
            });
        }
        Target::File { file, crossed } => (*file, *crossed),
    };

    let package = graph.package(file.package);
    if options.is_ignored(package) {
        return Ok(Step::EmitAndStop(package.name.clone()));
    }
    if graph.file(file).extension() == "css" {
        return Ok(Step::Stop);
    }

    let step = match options.include {
        Include::All => Step::Descend,
        Include::SelfOnly if file.package == root => Step::Emit(resolve_id(graph, file, options)?),
        Include::SelfOnly => Step::Stop,
        Include::Relative if file.package == root || crossed => {
            Step::Emit(resolve_id(graph, file, options)?)
        }
        // Files private to another package only matter for what they require.
        Include::Relative => Step::Descend,
    };
    Ok(step)
}

/// Package a bare `name` required from `package` stands for.
///
/// Implied packages (see [`ImplicitDep`](super::ImplicitDep)) the package
/// does not declare itself are looked up in the root package, which
/// provides the runtimes for everything it bundles.
#[must_use]
pub fn dependency_of(
    graph: &PackageGraph,
    package: PackageKey,
    name: &str,
    options: &ResolveOptions,
) -> Option<PackageKey> {
    graph.package(package).dependency(name).or_else(|| {
        if options.implicit.iter().any(|dep| dep.package == name) {
            graph.root_package().dependency(name)
        } else {
            None
        }
    })
}

/// Packages implied by the extensions of reachable files, as extra
/// lookup seeds of `file`.
///
/// Each implied package is resolved with [`dependency_of`]. One that
/// resolves nowhere is an error unless it is ignored, in which case it is
/// seeded as an unresolved name.
pub fn implicit_seeds(graph: &PackageGraph, file: FileRef, options: &ResolveOptions) -> Result<Vec<Seed>> {
    if options.implicit.is_empty() {
        return Ok(Vec::new());
    }

    let mut triggered = vec![false; options.implicit.len()];
    let mut mark = |extension: &str, dependent: Option<&str>| {
        for (i, dep) in options.implicit.iter().enumerate() {
            if dep.extension == extension && (!dep.js_dependent_only || dependent.map_or(true, |d| d == "js")) {
                triggered[i] = true;
            }
        }
    };

    mark(graph.file(file).extension(), None);
    graph.lookup(file, &[], |edge| {
        let Target::File { file: target, .. } = edge.target else {
            return Ok(Step::Stop);
        };
        if options.is_ignored(graph.package(target.package)) {
            return Ok(Step::Stop);
        }
        mark(
            graph.file(target).extension(),
            Some(graph.file(edge.dependent).extension()),
        );
        Ok(Step::Descend)
    })?;

    let package = graph.package(file.package);
    let mut seeds: Vec<Seed> = Vec::new();
    for (dep, hit) in options.implicit.iter().zip(triggered) {
        if !hit || dep.package == package.name || seeds.iter().any(|(name, _)| *name == dep.package) {
            continue;
        }
        let target = match dependency_of(graph, file.package, &dep.package, options) {
            Some(key) => Target::File {
                file: graph.main_file(key)?,
                crossed: true,
            },
            None if options.ignores(&dep.package) => Target::Unresolved(dep.package.clone()),
            None => {
                return Err(TransportError::ImplicitPackageMissing {
                    name: dep.package.clone(),
                    extension: dep.extension.clone(),
                    package: package.id.clone(),
                })
            }
        };
        seeds.push((dep.package.clone(), target));
    }
    Ok(seeds)
}
