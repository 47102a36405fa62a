use super::{implicit_seeds, Include, ResolveOptions};
use crate::error::{Result, TransportError};
use crate::graph::{FileRef, PackageGraph, Step, Target};
use tracing::debug;

/// Registered files bundled after `file` when concatenating, in discovery
/// order without duplicates. `file` itself is not listed.
///
/// Which files qualify depends on `options.include`:
///
/// - `relative`: files of `file`'s own package
/// - `self`: stylesheets only
/// - `all`: every reachable file outside ignored packages, including
///   implied runtimes
///
/// A stylesheet qualifies when a JS file of the own package requires it,
/// or any JS file under `all`. Stylesheets imported by stylesheets are
/// inlined into their importer and never listed.
pub fn collect_files(graph: &PackageGraph, file: FileRef, options: &ResolveOptions) -> Result<Vec<FileRef>> {
    let own = graph.package(file.package).name.as_str();
    let extra = implicit_seeds(graph, file, options)?;
    let mut files: Vec<FileRef> = Vec::new();

    graph.lookup(file, &extra, |edge| {
        let target = match &edge.target {
            Target::File { file, .. } => *file,
            Target::Unresolved(name) if options.ignores(name) => return Ok(Step::Stop),
            Target::Unresolved(name) => {
                let dependent = graph.package(edge.dependent.package);
                return Err(TransportError::MissingPackage {
                    name: name.clone(),
                    from: format!("{}:{}", dependent.id, graph.file(edge.dependent).path),
                });
            }
        };

        let package = graph.package(target.package);
        if options.is_ignored(package) {
            return Ok(Step::Stop);
        }

        let included = if graph.file(target).extension() == "css" {
            match graph.file(edge.dependent).extension() {
                "css" => false,
                "js" => options.include == Include::All || graph.package(edge.dependent.package).name == own,
                _ => true,
            }
        } else {
            match options.include {
                Include::SelfOnly => false,
                Include::Relative => package.name == own,
                Include::All => true,
            }
        };
        if !included {
            return Ok(Step::Stop);
        }

        if !files.contains(&target) {
            files.push(target);
        }
        Ok(Step::Descend)
    })?;

    debug!(
        package = %graph.package(file.package).id,
        path = %graph.file(file).path,
        include = %options.include,
        files = files.len(),
        "collected files"
    );
    Ok(files)
}
