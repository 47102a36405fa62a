#![deny(clippy::all)]
#![warn(clippy::pedantic)]

//! Benchmark harness for cmdwrap.
//!
//! Run benchmarks with: `cargo bench -p cmdwrap-bench`

use cmdwrap_core::{File, Package, PackageGraph};

/// In-memory graph of `packages` chained packages, each holding `files`
/// modules that require the next file and the next package.
///
/// The root is `app@1.0.0`; its entry is `f0.js`.
#[must_use]
pub fn chain_graph(packages: usize, files: usize) -> PackageGraph {
    let mut graph = PackageGraph::new(package("app", "/app", files, (packages > 0).then_some("p0")));
    let mut previous = graph.root();

    for i in 0..packages {
        let next = format!("p{}", i + 1);
        let dep = (i + 1 < packages).then_some(next.as_str());
        let key = graph.add_package(package(
            &format!("p{i}"),
            &format!("/app/sea-modules/p{i}/1.0.0"),
            files,
            dep,
        ));
        graph.add_dependency(previous, format!("p{i}"), key);
        previous = key;
    }

    graph
}

fn package(name: &str, dest: &str, files: usize, dep: Option<&str>) -> Package {
    let mut package = Package::new(name, "1.0.0", dest).with_main("f0.js");
    for i in 0..files {
        let mut requires = Vec::new();
        let mut source = String::new();
        if i + 1 < files {
            requires.push(format!("./f{}", i + 1));
            source.push_str(&format!("var next = require('./f{}');\n", i + 1));
        }
        if let Some(dep) = dep {
            requires.push(dep.to_string());
            source.push_str(&format!("var dep = require('{dep}');\n"));
        }
        source.push_str("module.exports = function () { return next; };\n");
        package.add_file(
            File::new(format!("f{i}.js"))
                .with_requires(requires)
                .with_source(source),
        );
    }
    package
}

#[cfg(test)]
mod tests {
    use super::*;
    use cmdwrap_core::{resolve_deps, ResolveOptions};

    #[test]
    fn test_chain_graph_resolves() {
        let graph = chain_graph(2, 3);
        let entry = graph.main_file(graph.root()).unwrap();
        let deps = resolve_deps(&graph, entry, &ResolveOptions::default()).unwrap();
        assert_eq!(
            deps,
            vec!["app/1.0.0/f1", "app/1.0.0/f2", "p0/1.0.0/f0", "p1/1.0.0/f0"]
        );
    }
}
