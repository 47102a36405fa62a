use crate::graph::{FileRef, PackageGraph};
use regex_lite::{Captures, Regex};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::OnceLock;
use tracing::trace;

fn url_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"url\(\s*(?:'([^']*)'|"([^"]*)"|([^'")\s]*))\s*\)"#).expect("url pattern is valid")
    })
}

/// A local file referenced by `url()` in an inlined stylesheet. It is
/// copied to the output root under `name`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resource {
    pub source: PathBuf,
    pub name: String,
}

/// Rewrites local `url()` references to files flattened into the output
/// root, collecting what has to be copied there.
#[derive(Debug)]
pub(crate) struct Resources {
    /// Path from the output stylesheet's directory back to the output root.
    up: String,
    pub(crate) found: Vec<Resource>,
}

impl Resources {
    /// `output` is the stylesheet's path below the output root.
    pub(crate) fn new(output: &str) -> Self {
        let depth = output
            .split('/')
            .filter(|segment| !segment.is_empty() && *segment != ".")
            .count()
            .saturating_sub(1);
        Self {
            up: "../".repeat(depth),
            found: Vec::new(),
        }
    }

    /// Rewrite the `url()`s of `text`, a piece of `file`'s source.
    ///
    /// Files of dependency packages are renamed after their package id so
    /// that equal basenames from different packages do not collide.
    pub(crate) fn rewrite(&mut self, graph: &PackageGraph, file: FileRef, text: &str) -> String {
        let prefix = if file.package == graph.root() {
            String::new()
        } else {
            format!("{}_", graph.package(file.package).id.replace(['@', '.'], "_"))
        };
        let dir = graph
            .absolute_path(file)
            .parent()
            .map(PathBuf::from)
            .unwrap_or_default();

        url_pattern()
            .replace_all(text, |caps: &Captures<'_>| {
                let url = caps
                    .get(1)
                    .or_else(|| caps.get(2))
                    .or_else(|| caps.get(3))
                    .map_or("", |m| m.as_str());
                if !is_local(url) {
                    return caps[0].to_string();
                }

                let path = url.split(['?', '#']).next().unwrap_or(url);
                let basename = url.rsplit('/').next().unwrap_or(url);
                let name = format!("{prefix}{basename}");
                let copied = format!("{prefix}{}", path.rsplit('/').next().unwrap_or(path));

                if !self.found.iter().any(|r| r.name == copied) {
                    trace!(url = %url, name = %copied, "resource");
                    self.found.push(Resource {
                        source: dir.join(path),
                        name: copied,
                    });
                }
                format!("url({}{name})", self.up)
            })
            .into_owned()
    }
}

/// Relative references to files on disk; not remote, root-relative, data
/// or fragment urls.
fn is_local(url: &str) -> bool {
    if url.is_empty() || url.starts_with(['/', '#']) {
        return false;
    }
    let head = url.split('/').next().unwrap_or(url);
    !head.contains(':')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{File, Package};

    fn graph() -> PackageGraph {
        let root = Package::new("p", "1.0.0", "/p").with_file(File::new("src/a.css"));
        let mut graph = PackageGraph::new(root);
        let c = graph.add_package(
            Package::new("c", "1.2.0", "/p/sea-modules/c/1.2.0").with_file(File::new("index.css")),
        );
        graph.add_dependency(0, "c", c);
        graph
    }

    #[test]
    fn test_is_local() {
        assert!(is_local("img/a.png"));
        assert!(is_local("../a.png?v=1"));
        assert!(!is_local("http://example.com/a.png"));
        assert!(!is_local("//cdn.example.com/a.png"));
        assert!(!is_local("data:image/png;base64,AAAA"));
        assert!(!is_local("/abs.png"));
        assert!(!is_local("#filter"));
    }

    #[test]
    fn test_root_resource() {
        let graph = graph();
        let file = graph.file_ref(0, "src/a.css").unwrap();
        let mut resources = Resources::new("src/a.css");

        let out = resources.rewrite(
            &graph,
            file,
            ".a{background:url('img/a.png?v=1')}.b{background:url(http://x.com/b.png)}",
        );
        assert_eq!(
            out,
            ".a{background:url(../a.png?v=1)}.b{background:url(http://x.com/b.png)}"
        );
        assert_eq!(
            resources.found,
            vec![Resource {
                source: PathBuf::from("/p/src/img/a.png"),
                name: "a.png".to_string(),
            }]
        );
    }

    #[test]
    fn test_dependency_resource_is_prefixed() {
        let graph = graph();
        let file = graph.file_ref(1, "index.css").unwrap();
        let mut resources = Resources::new("a.css");

        let out = resources.rewrite(&graph, file, ".c{background:url(\"i.png\")}.d{background:url(i.png)}");
        assert_eq!(
            out,
            ".c{background:url(c_1_2_0_i.png)}.d{background:url(c_1_2_0_i.png)}"
        );
        assert_eq!(resources.found.len(), 1);
        assert_eq!(resources.found[0].name, "c_1_2_0_i.png");
        assert_eq!(
            resources.found[0].source,
            PathBuf::from("/p/sea-modules/c/1.2.0/i.png")
        );
    }
}
