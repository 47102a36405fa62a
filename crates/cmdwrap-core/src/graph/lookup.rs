//! Depth-first traversal of declared requires.

use super::{FileRef, PackageGraph};
use crate::error::Result;
use rustc_hash::FxHashSet as HashSet;

/// Where a declared require leads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// A registered file. `crossed` is set when the require was a bare
    /// package name, i.e. the edge enters another package's entry file.
    File { file: FileRef, crossed: bool },
    /// A bare name with no entry in the dependent package's dependency map.
    Unresolved(String),
}

/// One edge discovered during [`PackageGraph::lookup`].
#[derive(Debug, Clone)]
pub struct Edge<'a> {
    /// File whose require produced this edge.
    pub dependent: FileRef,
    /// The require string as written (or the seeded package name).
    pub require: &'a str,
    pub target: Target,
}

/// Visitor decision for an edge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Follow the target's requires, emit nothing.
    Descend,
    /// Emit a value and follow the target's requires.
    Emit(String),
    /// Emit a value and do not follow the target.
    EmitAndStop(String),
    /// Emit nothing and do not follow the target.
    Stop,
}

/// An extra edge of the root file that no require declares, such as an
/// implicit runtime package.
pub type Seed = (String, Target);

impl PackageGraph {
    /// Walk the requires of `root` depth-first in declaration order.
    ///
    /// `extra` seeds are visited after `root`'s own requires, as edges of
    /// `root` with an already resolved target. `visit` classifies every
    /// edge; emitted values are returned deduplicated in first-emission
    /// order.
    ///
    /// Each file is entered at most once per way of reaching it (relative or
    /// across a package boundary), so cyclic requires and cyclic package
    /// declarations terminate. `root` itself is never revisited.
    pub fn lookup<F>(&self, root: FileRef, extra: &[Seed], mut visit: F) -> Result<Vec<String>>
    where
        F: FnMut(&Edge<'_>) -> Result<Step>,
    {
        let mut walk = Walk {
            graph: self,
            visited: HashSet::default(),
            seen: HashSet::default(),
            out: Vec::new(),
        };
        walk.visited.insert((root, false));
        walk.visited.insert((root, true));

        walk.edges(root, &mut visit)?;
        for (name, target) in extra {
            walk.edge(root, name, target.clone(), &mut visit)?;
        }
        Ok(walk.out)
    }
}

struct Walk<'g> {
    graph: &'g PackageGraph,
    visited: HashSet<(FileRef, bool)>,
    seen: HashSet<String>,
    out: Vec<String>,
}

impl<'g> Walk<'g> {
    fn edges<F>(&mut self, from: FileRef, visit: &mut F) -> Result<()>
    where
        F: FnMut(&Edge<'_>) -> Result<Step>,
    {
        let graph = self.graph;
        for require in &graph.file(from).requires {
            let target = graph.resolve_require(from, require)?;
            self.edge(from, require, target, visit)?;
        }
        Ok(())
    }

    fn edge<F>(&mut self, from: FileRef, require: &str, target: Target, visit: &mut F) -> Result<()>
    where
        F: FnMut(&Edge<'_>) -> Result<Step>,
    {
        if let Target::File { file, crossed } = target {
            if !self.visited.insert((file, crossed)) {
                return Ok(());
            }
        }

        let edge = Edge {
            dependent: from,
            require,
            target,
        };
        let descend = match visit(&edge)? {
            Step::Descend => true,
            Step::Emit(value) => {
                self.emit(value);
                true
            }
            Step::EmitAndStop(value) => {
                self.emit(value);
                false
            }
            Step::Stop => false,
        };

        if descend {
            if let Target::File { file, .. } = edge.target {
                self.edges(file, visit)?;
            }
        }
        Ok(())
    }

    fn emit(&mut self, value: String) {
        if self.seen.insert(value.clone()) {
            self.out.push(value);
        }
    }
}
