use crate::error::{Result, TransportError};
use crate::graph::Package;
use rustc_hash::FxHashMap as HashMap;

/// Package versions reached by one stylesheet inlining call.
///
/// Holds at most one version per package name; a second, different version
/// is a conflict.
#[derive(Debug, Default)]
pub struct ConflictTracker {
    versions: HashMap<String, String>,
}

impl ConflictTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `package`, failing if another version of it was recorded.
    pub fn record(&mut self, package: &Package) -> Result<()> {
        match self.versions.get(&package.name) {
            Some(existing) if *existing != package.version => Err(TransportError::VersionConflict {
                id: package.id.clone(),
                existing: format!("{}@{existing}", package.name),
            }),
            Some(_) => Ok(()),
            None => {
                self.versions
                    .insert(package.name.clone(), package.version.clone());
                Ok(())
            }
        }
    }

    #[cfg(test)]
    fn version(&self, name: &str) -> Option<&str> {
        self.versions.get(name).map(String::as_str)
    }
}
