use std::path::PathBuf;

/// Finds executables by name. Implementations must not spawn processes.
pub trait ExecutableLocator: Send + Sync {
    fn find(&self, name: &str) -> Option<PathBuf>;
}

/// Looks executables up on `PATH`.
#[derive(Debug, Default, Clone, Copy)]
pub struct PathLocator;

impl ExecutableLocator for PathLocator {
    fn find(&self, name: &str) -> Option<PathBuf> {
        which::which(name).ok()
    }
}
