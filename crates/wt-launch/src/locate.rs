//! Locating external executables before anything is launched.

use std::path::{Path, PathBuf};
use tracing::debug;

use wt_types::{ConfigError, Topology, Toolchain};

/// Searches a list of directories for executables, like a shell would.
#[derive(Debug, Clone, Default)]
pub struct ExecutableLocator {
    search_path: Vec<PathBuf>,
}

impl ExecutableLocator {
    /// Locator over the current `PATH`.
    pub fn from_env() -> Self {
        let search_path = std::env::var_os("PATH")
            .map(|paths| std::env::split_paths(&paths).collect())
            .unwrap_or_default();
        Self { search_path }
    }

    pub fn with_paths(search_path: Vec<PathBuf>) -> Self {
        Self { search_path }
    }

    /// Full path to `name`. Names containing a separator are checked as-is.
    pub fn find(&self, name: &str) -> Option<PathBuf> {
        if name.is_empty() {
            return None;
        }
        let candidate = Path::new(name);
        if candidate.components().count() > 1 {
            return is_executable(candidate).then(|| candidate.to_path_buf());
        }
        self.search_path
            .iter()
            .map(|dir| dir.join(name))
            .find(|path| is_executable(path))
    }

    /// Resolve every tool `topology` needs to a host path.
    ///
    /// Fails on the first missing tool. Tools the topology does not use are
    /// left untouched, as is the container-internal simulator path.
    pub fn resolve(&self, tools: &Toolchain, topology: &Topology) -> Result<Toolchain, ConfigError> {
        let mut resolved = tools.clone();
        let slots: Vec<&mut String> = match topology {
            Topology::Direct { .. } => vec![&mut resolved.launcher, &mut resolved.simulator],
            Topology::ScheduledContainerized { .. } => {
                vec![&mut resolved.scheduler, &mut resolved.runtime]
            }
        };
        for slot in slots {
            let path = self
                .find(slot)
                .ok_or_else(|| ConfigError::MissingExecutable { name: slot.clone() })?;
            debug!(tool = %slot, path = %path.display(), "located executable");
            *slot = path.to_string_lossy().into_owned();
        }
        Ok(resolved)
    }
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}
