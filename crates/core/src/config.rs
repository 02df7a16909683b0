//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into the
//! core services. The intent is to avoid reading process-wide environment
//! variables during request handling, which can lead to inconsistent
//! behaviour in multi-threaded runtimes and test harnesses.

use crate::{DepotError, DepotResult};
use std::path::{Path, PathBuf};

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct DepotConfig {
    files_dir: PathBuf,
}

impl DepotConfig {
    /// Create a new `DepotConfig` rooted at `files_dir`.
    pub fn new(files_dir: PathBuf) -> DepotResult<Self> {
        if files_dir.as_os_str().is_empty() {
            return Err(DepotError::InvalidInput(
                "files_dir cannot be empty".into(),
            ));
        }

        Ok(Self { files_dir })
    }

    /// The store root under which all categories and files live.
    pub fn files_dir(&self) -> &Path {
        &self.files_dir
    }
}
