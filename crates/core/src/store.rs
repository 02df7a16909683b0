//! Category-based storage layout.
//!
//! A fixed set of top-level category directories lives under one store root.
//! Files may also live directly at the root. Category membership is advisory
//! metadata for listing and grouping, not an enforced constraint; nothing
//! prevents a file physically outside the known categories.

use crate::paths::sanitize;
use crate::{DepotConfig, DepotError, DepotResult};
use std::fs;
use std::path::{Path, PathBuf};

/// The fixed category directories created under the store root.
pub const CATEGORIES: [&str; 5] = ["videos", "audios", "pictures", "documents", "others"];

/// Sentinel label for the store root, used in listings and accepted as a
/// move destination. Kept verbatim from the original deployment's web client.
pub const ROOT_LABEL: &str = "根目录";

/// Filesystem layout under a single store root.
#[derive(Clone, Debug)]
pub struct CategoryStore {
    root: PathBuf,
}

impl CategoryStore {
    pub fn new(config: &DepotConfig) -> Self {
        Self {
            root: config.files_dir().to_path_buf(),
        }
    }

    /// The store root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The fixed category names.
    pub fn categories(&self) -> &'static [&'static str] {
        &CATEGORIES
    }

    /// Join a pre-sanitized relative path onto the store root.
    ///
    /// Callers must have passed `rel` through [`sanitize`] first. Leading
    /// slashes are stripped so an absolute-looking input cannot replace the
    /// root during the join.
    pub fn join(&self, rel: &str) -> PathBuf {
        self.root.join(rel.trim_start_matches('/'))
    }

    /// Create the store root and every category directory if absent.
    ///
    /// Idempotent; called once at process start. Category directories are
    /// never deleted by normal operations afterwards.
    pub fn ensure_layout(&self) -> DepotResult<()> {
        if !self.root.exists() {
            fs::create_dir_all(&self.root).map_err(DepotError::DirCreation)?;
            tracing::info!(path = %self.root.display(), "created store root");
        }

        for category in CATEGORIES {
            let dir = self.root.join(category);
            if !dir.exists() {
                fs::create_dir(&dir).map_err(DepotError::DirCreation)?;
                tracing::info!(path = %dir.display(), "created category directory");
            }
        }

        Ok(())
    }

    /// Resolve the directory an upload should land in, creating intermediate
    /// directories on demand.
    ///
    /// Unlike the category roots (created eagerly at startup), upload
    /// destinations are created lazily. When `relative_subpath` is given,
    /// only its directory component contributes; a trailing filename segment
    /// is stripped.
    pub fn resolve_upload_destination(
        &self,
        category: Option<&str>,
        relative_subpath: Option<&str>,
    ) -> DepotResult<PathBuf> {
        let mut dir = match category {
            Some(c) if !c.trim().is_empty() => self.join(sanitize(c)?),
            _ => self.root.clone(),
        };

        if let Some(rel) = relative_subpath {
            if !rel.trim().is_empty() {
                let rel = sanitize(rel)?.trim_start_matches('/');
                if let Some(parent) = Path::new(rel).parent() {
                    if !parent.as_os_str().is_empty() {
                        dir = dir.join(parent);
                    }
                }
            }
        }

        fs::create_dir_all(&dir).map_err(DepotError::DirCreation)?;
        Ok(dir)
    }
}
