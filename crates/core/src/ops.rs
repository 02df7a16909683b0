//! File operations over the category store.
//!
//! Every operation is an independent, direct filesystem call. No locking, no
//! transactions, no in-memory index: concurrent operations on the same path
//! are resolved by the filesystem's own rename/unlink atomicity, which is
//! accepted for the low-concurrency target usage. Multi-step operations
//! (rename, move) perform explicit existence checks before mutating but have
//! no rollback on partial failure.

use crate::media::{classify, Disposition};
use crate::paths::sanitize;
use crate::store::{CategoryStore, ROOT_LABEL};
use crate::{DepotError, DepotResult};
use chrono::{DateTime, Utc};
use std::fs;
use std::path::{Path, PathBuf};

/// One entry of a non-recursive directory listing.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct FileEntry {
    pub name: String,
    /// The listed category, or the root label for entries at the store root.
    pub category: String,
    pub is_directory: bool,
    /// `"X.XX MB"` for files, empty for directories.
    pub size: String,
    pub last_modified: DateTime<Utc>,
    /// Path relative to the store root, for download URL derivation.
    pub relative_path: String,
}

/// Result of a stored upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredUpload {
    pub name: String,
    pub relative_path: String,
}

/// A resolved upload destination, ready to receive bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedUpload {
    pub path: PathBuf,
    pub name: String,
    pub relative_path: String,
}

/// A resolved download target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    pub path: PathBuf,
    pub file_name: String,
    pub disposition: Disposition,
}

/// What a delete removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeletedKind {
    File,
    Directory,
}

/// Format a byte count the way listings report file sizes.
pub fn format_size(bytes: u64) -> String {
    format!("{:.2} MB", bytes as f64 / (1024.0 * 1024.0))
}

/// Reduce a client-supplied upload filename to one safe path component.
///
/// The filename decoder never fails, so its output is still untrusted here.
/// Directory components are dropped, and a final component that does not
/// pass the sanitizer (empty, or containing `..`) falls back to `unnamed`.
fn safe_filename(filename: &str) -> String {
    Path::new(filename)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .filter(|n| sanitize(n).is_ok())
        .unwrap_or_else(|| "unnamed".to_string())
}

/// Pure file operations - no API concerns.
#[derive(Clone, Debug)]
pub struct DepotService {
    store: CategoryStore,
}

impl DepotService {
    pub fn new(store: CategoryStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &CategoryStore {
        &self.store
    }

    /// List one directory level of the store root or a category.
    ///
    /// Entries whose metadata cannot be read are logged as warnings and
    /// skipped rather than failing the whole listing.
    pub fn list(&self, category: Option<&str>) -> DepotResult<Vec<FileEntry>> {
        let label = category.filter(|c| !c.trim().is_empty());
        let target = match label {
            Some(c) => self.store.join(sanitize(c)?),
            None => self.store.root().to_path_buf(),
        };

        let read = fs::read_dir(&target).map_err(DepotError::DirRead)?;

        let mut entries = Vec::new();
        for entry in read {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    tracing::warn!(dir = %target.display(), %err, "skipping unreadable entry");
                    continue;
                }
            };
            let name = entry.file_name().to_string_lossy().into_owned();
            let metadata = match entry.metadata() {
                Ok(metadata) => metadata,
                Err(err) => {
                    tracing::warn!(%err, %name, "skipping entry without metadata");
                    continue;
                }
            };

            let is_directory = metadata.is_dir();
            let last_modified: DateTime<Utc> = metadata
                .modified()
                .unwrap_or(std::time::SystemTime::UNIX_EPOCH)
                .into();
            let relative_path = match label {
                Some(c) => format!("{c}/{name}"),
                None => name.clone(),
            };

            entries.push(FileEntry {
                category: label.unwrap_or(ROOT_LABEL).to_string(),
                is_directory,
                size: if is_directory {
                    String::new()
                } else {
                    format_size(metadata.len())
                },
                last_modified,
                relative_path,
                name,
            });
        }

        Ok(entries)
    }

    /// Resolve where an upload lands, without writing anything.
    ///
    /// The filename is reduced to its final path component and validated
    /// with the sanitizer before the join, so directory components or
    /// traversal sequences in a client-supplied name can never relocate the
    /// file. A name with no safe component falls back to `unnamed`; uploads
    /// always go somewhere under the store root.
    pub fn prepare_upload(
        &self,
        category: Option<&str>,
        relative_subpath: Option<&str>,
        filename: &str,
    ) -> DepotResult<PreparedUpload> {
        let dir = self
            .store
            .resolve_upload_destination(category, relative_subpath)?;
        let name = safe_filename(filename);
        let path = dir.join(&name);

        let relative_path = path
            .strip_prefix(self.store.root())
            .map(|p| p.to_string_lossy().into_owned())
            .unwrap_or_else(|_| name.clone());

        Ok(PreparedUpload {
            path,
            name,
            relative_path,
        })
    }

    /// Write uploaded bytes under the resolved destination.
    ///
    /// An upload whose resolved name matches an existing file silently
    /// overwrites it; collisions are the caller's responsibility.
    pub fn save_upload(
        &self,
        category: Option<&str>,
        relative_subpath: Option<&str>,
        filename: &str,
        bytes: &[u8],
    ) -> DepotResult<StoredUpload> {
        let prepared = self.prepare_upload(category, relative_subpath, filename)?;
        fs::write(&prepared.path, bytes).map_err(DepotError::FileWrite)?;

        tracing::info!(path = %prepared.path.display(), size = bytes.len(), "stored upload");

        Ok(StoredUpload {
            name: prepared.name,
            relative_path: prepared.relative_path,
        })
    }

    /// Resolve a download target: validated absolute path, display filename
    /// and delivery classification.
    pub fn resolve_download(&self, rel_path: &str) -> DepotResult<Download> {
        let rel = sanitize(rel_path)?;
        let path = self.store.join(rel);
        if !path.is_file() {
            return Err(DepotError::NotFound(path));
        }

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| rel.to_string());
        let extension = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        Ok(Download {
            disposition: classify(&extension),
            path,
            file_name,
        })
    }

    /// Delete a file, or a directory recursively. Immediate and irreversible.
    pub fn delete(&self, rel_path: &str) -> DepotResult<DeletedKind> {
        let rel = sanitize(rel_path)?;
        let path = self.store.join(rel);
        if !path.exists() {
            return Err(DepotError::NotFound(path));
        }

        if path.is_dir() {
            fs::remove_dir_all(&path).map_err(DepotError::Delete)?;
            tracing::info!(path = %path.display(), "deleted directory");
            Ok(DeletedKind::Directory)
        } else {
            fs::remove_file(&path).map_err(DepotError::Delete)?;
            tracing::info!(path = %path.display(), "deleted file");
            Ok(DeletedKind::File)
        }
    }

    /// Replace the final segment of `old_path` with `new_name`, keeping the
    /// same parent directory. Returns the new relative path.
    ///
    /// `new_name` is validated with the same sanitizer as the source path and
    /// additionally must not contain path separators, so a rename can never
    /// relocate the entry.
    pub fn rename(&self, old_path: &str, new_name: &str) -> DepotResult<String> {
        let old_rel = sanitize(old_path)?;
        let new_name = sanitize(new_name)?;
        if new_name.contains('/') || new_name.contains('\\') {
            return Err(DepotError::InvalidInput(
                "newName must not contain path separators".into(),
            ));
        }

        let old_abs = self.store.join(old_rel);
        if !old_abs.exists() {
            return Err(DepotError::NotFound(old_abs));
        }

        let parent = Path::new(old_rel.trim_start_matches('/'))
            .parent()
            .unwrap_or_else(|| Path::new(""));
        let new_rel = parent.join(new_name).to_string_lossy().into_owned();
        let new_abs = self.store.join(&new_rel);

        fs::rename(&old_abs, &new_abs).map_err(DepotError::Rename)?;
        tracing::info!(from = %old_abs.display(), to = %new_abs.display(), "renamed");

        Ok(new_rel)
    }

    /// Move an entry into an existing directory. Returns the new relative
    /// path.
    ///
    /// An empty string, `/`, or the root label as `target_dir` denotes the
    /// store root. Unlike upload, move never creates the destination; a
    /// missing target directory is an explicit error and leaves the source
    /// untouched.
    pub fn move_entry(&self, old_path: &str, target_dir: &str) -> DepotResult<String> {
        let old_rel = sanitize(old_path)?;
        let trimmed = target_dir.trim();
        let target_rel = if trimmed.is_empty() || trimmed == "/" || trimmed == ROOT_LABEL {
            None
        } else {
            Some(sanitize(trimmed)?)
        };

        let old_abs = self.store.join(old_rel);
        if !old_abs.exists() {
            return Err(DepotError::NotFound(old_abs));
        }

        let file_name = old_abs
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| {
                DepotError::InvalidInput("oldPath has no filename component".into())
            })?;

        let target_abs = match target_rel {
            Some(t) => self.store.join(t),
            None => self.store.root().to_path_buf(),
        };
        if !target_abs.is_dir() {
            return Err(DepotError::TargetDirMissing(target_abs));
        }

        let new_abs = target_abs.join(&file_name);
        fs::rename(&old_abs, &new_abs).map_err(DepotError::Rename)?;
        tracing::info!(from = %old_abs.display(), to = %new_abs.display(), "moved");

        Ok(match target_rel {
            Some(t) => format!("{}/{}", t.trim_matches('/'), file_name),
            None => file_name,
        })
    }

    /// Create a directory tree under the resolved category directory.
    /// Idempotent if the folder already exists.
    pub fn create_folder(&self, category: Option<&str>, folder_path: &str) -> DepotResult<PathBuf> {
        let folder = sanitize(folder_path)?;
        let base = match category.filter(|c| !c.trim().is_empty()) {
            Some(c) => self.store.join(sanitize(c)?),
            None => self.store.root().to_path_buf(),
        };
        let target = base.join(folder.trim_start_matches('/'));
        fs::create_dir_all(&target).map_err(DepotError::DirCreation)?;
        Ok(target)
    }
}
