//! Client path validation.
//!
//! Every client-supplied path-like value passes through [`sanitize`] before it
//! is joined against the store root: download target, delete target, rename
//! source and new name, move source and destination, folder-creation target,
//! upload subpath. It is the single choke point preventing escape from the
//! store root.

use crate::{DepotError, DepotResult};

/// Validate a client-supplied relative path.
///
/// Rejects empty (or whitespace-only) input and any path containing the
/// literal `..` sequence. The substring check is intentionally conservative:
/// it also rejects legitimate filenames containing `..`, an accepted
/// trade-off for simplicity.
///
/// On success the path is returned unchanged; callers are responsible for
/// joining it against the store root.
pub fn sanitize(rel_path: &str) -> DepotResult<&str> {
    if rel_path.trim().is_empty() {
        return Err(DepotError::EmptyPath);
    }
    if rel_path.contains("..") {
        return Err(DepotError::Traversal);
    }
    Ok(rel_path)
}
