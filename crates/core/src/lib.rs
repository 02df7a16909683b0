//! # Depot Core
//!
//! Core business logic for the depot file repository server.
//!
//! This crate contains pure filesystem operations over a single store root:
//! - Path validation (the single choke point against directory traversal)
//! - Upload filename recovery (base64 side channel, GBK legacy fallback)
//! - Category-based storage layout under the store root
//! - List, upload, download resolution, rename, move, delete, create-folder
//! - Extension-driven delivery classification (inline preview vs attachment)
//!
//! **No API concerns**: Authentication, HTTP servers, or URL construction
//! belong in the server binary and `api-shared`.
//!
//! The filesystem tree *is* the entire state. There is no index, no cache and
//! no sidecar metadata; every operation re-reads the filesystem.

pub mod config;
pub mod error;
pub mod filename;
pub mod media;
pub mod ops;
pub mod paths;
pub mod store;

pub use config::DepotConfig;
pub use error::{DepotError, DepotResult};
pub use filename::resolve_upload_filename;
pub use media::{classify, Disposition};
pub use ops::{DeletedKind, DepotService, Download, FileEntry, PreparedUpload, StoredUpload};
pub use store::{CategoryStore, CATEGORIES, ROOT_LABEL};
