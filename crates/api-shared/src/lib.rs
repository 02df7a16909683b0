//! # API Shared
//!
//! Shared utilities and definitions for depot APIs.
//!
//! Contains:
//! - HTTP Basic credential verification (`auth` module)
//! - Shared services like `HealthService`
//!
//! Used by the server binary; free of axum so any API front end can reuse it.

pub mod auth;
pub mod health;

pub use auth::BasicCredentials;
pub use health::{HealthRes, HealthService};
