//! Error handling for termux-bootstrap
//!
//! Resolution and host failures have their own typed errors
//! ([`crate::bootstrap::BootstrapError`], [`crate::host::HostError`]). This
//! module covers loading crate configuration from disk.

use thiserror::Error;

/// Error loading termux-bootstrap configuration
#[derive(Error, Debug)]
pub enum TermuxBootstrapError {
    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for termux-bootstrap operations
pub type Result<T> = std::result::Result<T, TermuxBootstrapError>;
