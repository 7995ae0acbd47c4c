//! Declaration loading error types.

use std::path::PathBuf;

/// Errors that can occur while loading a declaration tree.
#[derive(Debug, thiserror::Error)]
pub enum DeclError {
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// JSON parsing error.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The file extension maps to no known declaration format.
    #[error("unsupported declaration file extension: {path}")]
    UnsupportedExtension { path: PathBuf },

    /// No declarations were supplied at all.
    #[error("no declarations provided")]
    Empty,
}

/// Result type alias for declaration loading.
pub type Result<T> = std::result::Result<T, DeclError>;
