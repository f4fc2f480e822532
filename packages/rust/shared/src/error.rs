//! Error types for wikiloot.
//!
//! Library crates use [`WikilootError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.
//!
//! Per-row extraction failures are not errors in this sense: they are
//! recorded as strings in the batch ledger and never returned as `Err`.

use std::path::PathBuf;

/// Top-level error type for all wikiloot operations.
#[derive(Debug, thiserror::Error)]
pub enum WikilootError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Network/HTTP error outside the per-row boundary (e.g. client setup).
    #[error("network error: {0}")]
    Network(String),

    /// Input document could not be parsed.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// Table could not be read or written.
    #[error("table error at {path:?}: {message}")]
    Table { path: PathBuf, message: String },

    /// Output destination is locked by another process.
    #[error("destination locked: {path:?} is open in another program")]
    Locked { path: PathBuf },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Data validation error (bad column value, missing field, etc.).
    #[error("validation error: {message}")]
    Validation { message: String },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, WikilootError>;

impl WikilootError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a parse error from any displayable message.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Create a table error for the given file.
    pub fn table(path: impl Into<PathBuf>, msg: impl Into<String>) -> Self {
        Self::Table {
            path: path.into(),
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    ///
    /// `PermissionDenied` becomes [`WikilootError::Locked`], which is the
    /// only error the final table writes know how to retry.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::PermissionDenied {
            return Self::Locked { path };
        }
        Self::Io { path, source }
    }

    /// Whether this error means the destination is held open elsewhere.
    pub fn is_locked(&self) -> bool {
        matches!(self, Self::Locked { .. })
    }
}
