//! Error types for headerguard.
//!
//! Every failure that can stop a run is represented here. Variants carry the
//! path involved so the message printed by `hguard` points at the offending
//! file or directory.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// The main error type for headerguard operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Traversal Errors ===
    /// Directory traversal failed (missing root, unreadable directory, ...).
    #[error("failed to walk {path}: {source}")]
    Walk {
        /// Path being visited when the walk failed.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: walkdir::Error,
    },

    // === File Errors ===
    /// Failed to read a header (permission denied, not UTF-8, ...).
    #[error("failed to read {path}: {source}")]
    ReadFile {
        /// Path to the header.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to write a rewritten header back.
    #[error("failed to write {path}: {source}")]
    WriteFile {
        /// Path to the header.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Guard Errors ===
    /// The project tag cannot be used as a macro prefix.
    #[error("invalid project tag '{tag}': {reason}")]
    InvalidTag {
        /// The rejected tag.
        tag: String,
        /// Why it was rejected.
        reason: &'static str,
    },

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === Serialization Errors ===
    /// Rendering a report or the configuration as JSON failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for headerguard operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a walk error, taking the failing path from the walkdir error
    /// when it has one.
    #[must_use]
    pub fn walk(root: &Path, source: walkdir::Error) -> Self {
        let path = source.path().map_or_else(|| root.to_path_buf(), Path::to_path_buf);
        Self::Walk { path, source }
    }

    /// Create an invalid tag error.
    #[must_use]
    pub fn invalid_tag(tag: impl Into<String>, reason: &'static str) -> Self {
        Self::InvalidTag {
            tag: tag.into(),
            reason,
        }
    }

    /// The file or directory this error is about, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Walk { path, .. } | Self::ReadFile { path, .. } | Self::WriteFile { path, .. } => {
                Some(path)
            }
            _ => None,
        }
    }

    /// Check if this error came from the file system.
    #[must_use]
    pub fn is_io_error(&self) -> bool {
        matches!(
            self,
            Self::Walk { .. } | Self::ReadFile { .. } | Self::WriteFile { .. }
        )
    }
}
