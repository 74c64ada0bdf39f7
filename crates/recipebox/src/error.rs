//! Error types for recipebox.
//!
//! Every fallible operation in the crate has a strict form that returns these
//! errors. The repository and asset store also expose soft forms that log the
//! error and fall back to an absent result, so callers that cannot surface a
//! failure keep working.

use std::path::PathBuf;

use thiserror::Error;
use uuid::Uuid;

/// The main error type for recipebox operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Storage Errors ===
    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to read a file.
    #[error("failed to read {path}: {source}")]
    FileRead {
        /// Path of the file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to write a file.
    #[error("failed to write {path}: {source}")]
    FileWrite {
        /// Path of the file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to remove a file.
    #[error("failed to remove {path}: {source}")]
    FileRemove {
        /// Path of the file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// A stored document could not be decoded.
    #[error("malformed document {path}: {source}")]
    Decode {
        /// Path of the document.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: serde_json::Error,
    },

    /// JSON serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // === Image Errors ===
    /// Image bytes could not be decoded or re-encoded.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    // === Integrity Errors ===
    /// A recipe with this id is already in the index.
    #[error("recipe {id} already exists")]
    DuplicateRecipe {
        /// The conflicting id.
        id: Uuid,
    },

    /// A detail document was paired with a summary of a different recipe.
    #[error("detail {detail} does not belong to recipe {summary}")]
    DetailMismatch {
        /// Id of the summary.
        summary: Uuid,
        /// Id carried by the detail.
        detail: Uuid,
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
}

/// A specialized Result type for recipebox operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Check if this error means the file simply wasn't there.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::FileRead { source, .. } | Self::FileRemove { source, .. } => {
                source.kind() == std::io::ErrorKind::NotFound
            }
            _ => false,
        }
    }

    /// Check if this error is a malformed stored document.
    #[must_use]
    pub fn is_decode(&self) -> bool {
        matches!(self, Self::Decode { .. })
    }
}
