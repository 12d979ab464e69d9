//! Error types for coursekit.
//!
//! This module defines all error types used throughout the coursekit crate,
//! providing detailed context for debugging and user-friendly error messages.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for coursekit operations.
#[derive(Error, Debug)]
pub enum Error {
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

    // === Input Errors ===
    /// A required input file or directory does not exist.
    #[error("'{}' not found", path.display())]
    NotFound {
        /// The missing path.
        path: PathBuf,
    },

    /// A CSV file lacks a column the analysis needs.
    #[error("missing column '{column}' in {}", path.display())]
    MissingColumn {
        /// Name of the missing column.
        column: String,
        /// The offending file.
        path: PathBuf,
    },

    // === Cipher Errors ===
    /// Class metadata does not line up with the ciphertext.
    #[error("metadata has {found} entries but the text has {expected} characters")]
    MetadataLength {
        /// Number of characters in the ciphertext.
        expected: usize,
        /// Number of metadata entries.
        found: usize,
    },

    /// Decrypted text differs from the original.
    #[error("decrypted text does not match '{}' ({differing} differing line(s))", original.display())]
    VerificationFailed {
        /// Path of the original plaintext.
        original: PathBuf,
        /// Number of lines that differ.
        differing: usize,
    },

    // === Pattern Errors ===
    /// Pattern parameters are out of range.
    #[error("invalid pattern: {0}")]
    InvalidPattern(String),

    /// Writing the rendered pattern failed.
    #[error("render error: {0}")]
    Render(String),

    // === I/O Errors ===
    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // === Serialization Errors ===
    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV reading failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// A specialized Result type for coursekit operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a not-found error for the given path.
    #[must_use]
    pub fn not_found(path: impl Into<PathBuf>) -> Self {
        Self::NotFound { path: path.into() }
    }

    /// Create a new invalid pattern error.
    #[must_use]
    pub fn invalid_pattern(message: impl Into<String>) -> Self {
        Self::InvalidPattern(message.into())
    }

    /// Create a new render error.
    #[must_use]
    pub fn render(message: impl Into<String>) -> Self {
        Self::Render(message.into())
    }

    /// Create a config validation error.
    #[must_use]
    pub fn config_validation(message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            message: message.into(),
        }
    }

    /// Check if this error is a missing input.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this error is a failed round-trip verification.
    #[must_use]
    pub fn is_verification_failure(&self) -> bool {
        matches!(self, Self::VerificationFailed { .. })
    }
}
