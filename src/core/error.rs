//! Defines the custom error type for the `core` module.

use std::path::PathBuf;
use thiserror::Error;

/// The primary error type for the `core` module.
///
/// This enum encapsulates everything that can go wrong while walking a
/// directory tree, reading file contents or editing the extension catalog.
/// None of these variants is fatal to the process; callers turn them into
/// an empty (or partial) result set plus a message.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The search root is missing, not a directory, or cannot be listed.
    #[error("Directory is missing or unreadable: {0}")]
    DirectoryUnreadable(PathBuf),

    /// A content reader failed to open, decode or parse a file.
    #[error("Failed to read content of {path}: {reason}")]
    ContentReadFailure { path: PathBuf, reason: String },

    /// An extension was toggled that is not registered under the category.
    #[error("Extension '{extension}' is not part of category '{category}'")]
    InvalidExtension { category: String, extension: String },

    /// A category name that the catalog does not know.
    #[error("Unknown category: {0}")]
    UnknownCategory(String),

    /// Represents an I/O error, typically from file system operations.
    #[error("I/O error for path {1}: {0}")]
    Io(#[source] std::io::Error, PathBuf),

    /// The literal search pattern could not be compiled.
    #[error("Invalid search pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// Represents a cancellation of an in-flight search.
    #[error("Search was cancelled")]
    Cancelled,
}

impl CoreError {
    pub(crate) fn content(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        CoreError::ContentReadFailure {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}
