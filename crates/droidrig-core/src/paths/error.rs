//! Path-related error types.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while locating the resource directory.
#[derive(Debug, Error)]
pub enum PathError {
    /// Failed to get the current working directory.
    #[error("Cannot determine current directory: {0}")]
    CurrentDirError(String),

    /// A configured resource directory does not exist.
    #[error("Resource directory {0} does not exist")]
    DirectoryNotFound(PathBuf),

    /// A path was expected to be a directory but was not.
    #[error("{0} exists but is not a directory")]
    NotADirectory(PathBuf),
}
