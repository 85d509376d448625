use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for search operations
pub type SearchResult<T> = Result<T, SearchError>;

/// Errors that can occur during search operations.
///
/// Only two of these are ever fatal: `DirectoryNotFound` and `InvalidPattern`
/// abort a search before traversal begins. Permission denials are recovered
/// silently at the entry that raised them, and other per-file failures are
/// reported through the event bus without halting the search.
#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Directory not found or not accessible: {0}")]
    DirectoryNotFound(PathBuf),
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),
    #[error("Invalid pattern: {0}")]
    InvalidPattern(String),
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Failed to read {path}: {source}")]
    FileRead { path: PathBuf, source: io::Error },
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
}

impl SearchError {
    pub fn directory_not_found(path: impl Into<PathBuf>) -> Self {
        Self::DirectoryNotFound(path.into())
    }

    pub fn permission_denied(path: impl Into<PathBuf>) -> Self {
        Self::PermissionDenied(path.into())
    }

    pub fn invalid_pattern(pattern: impl Into<String>) -> Self {
        Self::InvalidPattern(pattern.into())
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    pub fn file_read(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::FileRead {
            path: path.into(),
            source,
        }
    }

    /// True for errors the engine recovers from silently (the entry or
    /// subtree is skipped without an error event).
    pub fn is_permission_denied(&self) -> bool {
        match self {
            Self::PermissionDenied(_) => true,
            Self::FileRead { source, .. } => is_permission_error(source),
            Self::IoError(source) => is_permission_error(source),
            _ => false,
        }
    }
}

/// Whether an I/O error is a per-entry permission denial.
pub(crate) fn is_permission_error(err: &io::Error) -> bool {
    err.kind() == io::ErrorKind::PermissionDenied
}
