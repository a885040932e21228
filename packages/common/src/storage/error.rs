use thiserror::Error;

use super::filename::FilenameError;

/// Errors that can occur during upload storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The requested file was not found.
    #[error("upload not found: {0}")]
    NotFound(String),
    /// A file with this name is already stored.
    #[error("upload already exists: {0}")]
    AlreadyExists(String),
    /// The filename is not a safe flat filename.
    #[error("invalid upload filename: {}", .0.message())]
    InvalidFilename(FilenameError),
    /// The upload exceeds the configured size limit.
    #[error("upload exceeds size limit ({actual} > {limit} bytes)")]
    SizeLimitExceeded { actual: u64, limit: u64 },
    /// An I/O error occurred.
    #[error("storage IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<FilenameError> for StorageError {
    fn from(err: FilenameError) -> Self {
        Self::InvalidFilename(err)
    }
}
