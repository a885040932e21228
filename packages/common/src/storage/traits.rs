use async_trait::async_trait;
use tokio::io::AsyncRead;

use super::error::StorageError;

/// Type alias for a boxed async reader.
pub type BoxReader = Box<dyn AsyncRead + Unpin + Send>;

/// Storage for uploaded files, keyed by their stored (flat) filename.
#[async_trait]
pub trait UploadStore: Send + Sync {
    /// Store data from an async reader under `filename` and return the
    /// number of bytes written.
    ///
    /// Fails with [`StorageError::AlreadyExists`] rather than overwriting.
    async fn put_stream(&self, filename: &str, reader: BoxReader) -> Result<u64, StorageError>;

    /// Retrieve a stored file as a streaming async reader.
    async fn get_stream(&self, filename: &str) -> Result<BoxReader, StorageError>;

    /// Delete a stored file.
    ///
    /// Returns `true` if the file was deleted, `false` if it did not exist.
    async fn delete(&self, filename: &str) -> Result<bool, StorageError>;

    /// Get the size of a stored file in bytes.
    async fn size(&self, filename: &str) -> Result<u64, StorageError>;
}
