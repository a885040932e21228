use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;
use tokio::io::{AsyncReadExt, AsyncWriteExt, BufReader};

use super::error::StorageError;
use super::filename::validate_flat_filename;
use super::traits::{BoxReader, UploadStore};

/// Filesystem-backed upload store.
///
/// Files live directly under `{base_path}/{filename}`. Writes go through
/// `{base_path}/.tmp` and are renamed into place once complete.
pub struct FilesystemUploadStore {
    base_path: PathBuf,
    max_size: u64,
}

impl FilesystemUploadStore {
    /// Create a new filesystem upload store.
    pub async fn new(base_path: PathBuf, max_size: u64) -> Result<Self, StorageError> {
        fs::create_dir_all(&base_path).await?;
        fs::create_dir_all(base_path.join(".tmp")).await?;
        Ok(Self {
            base_path,
            max_size,
        })
    }

    /// Resolve the on-disk path for a stored filename.
    fn file_path(&self, filename: &str) -> Result<PathBuf, StorageError> {
        let filename = validate_flat_filename(filename)?;
        Ok(self.base_path.join(filename))
    }

    /// Path for a temporary file during writes.
    fn temp_path(&self) -> PathBuf {
        self.base_path
            .join(".tmp")
            .join(uuid::Uuid::new_v4().to_string())
    }
}

#[async_trait]
impl UploadStore for FilesystemUploadStore {
    async fn put_stream(
        &self,
        filename: &str,
        mut reader: BoxReader,
    ) -> Result<u64, StorageError> {
        let target = self.file_path(filename)?;
        if fs::try_exists(&target).await? {
            return Err(StorageError::AlreadyExists(filename.to_string()));
        }

        let temp_path = self.temp_path();
        let mut total_bytes: u64 = 0;

        let mut buf = vec![0u8; 64 * 1024]; // 64KB read buffer
        let mut temp_file = fs::File::create(&temp_path).await?;

        let written = async {
            loop {
                let n = reader.read(&mut buf).await?;
                if n == 0 {
                    break;
                }

                total_bytes += n as u64;
                if total_bytes > self.max_size {
                    return Err(StorageError::SizeLimitExceeded {
                        actual: total_bytes,
                        limit: self.max_size,
                    });
                }

                temp_file.write_all(&buf[..n]).await?;
            }
            temp_file.flush().await?;
            Ok::<(), StorageError>(())
        }
        .await;

        drop(temp_file);
        if let Err(e) = written {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e);
        }

        if fs::try_exists(&target).await? {
            let _ = fs::remove_file(&temp_path).await;
            return Err(StorageError::AlreadyExists(filename.to_string()));
        }

        if let Err(e) = fs::rename(&temp_path, &target).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        tracing::debug!(filename, bytes = total_bytes, "Stored upload");
        Ok(total_bytes)
    }

    async fn get_stream(&self, filename: &str) -> Result<BoxReader, StorageError> {
        let path = self.file_path(filename)?;
        match fs::File::open(&path).await {
            Ok(file) => Ok(Box::new(BufReader::new(file))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(filename.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn delete(&self, filename: &str) -> Result<bool, StorageError> {
        let path = self.file_path(filename)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn size(&self, filename: &str) -> Result<u64, StorageError> {
        let path = self.file_path(filename)?;
        match fs::metadata(&path).await {
            Ok(meta) => Ok(meta.len()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(filename.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }
}
