mod error;
mod filename;
mod filesystem;
mod traits;

pub use error::StorageError;
pub use filename::{FilenameError, generate_stored_filename, validate_flat_filename};
pub use filesystem::FilesystemUploadStore;
pub use traits::{BoxReader, UploadStore};
