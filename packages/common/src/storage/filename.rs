use std::path::Path;

use uuid::Uuid;

/// Longest extension carried over from the client's filename.
const MAX_EXTENSION_LEN: usize = 10;

/// Result of validating a flat filename.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilenameError {
    /// Filename is empty or whitespace-only.
    Empty,
    /// Filename contains path separators (`/` or `\`).
    ContainsPathSeparator,
    /// Filename is `..`.
    PathTraversal,
    /// Filename contains null bytes.
    NullByte,
    /// Filename starts with a dot (hidden file).
    Hidden,
    /// Filename contains control characters (CR, LF, etc.).
    ControlCharacter,
}

impl FilenameError {
    /// Returns a human-readable error message.
    pub fn message(&self) -> &'static str {
        match self {
            Self::Empty => "Filename cannot be empty",
            Self::ContainsPathSeparator => "Invalid filename: path separators are not allowed",
            Self::PathTraversal => "Invalid filename: '..' is not allowed",
            Self::NullByte => "Invalid filename: null bytes are not allowed",
            Self::Hidden => "Invalid filename: hidden files (starting with '.') are not allowed",
            Self::ControlCharacter => "Invalid filename: control characters are not allowed",
        }
    }
}

/// Validates a flat filename (no directory components allowed).
///
/// The name is checked as-is, never trimmed.
pub fn validate_flat_filename(filename: &str) -> Result<&str, FilenameError> {
    if filename.trim().is_empty() {
        return Err(FilenameError::Empty);
    }

    if filename.contains('\0') {
        return Err(FilenameError::NullByte);
    }

    if filename.chars().any(|c| c.is_ascii_control()) {
        return Err(FilenameError::ControlCharacter);
    }

    if filename.contains('/') || filename.contains('\\') {
        return Err(FilenameError::ContainsPathSeparator);
    }

    if filename == ".." {
        return Err(FilenameError::PathTraversal);
    }

    if filename.starts_with('.') {
        return Err(FilenameError::Hidden);
    }

    Ok(filename)
}

/// Generates a unique stored filename, keeping the extension of the
/// client-supplied name when it is short and alphanumeric.
pub fn generate_stored_filename(original: Option<&str>) -> String {
    let ext = original
        .and_then(|name| Path::new(name).extension())
        .and_then(|ext| ext.to_str())
        .filter(|ext| {
            !ext.is_empty()
                && ext.len() <= MAX_EXTENSION_LEN
                && ext.chars().all(|c| c.is_ascii_alphanumeric())
        })
        .map(|ext| format!(".{}", ext.to_ascii_lowercase()))
        .unwrap_or_default();

    format!("{}{ext}", Uuid::new_v4().simple())
}
