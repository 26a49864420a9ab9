use crate::shared::error::SbomError;
use crate::shared::Result;
use std::fs::{self, Metadata};
use std::path::Path;

/// Maximum file size for security (100 MB)
/// This prevents DoS attacks via excessively large files
pub const MAX_FILE_SIZE: u64 = 100 * 1024 * 1024;

/// Validates that a path exists and is a regular file (not a directory or symlink)
///
/// # Security
/// This combines existence check, symlink check, and file type check in one operation.
/// `symlink_metadata()` is used so the link itself is inspected, not its target.
///
/// # Arguments
/// * `path` - The path to validate
/// * `file_description` - Description of the file (e.g., "lockfile", "package.json")
///
/// # Errors
/// Returns an error if:
/// - The path doesn't exist
/// - The path is a symbolic link
/// - The path is not a regular file
/// - The file is larger than [`MAX_FILE_SIZE`]
pub fn validate_regular_file(path: &Path, file_description: &str) -> Result<()> {
    let metadata = fs::symlink_metadata(path).map_err(|e| SbomError::FileReadError {
        path: path.to_path_buf(),
        details: format!("Failed to read {} metadata: {}", file_description, e),
    })?;

    validate_metadata(&metadata, path)
}

/// Applies the symlink, file-type and size checks to already-fetched metadata.
///
/// Shared by the blocking and the tokio-based readers, which obtain the
/// metadata through different APIs.
pub fn validate_metadata(metadata: &Metadata, path: &Path) -> Result<()> {
    if metadata.is_symlink() {
        return Err(SbomError::SecurityError {
            path: path.to_path_buf(),
            reason: "The path is a symbolic link".to_string(),
            hint: "For security reasons, symbolic links are not allowed. Pass the real file path instead.".to_string(),
        }
        .into());
    }

    if !metadata.is_file() {
        anyhow::bail!("{} is not a regular file", path.display());
    }

    validate_file_size(metadata.len(), path, MAX_FILE_SIZE)
}

/// Validates file size is within acceptable limits
///
/// # Security
/// This prevents DoS attacks via excessively large files that could consume
/// system resources or cause out-of-memory errors.
///
/// # Errors
/// Returns an error if the file size exceeds the maximum
pub fn validate_file_size(file_size: u64, path: &Path, max_size: u64) -> Result<()> {
    if file_size > max_size {
        return Err(SbomError::SecurityError {
            path: path.to_path_buf(),
            reason: format!(
                "File is too large ({} bytes). Maximum allowed size is {} bytes.",
                file_size, max_size
            ),
            hint: "Lockfiles of this size are not supported".to_string(),
        }
        .into());
    }
    Ok(())
}
