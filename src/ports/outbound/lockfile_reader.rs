use crate::shared::Result;
use async_trait::async_trait;
use std::path::Path;

/// LockfileReader port for reading lockfile contents
///
/// This port abstracts the file system operations needed to read a
/// `package-lock.json`, `pnpm-lock.yaml` or `yarn.lock` file.
pub trait LockfileReader {
    /// Reads the lockfile at `path`
    ///
    /// # Errors
    /// Returns an error if:
    /// - The file does not exist
    /// - The path is a symbolic link, not a regular file, or too large
    /// - The file cannot be read due to permissions or I/O errors
    fn read_lockfile(&self, path: &Path) -> Result<String>;
}

/// Non-blocking variant of [`LockfileReader`], used when several lockfiles
/// are read concurrently.
///
/// Implementations must be `Send + Sync` so reads can be driven from
/// multiple tasks.
#[async_trait]
pub trait AsyncLockfileReader: Send + Sync {
    /// Reads the lockfile at `path` without blocking the runtime
    async fn read_lockfile_async(&self, path: &Path) -> Result<String>;
}
