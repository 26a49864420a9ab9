use crate::ports::outbound::{AsyncLockfileReader, LockfileReader, ManifestReader};
use crate::sbom_generation::domain::PackageManifest;
use crate::shared::error::SbomError;
use crate::shared::security::{validate_metadata, validate_regular_file};
use crate::shared::Result;
use async_trait::async_trait;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

/// FileSystemReader adapter for reading files from the file system
///
/// Implements the blocking and async lockfile ports plus the manifest port.
/// Every read goes through the symlink, file-type and size checks in
/// [`crate::shared::security`].
pub struct FileSystemReader;

impl FileSystemReader {
    pub fn new() -> Self {
        Self
    }
}

impl Default for FileSystemReader {
    fn default() -> Self {
        Self::new()
    }
}

fn not_found(path: &Path, what: &str) -> anyhow::Error {
    SbomError::LockfileNotFound {
        path: path.to_path_buf(),
        suggestion: format!(
            "{} does not exist. Pass the path to a package-lock.json, pnpm-lock.yaml or yarn.lock file.",
            what
        ),
    }
    .into()
}

fn read_error(path: &Path, error: std::io::Error) -> anyhow::Error {
    SbomError::FileReadError {
        path: path.to_path_buf(),
        details: error.to_string(),
    }
    .into()
}

impl LockfileReader for FileSystemReader {
    fn read_lockfile(&self, path: &Path) -> Result<String> {
        if fs::symlink_metadata(path).is_err() {
            return Err(not_found(path, "The lockfile"));
        }
        validate_regular_file(path, "lockfile")?;

        fs::read_to_string(path).map_err(|e| read_error(path, e))
    }
}

#[async_trait]
impl AsyncLockfileReader for FileSystemReader {
    async fn read_lockfile_async(&self, path: &Path) -> Result<String> {
        let metadata = match tokio::fs::symlink_metadata(path).await {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(not_found(path, "The lockfile"))
            }
            Err(e) => return Err(read_error(path, e)),
        };
        validate_metadata(&metadata, path)?;

        tokio::fs::read_to_string(path)
            .await
            .map_err(|e| read_error(path, e))
    }
}

impl ManifestReader for FileSystemReader {
    fn read_manifest(&self, path: &Path) -> Result<PackageManifest> {
        if fs::symlink_metadata(path).is_err() {
            anyhow::bail!(
                "package.json not found at {}. Use --manifest-dir or --workspace to point at the project.",
                path.display()
            );
        }
        validate_regular_file(path, "package.json")?;

        let content = fs::read_to_string(path).map_err(|e| read_error(path, e))?;
        let manifest = PackageManifest::from_json(&content)?;
        Ok(manifest)
    }
}
