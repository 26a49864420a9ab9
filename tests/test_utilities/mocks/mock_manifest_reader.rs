use lockfile_sbom::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Mock ManifestReader returning a fixed manifest and recording lookups
#[derive(Default, Clone)]
pub struct MockManifestReader {
    pub manifest: Option<PackageManifest>,
    pub requested: Arc<Mutex<Vec<PathBuf>>>,
}

impl MockManifestReader {
    pub fn new(manifest: PackageManifest) -> Self {
        Self {
            manifest: Some(manifest),
            requested: Arc::default(),
        }
    }

    /// A reader that behaves as if no package.json exists
    pub fn missing() -> Self {
        Self::default()
    }

    pub fn requested_paths(&self) -> Vec<PathBuf> {
        self.requested.lock().unwrap().clone()
    }
}

impl ManifestReader for MockManifestReader {
    fn read_manifest(&self, path: &Path) -> Result<PackageManifest> {
        self.requested.lock().unwrap().push(path.to_path_buf());
        self.manifest
            .clone()
            .ok_or_else(|| anyhow::anyhow!("package.json not found at {}", path.display()))
    }
}
