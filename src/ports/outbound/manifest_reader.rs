use crate::sbom_generation::domain::PackageManifest;
use crate::shared::Result;
use std::path::Path;

/// ManifestReader port for loading a workspace's `package.json`
///
/// Reachability starts from the direct dependencies declared in the
/// manifest, so this is only consulted when a reachability query is made.
pub trait ManifestReader {
    /// Reads and decodes the manifest at `path`
    ///
    /// # Errors
    /// Returns an error if the file is missing, unsafe to read (see
    /// [`crate::shared::security`]) or not a valid `package.json`.
    fn read_manifest(&self, path: &Path) -> Result<PackageManifest>;
}
