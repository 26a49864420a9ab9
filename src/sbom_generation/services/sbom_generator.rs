use crate::sbom_generation::domain::SbomMetadata;
use chrono::Utc;
use uuid::Uuid;

/// Tool name written into every generated SBOM.
pub const TOOL_NAME: &str = "lockfile-sbom";

/// Stamps SBOM runs with provenance metadata.
pub struct SbomGenerator;

impl SbomGenerator {
    /// Metadata for a run happening now, with a fresh random serial.
    pub fn generate_metadata(tool_name: &str, tool_version: &str) -> SbomMetadata {
        let metadata = SbomMetadata::new(Utc::now(), tool_name, tool_version, Uuid::new_v4());
        tracing::debug!(serial = %metadata.serial(), "generated SBOM metadata");
        metadata
    }

    /// Metadata naming this crate at its compile-time version.
    pub fn generate_default_metadata() -> SbomMetadata {
        Self::generate_metadata(TOOL_NAME, env!("CARGO_PKG_VERSION"))
    }
}
