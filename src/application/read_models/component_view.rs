//! Component view structs for read model
//!
//! These structs provide a flattened, query-optimized view of component data.

/// View representation of a software component
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentView {
    /// BOM reference identifier
    pub bom_ref: String,
    /// Component name, scope included
    pub name: String,
    /// Component version
    pub version: String,
    /// Package URL (purl)
    pub purl: String,
    /// Integrity string exactly as the lockfile recorded it
    pub integrity: Option<String>,
    /// Hashes decoded from the integrity string
    pub hashes: Vec<HashView>,
    /// Where the package was downloaded from
    pub resolved: Option<String>,
    /// npm `link` flag
    pub link: Option<bool>,
    /// Whether the manifest names this package directly
    pub is_direct_dependency: bool,
}

/// A decoded component hash
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashView {
    /// CycloneDX algorithm name, e.g. `SHA-512`
    pub algorithm: String,
    /// Lower-case hex digest
    pub content: String,
}
