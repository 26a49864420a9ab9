use crate::sbom_generation::domain::{DerivedDependencySet, LockfileType, SbomMetadata};
use std::collections::BTreeSet;
use std::path::PathBuf;

/// One lockfile that contributed to the response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockfileSummary {
    pub path: PathBuf,
    pub lockfile_type: LockfileType,
    /// Distinct `name@version` keys the lockfile yielded
    pub record_count: usize,
}

/// SbomResponse - Internal response DTO from SBOM generation use case
///
/// Holds the final dependency set; formatters turn it into output through
/// the read model.
#[derive(Debug, Clone)]
pub struct SbomResponse {
    /// Packages after union, reachability and exclusion
    pub dependencies: DerivedDependencySet,
    /// Lockfiles that were read, in request order
    pub sources: Vec<LockfileSummary>,
    /// SBOM metadata (timestamp, tool info, serial number)
    pub metadata: SbomMetadata,
    /// Names declared directly in the manifest; only present for
    /// reachability runs
    pub direct_dependencies: Option<BTreeSet<String>>,
    /// Exclude patterns that matched nothing
    pub unmatched_patterns: Vec<String>,
}
