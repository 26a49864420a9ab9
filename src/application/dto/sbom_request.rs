use crate::sbom_generation::domain::{LockfileType, ReachabilityOptions};
use std::path::PathBuf;

/// SbomRequest - Internal request DTO for SBOM generation use case
///
/// Built by the CLI from flags and the config file; consumed by
/// [`crate::application::use_cases::GenerateSbomUseCase`].
#[derive(Debug, Clone, Default)]
pub struct SbomRequest {
    /// Lockfiles to read; several are unioned into one set
    pub lockfile_paths: Vec<PathBuf>,
    /// Forces a parser instead of detecting the type from content
    pub lockfile_type: Option<LockfileType>,
    /// Patterns for excluding packages from the SBOM
    pub exclude_patterns: Vec<String>,
    /// When set, only packages reachable from the workspace manifest are kept
    pub reachability: Option<ReachabilityOptions>,
}

impl SbomRequest {
    pub fn new(lockfile_paths: Vec<PathBuf>) -> Self {
        Self {
            lockfile_paths,
            ..Self::default()
        }
    }

    pub fn with_lockfile_type(mut self, lockfile_type: Option<LockfileType>) -> Self {
        self.lockfile_type = lockfile_type;
        self
    }

    pub fn with_exclude_patterns(mut self, exclude_patterns: Vec<String>) -> Self {
        self.exclude_patterns = exclude_patterns;
        self
    }

    pub fn with_reachability(mut self, reachability: Option<ReachabilityOptions>) -> Self {
        self.reachability = reachability;
        self
    }
}
