pub mod dependency_record;
pub mod dependency_set;
pub mod lockfile_type;
pub mod manifest;
pub mod reachability_options;
pub mod sbom_metadata;

pub use dependency_record::{is_local_reference, DependencyEdges, DependencyRecord, InvalidRecord};
pub use dependency_set::{DependencyCollection, DerivedDependencySet, RootedDependencySet};
pub use lockfile_type::{LockfileType, PnpmEra};
pub use manifest::PackageManifest;
pub use reachability_options::{ReachabilityOptions, MANIFEST_FILE_NAME};
pub use sbom_metadata::SbomMetadata;
