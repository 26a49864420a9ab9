mod package_filter;
mod reachability;
mod sbom_generator;
pub mod version_range;

pub use package_filter::PackageFilter;
pub use reachability::ReachabilityAnalyzer;
pub use sbom_generator::{SbomGenerator, TOOL_NAME};
pub use version_range::VersionRange;
