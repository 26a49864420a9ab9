//! Convenience entry points over the lockfile core.
//!
//! The functions here combine detection, parsing and set construction for
//! callers that do not want to wire up ports and adapters themselves. Pure
//! functions return [`LockfileError`]; functions that touch the filesystem
//! return the crate-wide [`Result`].

use crate::adapters::outbound::filesystem::FileSystemReader;
use crate::ports::outbound::{AsyncLockfileReader, LockfileReader, ManifestReader};
use crate::sbom_generation::domain::{
    DependencyCollection, DerivedDependencySet, LockfileType, ReachabilityOptions,
    RootedDependencySet,
};
use crate::sbom_generation::parsers::{self, DependencyRecords};
use crate::shared::error::LockfileError;
use crate::shared::Result;
use std::path::Path;

pub use crate::sbom_generation::parsers::detect;

/// How `parse_from_content` picks a parser.
#[derive(Debug, Clone, Copy, Default)]
pub enum ParseHint<'a> {
    /// Detect the type from content alone
    #[default]
    None,
    /// Detect from content; the path only labels detection errors
    Path(&'a Path),
    /// Skip detection and use this parser
    Type(LockfileType),
}

/// Parses lockfile text into a fresh, lazy record sequence.
///
/// Each call re-parses `content`; sequences share no state.
///
/// # Examples
/// ```
/// use lockfile_sbom::lockfile::{parse_from_content, ParseHint};
///
/// let content = r#"{"lockfileVersion": 3, "packages": {"node_modules/ms": {"version": "2.1.3"}}}"#;
/// let records: Vec<_> = parse_from_content(content, ParseHint::None).unwrap().collect();
/// assert_eq!(records[0].key(), "ms@2.1.3");
/// ```
pub fn parse_from_content(
    content: &str,
    hint: ParseHint<'_>,
) -> std::result::Result<DependencyRecords, LockfileError> {
    parse_with_type(content, hint).map(|(_, records)| records)
}

/// Like [`parse_from_content`], also returning the type that was used.
pub fn parse_with_type(
    content: &str,
    hint: ParseHint<'_>,
) -> std::result::Result<(LockfileType, DependencyRecords), LockfileError> {
    match hint {
        ParseHint::None => parsers::parse_with_hint(content, None, None),
        ParseHint::Path(path) => parsers::parse_with_hint(content, Some(path), None),
        ParseHint::Type(lockfile_type) => {
            parsers::parse_with_hint(content, None, Some(lockfile_type))
        }
    }
}

/// Reads the lockfile at `path` and parses it.
pub fn parse_from_path(path: &Path) -> Result<DependencyRecords> {
    let content = FileSystemReader::new().read_lockfile(path)?;
    Ok(parse_from_content(&content, ParseHint::Path(path))?)
}

/// Async variant of [`parse_from_path`]; the read is the only await point.
pub async fn parse_from_path_async(path: &Path) -> Result<DependencyRecords> {
    let content = FileSystemReader::new().read_lockfile_async(path).await?;
    Ok(parse_from_content(&content, ParseHint::Path(path))?)
}

/// Collects lockfile text into a traversable set.
pub fn dependency_set_from_content(
    content: &str,
    hint: ParseHint<'_>,
) -> std::result::Result<RootedDependencySet, LockfileError> {
    let (lockfile_type, records) = parse_with_type(content, hint)?;
    Ok(RootedDependencySet::from_records(lockfile_type, records))
}

/// Reads the lockfile at `path` into a traversable set.
pub fn load_dependency_set(path: &Path) -> Result<RootedDependencySet> {
    let content = FileSystemReader::new().read_lockfile(path)?;
    Ok(dependency_set_from_content(&content, ParseHint::Path(path))?)
}

/// Packages reachable from the manifest at `options.manifest_location()`.
///
/// # Errors
/// Fails with `LockfileError::Usage` before touching the filesystem when
/// `set` carries no edges. Manifest read failures propagate.
pub fn dependencies_of_workspace(
    set: &dyn DependencyCollection,
    options: &ReachabilityOptions,
) -> Result<DerivedDependencySet> {
    let Some(rooted) = set.as_rooted() else {
        return Err(LockfileError::usage(
            "dependencies_of_workspace requires a set loaded directly from a lockfile",
        )
        .into());
    };

    let manifest = FileSystemReader::new().read_manifest(&options.manifest_location())?;
    Ok(rooted.dependencies_of(&manifest, options)?)
}
