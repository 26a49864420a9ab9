use super::{build_record, DependencyRecords};
use crate::sbom_generation::domain::{is_local_reference, DependencyEdges, DependencyRecord, LockfileType};
use crate::shared::error::LockfileError;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;

const NODE_MODULES: &str = "node_modules/";

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NpmPackageEntry {
    #[serde(default)]
    version: Option<String>,
    #[serde(default)]
    integrity: Option<String>,
    #[serde(default)]
    resolved: Option<String>,
    #[serde(default)]
    link: Option<bool>,
    #[serde(default)]
    dependencies: BTreeMap<String, String>,
    #[serde(default)]
    optional_dependencies: BTreeMap<String, String>,
    #[serde(default)]
    peer_dependencies: BTreeMap<String, String>,
}

/// Parses `package-lock.json` / `npm-shrinkwrap.json` content.
pub fn parse(content: &str) -> Result<DependencyRecords, LockfileError> {
    let document: Value = serde_json::from_str(content)
        .map_err(|e| LockfileError::parse(LockfileType::Npm, e.to_string()))?;
    parse_document(document)
}

/// Parses an already decoded npm lockfile.
///
/// Only the `packages` layout (lockfile versions 2 and 3) is read. A v1
/// document with just a `dependencies` tree yields no records.
pub fn parse_document(document: Value) -> Result<DependencyRecords, LockfileError> {
    let Value::Object(mut root) = document else {
        return Err(LockfileError::parse(
            LockfileType::Npm,
            "document root must be a JSON object",
        ));
    };

    match root.remove("packages") {
        Some(Value::Object(packages)) => Ok(DependencyRecords::new(
            packages
                .into_iter()
                .filter_map(|(path, entry)| record_from_entry(&path, entry)),
        )),
        Some(_) => Err(LockfileError::parse(
            LockfileType::Npm,
            "`packages` must be an object keyed by install path",
        )),
        None => {
            if root.contains_key("dependencies") {
                tracing::warn!(
                    "npm lockfile v1 (`dependencies` tree only) is not supported; no records produced"
                );
            }
            Ok(DependencyRecords::empty())
        }
    }
}

/// Package name for an install path: the text after the final `node_modules/`.
pub fn package_name_from_path(path: &str) -> Option<&str> {
    let start = path.rfind(NODE_MODULES)? + NODE_MODULES.len();
    let name = &path[start..];
    (!name.is_empty()).then_some(name)
}

fn record_from_entry(path: &str, entry: Value) -> Option<DependencyRecord> {
    // The root project and workspace member definitions are not installs.
    let name = package_name_from_path(path)?;

    let entry: NpmPackageEntry = match serde_json::from_value(entry) {
        Ok(entry) => entry,
        Err(e) => {
            tracing::debug!(path, error = %e, "skipping malformed npm package entry");
            return None;
        }
    };

    if entry.link == Some(true) {
        return None;
    }
    if entry.resolved.as_deref().is_some_and(is_local_reference) {
        return None;
    }

    let version = entry.version?;
    let edges = DependencyEdges {
        dependencies: entry.dependencies,
        optional_dependencies: entry.optional_dependencies,
        peer_dependencies: entry.peer_dependencies,
    };

    Some(
        build_record(LockfileType::Npm, path, name, &version)?
            .with_integrity(entry.integrity)
            .with_resolved(entry.resolved)
            .with_link(entry.link)
            .with_edges(edges),
    )
}
