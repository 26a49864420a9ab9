//! `pnpm-lock.yaml` / `shrinkwrap.yaml` parser covering every key grammar
//! pnpm has written since 2017.

pub mod era;
pub mod spec_key;

use super::{build_record, yaml_str, yaml_string_map, DependencyRecords};
use crate::sbom_generation::domain::{
    is_local_reference, DependencyEdges, DependencyRecord, LockfileType, PnpmEra,
};
use crate::shared::error::LockfileError;
use serde_yaml_ng::{Mapping, Value};
use std::collections::{BTreeMap, HashMap};

pub use era::detect_era;
pub use spec_key::{parse_key, sniff_key, PackageKey};

/// Parses `pnpm-lock.yaml` content.
pub fn parse(content: &str) -> Result<DependencyRecords, LockfileError> {
    let document: Value = serde_yaml_ng::from_str(content)
        .map_err(|e| LockfileError::parse(LockfileType::Pnpm, e.to_string()))?;
    parse_document(document)
}

/// Parses an already decoded pnpm document.
pub fn parse_document(document: Value) -> Result<DependencyRecords, LockfileError> {
    let Value::Mapping(mut root) = document else {
        return Err(LockfileError::parse(
            LockfileType::Pnpm,
            "document root must be a mapping",
        ));
    };

    let era = detect_era(&root)?;
    tracing::debug!(
        %era,
        leading_slash = era.has_leading_slash(),
        "detected pnpm lockfile era"
    );

    let packages = take_mapping(&mut root, "packages")?;
    if era.splits_snapshots() {
        let snapshots = take_mapping(&mut root, "snapshots")?;
        return Ok(DependencyRecords::new(
            merge_snapshots(packages, snapshots, era).into_iter(),
        ));
    }

    Ok(DependencyRecords::new(packages.into_iter().filter_map(
        move |(key, entry)| {
            let key = key.as_str()?;
            let entry = entry.as_mapping()?;
            let record = record_from_entry(key, entry, era)?;
            Some(record.with_edges(edges(entry, era)))
        },
    )))
}

fn take_mapping(root: &mut Mapping, key: &str) -> Result<Mapping, LockfileError> {
    match root.remove(key) {
        None | Some(Value::Null) => Ok(Mapping::new()),
        Some(Value::Mapping(mapping)) => Ok(mapping),
        Some(_) => Err(LockfileError::parse(
            LockfileType::Pnpm,
            format!("`{}` must be a mapping", key),
        )),
    }
}

/// Joins v9 `packages` metadata with the edges recorded under `snapshots`.
///
/// Snapshot keys carry peer suffixes; every variant of one base package
/// collapses into a single record whose edges are the union of all
/// variants. Document order is preserved.
fn merge_snapshots(packages: Mapping, snapshots: Mapping, era: PnpmEra) -> Vec<DependencyRecord> {
    let mut records: Vec<DependencyRecord> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    let empty = Mapping::new();

    let mut insert = |record: DependencyRecord, edges: DependencyEdges| {
        let key = record.key();
        match index.get(&key) {
            Some(&position) => records[position].edges_mut().merge(edges),
            None => {
                index.insert(key, records.len());
                records.push(record.with_edges(edges));
            }
        }
    };

    for (key, entry) in &packages {
        let (Some(key), Some(entry)) = (key.as_str(), entry.as_mapping()) else {
            continue;
        };
        if let Some(record) = record_from_entry(key, entry, era) {
            insert(record, DependencyEdges::default());
        }
    }

    for (key, snapshot) in &snapshots {
        let Some(key) = key.as_str() else {
            continue;
        };
        let base_key = key.split('(').next().unwrap_or(key);
        let base_entry = packages
            .get(base_key)
            .and_then(Value::as_mapping)
            .unwrap_or(&empty);
        if is_local_entry(base_entry) {
            continue;
        }
        let Some(record) = record_from_entry(base_key, base_entry, era) else {
            continue;
        };
        let snapshot_edges = snapshot
            .as_mapping()
            .map(|snapshot| edges(snapshot, era))
            .unwrap_or_default();
        insert(record, snapshot_edges);
    }

    records
}

/// Entries installed from a directory inside the repository.
fn is_local_entry(entry: &Mapping) -> bool {
    if entry.contains_key("directory") {
        return true;
    }
    let Some(Value::Mapping(resolution)) = entry.get("resolution") else {
        return false;
    };
    if yaml_str(resolution, "type").as_deref() == Some("directory") {
        return true;
    }
    yaml_str(resolution, "tarball").is_some_and(|tarball| is_local_reference(&tarball))
}

fn record_from_entry(key: &str, entry: &Mapping, era: PnpmEra) -> Option<DependencyRecord> {
    if is_local_entry(entry) || is_local_reference(key.trim_start_matches('/')) {
        return None;
    }

    let parsed = parse_key(key, era);
    let name = yaml_str(entry, "name").or_else(|| parsed.as_ref().map(|k| k.name.to_string()));
    let version =
        yaml_str(entry, "version").or_else(|| parsed.as_ref().map(|k| k.version.to_string()));
    let (Some(name), Some(version)) = (name, version) else {
        tracing::debug!(key, %era, "skipping pnpm entry without a recognizable identity");
        return None;
    };
    if is_local_reference(&version) {
        return None;
    }

    let resolution = match entry.get("resolution") {
        Some(Value::Mapping(resolution)) => Some(resolution),
        _ => None,
    };
    let integrity = resolution.and_then(|r| yaml_str(r, "integrity"));
    let resolved = resolution.and_then(|r| {
        yaml_str(r, "tarball").or_else(|| {
            let repo = yaml_str(r, "repo")?;
            let commit = yaml_str(r, "commit")?;
            Some(format!("{}#{}", repo, commit))
        })
    });

    Some(
        build_record(LockfileType::Pnpm, key, &name, &version)?
            .with_integrity(integrity)
            .with_resolved(resolved),
    )
}

fn edges(entry: &Mapping, era: PnpmEra) -> DependencyEdges {
    let targets = |field: &str| -> BTreeMap<String, String> {
        yaml_string_map(entry, field)
            .into_iter()
            .filter_map(|(name, value)| Some((name, edge_target(&value, era)?)))
            .collect()
    };

    DependencyEdges {
        dependencies: targets("dependencies"),
        optional_dependencies: targets("optionalDependencies"),
        peer_dependencies: yaml_string_map(entry, "peerDependencies"),
    }
}

/// The requirement stored for one dependency edge.
///
/// Plain values are resolved versions with any peer suffix removed.
/// Aliased installs point at another package key and are rewritten to
/// `npm:<real-name>@<version>`.
fn edge_target(value: &str, era: PnpmEra) -> Option<String> {
    if is_local_reference(value) {
        return None;
    }
    if value.starts_with('/') {
        let target = sniff_key(value)?;
        return Some(format!("npm:{}@{}", target.name, target.version));
    }

    let base = if era.uses_paren_peer_suffix() {
        value.split('(').next()
    } else {
        value.split('_').next()
    }
    .unwrap_or(value);

    if base.rfind('@').is_some_and(|index| index > 0) {
        let target = sniff_key(value)?;
        return Some(format!("npm:{}@{}", target.name, target.version));
    }
    (!base.is_empty()).then(|| base.to_string())
}
