pub mod grammar;

use super::{build_record, DependencyRecords};
use crate::sbom_generation::domain::{
    is_local_reference, DependencyEdges, DependencyRecord, LockfileType,
};
use crate::shared::error::LockfileError;
use grammar::{YarnEntry, YarnLockDocument, YarnValue};
use std::collections::BTreeMap;

const METADATA_KEY: &str = "__metadata";

/// Parses a yarn v1 `yarn.lock`.
pub fn parse(content: &str) -> Result<DependencyRecords, LockfileError> {
    let document = grammar::parse(content)
        .map_err(|e| LockfileError::parse(LockfileType::YarnClassic, e.to_string()))?;
    Ok(parse_document(document))
}

/// Turns an already parsed yarn v1 document into records.
pub fn parse_document(document: YarnLockDocument) -> DependencyRecords {
    DependencyRecords::new(document.entries.into_iter().filter_map(record_from_entry))
}

/// Package name of a `name@range` descriptor.
///
/// Scoped names keep their leading `@`; the name ends at the next one.
pub fn descriptor_name(descriptor: &str) -> &str {
    let descriptor = descriptor.trim().trim_matches('"');
    let search_from = usize::from(descriptor.starts_with('@'));
    match descriptor[search_from..].find('@') {
        Some(index) => &descriptor[..search_from + index],
        None => descriptor,
    }
}

/// Range part of a `name@range` descriptor, empty when there is none.
pub fn descriptor_range(descriptor: &str) -> &str {
    let descriptor = descriptor.trim().trim_matches('"');
    let name = descriptor_name(descriptor);
    descriptor
        .get(name.len() + 1..)
        .unwrap_or_default()
}

fn record_from_entry(entry: YarnEntry) -> Option<DependencyRecord> {
    let descriptor = entry.descriptors.first()?;
    if descriptor == METADATA_KEY {
        return None;
    }

    // `link:` and directory `file:` entries carry no `resolved` field.
    if entry
        .descriptors
        .iter()
        .any(|descriptor| is_local_reference(descriptor_range(descriptor)))
    {
        tracing::debug!(%descriptor, "skipping local yarn entry");
        return None;
    }

    let resolved = entry.field_text("resolved");
    if resolved.as_deref().is_some_and(is_local_reference) {
        return None;
    }

    let name = descriptor_name(descriptor);
    let Some(version) = entry.field_text("version") else {
        tracing::debug!(%descriptor, "skipping yarn entry without a version");
        return None;
    };

    let fields = entry.fields()?;
    let edges = DependencyEdges {
        dependencies: text_map(fields.get("dependencies")),
        optional_dependencies: text_map(fields.get("optionalDependencies")),
        peer_dependencies: BTreeMap::new(),
    };

    Some(
        build_record(LockfileType::YarnClassic, descriptor, name, &version)?
            .with_integrity(entry.field_text("integrity"))
            .with_resolved(resolved)
            .with_edges(edges),
    )
}

fn text_map(value: Option<&YarnValue>) -> BTreeMap<String, String> {
    value
        .and_then(YarnValue::as_map)
        .map(|map| {
            map.iter()
                .filter_map(|(name, value)| Some((name.clone(), value.as_text()?)))
                .collect()
        })
        .unwrap_or_default()
}
