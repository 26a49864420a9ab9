//! Lockfile detection and the per-format parsers.
//!
//! Every parser is a pure function from content (or an already parsed
//! document) to a [`DependencyRecords`] sequence. Sequences are built fresh
//! on each call and share no state, so independent parses can run on any
//! thread.

pub mod detector;
pub mod npm;
pub mod pnpm;
pub mod yarn_berry;
pub mod yarn_classic;

pub use detector::{detect, detect_content, DetectedLockfile};
pub use yarn_classic::grammar::YarnLockDocument;

use crate::sbom_generation::domain::{DependencyRecord, LockfileType};
use crate::shared::error::LockfileError;
use serde_yaml_ng::{Mapping, Value as YamlValue};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

/// A lazy, finite sequence of dependency records from one parse.
pub struct DependencyRecords {
    inner: Box<dyn Iterator<Item = DependencyRecord> + Send>,
}

impl DependencyRecords {
    pub(crate) fn new<I>(records: I) -> Self
    where
        I: Iterator<Item = DependencyRecord> + Send + 'static,
    {
        Self {
            inner: Box::new(records),
        }
    }

    pub fn empty() -> Self {
        Self::new(std::iter::empty())
    }
}

impl Iterator for DependencyRecords {
    type Item = DependencyRecord;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl fmt::Debug for DependencyRecords {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DependencyRecords").finish_non_exhaustive()
    }
}

/// A lockfile document after its outer syntax has been parsed.
#[derive(Debug, Clone)]
pub enum ParsedDocument {
    Json(serde_json::Value),
    Yaml(YamlValue),
    YarnClassic(YarnLockDocument),
}

impl ParsedDocument {
    fn kind(&self) -> &'static str {
        match self {
            ParsedDocument::Json(_) => "JSON",
            ParsedDocument::Yaml(_) => "YAML",
            ParsedDocument::YarnClassic(_) => "yarn v1",
        }
    }
}

/// Parses raw content with the parser for `lockfile_type`.
pub fn parse_content(
    lockfile_type: LockfileType,
    content: &str,
) -> Result<DependencyRecords, LockfileError> {
    match lockfile_type {
        LockfileType::Npm => npm::parse(content),
        LockfileType::Pnpm => pnpm::parse(content),
        LockfileType::YarnClassic => yarn_classic::parse(content),
        LockfileType::YarnBerry => yarn_berry::parse(content),
    }
}

/// Parses an already decoded document with the parser for `lockfile_type`.
pub fn parse_document(
    lockfile_type: LockfileType,
    document: ParsedDocument,
) -> Result<DependencyRecords, LockfileError> {
    match (lockfile_type, document) {
        (LockfileType::Npm, ParsedDocument::Json(value)) => npm::parse_document(value),
        (LockfileType::Pnpm, ParsedDocument::Yaml(value)) => pnpm::parse_document(value),
        (LockfileType::YarnBerry, ParsedDocument::Yaml(value)) => yarn_berry::parse_document(value),
        (LockfileType::YarnClassic, ParsedDocument::YarnClassic(document)) => {
            Ok(yarn_classic::parse_document(document))
        }
        (lockfile_type, document) => Err(LockfileError::parse(
            lockfile_type,
            format!("a {} document cannot hold this lockfile type", document.kind()),
        )),
    }
}

/// Parses the detected document with the matching parser.
pub fn parse_detected(detected: DetectedLockfile) -> Result<DependencyRecords, LockfileError> {
    parse_document(detected.lockfile_type, detected.document)
}

/// Parses `content`, detecting its type unless `forced` names one.
///
/// `path` is only a hint for the detection error message; content always
/// decides the type.
pub fn parse_with_hint(
    content: &str,
    path: Option<&Path>,
    forced: Option<LockfileType>,
) -> Result<(LockfileType, DependencyRecords), LockfileError> {
    match forced {
        Some(lockfile_type) => Ok((lockfile_type, parse_content(lockfile_type, content)?)),
        None => {
            let detected = detect_content(content, path)?;
            let lockfile_type = detected.lockfile_type;
            Ok((lockfile_type, parse_detected(detected)?))
        }
    }
}

/// Renders a YAML scalar as text; `1.0` and `true` become `"1.0"` and `"true"`.
pub(crate) fn yaml_scalar(value: &YamlValue) -> Option<String> {
    match value {
        YamlValue::String(s) => Some(s.clone()),
        YamlValue::Number(n) => Some(n.to_string()),
        YamlValue::Bool(b) => Some(b.to_string()),
        YamlValue::Tagged(tagged) => yaml_scalar(&tagged.value),
        _ => None,
    }
}

/// Looks up `key` in a YAML mapping and renders it as text.
pub(crate) fn yaml_str(mapping: &Mapping, key: &str) -> Option<String> {
    mapping.get(key).and_then(yaml_scalar)
}

/// Collects a `name -> scalar` YAML mapping, dropping non-scalar values.
pub(crate) fn yaml_string_map(mapping: &Mapping, key: &str) -> BTreeMap<String, String> {
    let Some(YamlValue::Mapping(map)) = mapping.get(key) else {
        return BTreeMap::new();
    };
    map.iter()
        .filter_map(|(name, value)| Some((yaml_scalar(name)?, yaml_scalar(value)?)))
        .collect()
}

/// Validates a candidate record, logging and dropping malformed entries.
pub(crate) fn build_record(
    lockfile_type: LockfileType,
    key: &str,
    name: &str,
    version: &str,
) -> Option<DependencyRecord> {
    match DependencyRecord::new(name, version) {
        Ok(record) => Some(record),
        Err(reason) => {
            tracing::debug!(%lockfile_type, key, %reason, "skipping malformed lockfile entry");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_yaml_scalar_renders_numbers_and_bools() {
        let value: YamlValue = serde_yaml_ng::from_str("a: 5.4\nb: true\nc: x").unwrap();
        let mapping = value.as_mapping().unwrap();
        assert_eq!(yaml_str(mapping, "a").as_deref(), Some("5.4"));
        assert_eq!(yaml_str(mapping, "b").as_deref(), Some("true"));
        assert_eq!(yaml_str(mapping, "c").as_deref(), Some("x"));
        assert_eq!(yaml_str(mapping, "missing"), None);
    }

    #[test]
    fn test_yaml_string_map_skips_nested_values() {
        let value: YamlValue =
            serde_yaml_ng::from_str("deps:\n  a: 1.0.0\n  b:\n    nested: true\n").unwrap();
        let map = yaml_string_map(value.as_mapping().unwrap(), "deps");
        assert_eq!(map.len(), 1);
        assert_eq!(map["a"], "1.0.0");
    }

    #[test]
    fn test_parse_document_rejects_mismatched_document() {
        let err = parse_document(LockfileType::Npm, ParsedDocument::Yaml(YamlValue::Null))
            .unwrap_err();
        assert!(matches!(err, LockfileError::Parse { .. }));
        assert!(err.to_string().contains("YAML"));
    }

    #[test]
    fn test_records_are_fresh_per_call() {
        let content = r#"{"lockfileVersion": 3, "packages": {"node_modules/a": {"version": "1.0.0"}}}"#;
        let first: Vec<_> = parse_content(LockfileType::Npm, content).unwrap().collect();
        let second: Vec<_> = parse_content(LockfileType::Npm, content).unwrap().collect();
        assert_eq!(first, second);
        assert_eq!(first.len(), 1);
    }

    #[test]
    fn test_parse_with_hint_detects_from_content() {
        let content = "__metadata:\n  version: 6\n\"a@npm:^1.0.0\":\n  version: 1.0.0\n  resolution: \"a@npm:1.0.0\"\n";
        let (lockfile_type, records) =
            parse_with_hint(content, Some(Path::new("package-lock.json")), None).unwrap();
        assert_eq!(lockfile_type, LockfileType::YarnBerry);
        assert_eq!(records.count(), 1);
    }

    #[test]
    fn test_parse_with_hint_honours_forced_type() {
        let err = parse_with_hint("{}", None, Some(LockfileType::Pnpm)).unwrap_err();
        assert!(matches!(err, LockfileError::Parse { .. }));
    }

    #[test]
    fn test_empty_records() {
        assert_eq!(DependencyRecords::empty().count(), 0);
    }
}
