//! Content-first lockfile type detection.
//!
//! Each grammar is tried in a fixed order. A file name never overrides
//! what the content says; it is only consulted when there is no content.

use super::yarn_classic::grammar::{self, YarnLockDocument};
use super::ParsedDocument;
use crate::sbom_generation::domain::LockfileType;
use crate::shared::error::LockfileError;
use serde_yaml_ng::{Mapping, Value as YamlValue};
use std::path::Path;

const BERRY_METADATA_KEY: &str = "__metadata";
const VERSION_DESCRIPTORS: [&str; 2] = ["lockfileVersion", "shrinkwrapVersion"];

/// A detected lockfile together with the document detection parsed, so the
/// parser does not have to decode the content a second time.
#[derive(Debug, Clone)]
pub struct DetectedLockfile {
    pub lockfile_type: LockfileType,
    pub document: ParsedDocument,
}

/// Detects the lockfile type from content, falling back to the file name
/// only when no content is supplied.
pub fn detect(path: Option<&Path>, content: Option<&str>) -> Result<LockfileType, LockfileError> {
    if let Some(content) = content {
        return detect_content(content, path).map(|detected| detected.lockfile_type);
    }

    let hinted = path
        .and_then(Path::file_name)
        .and_then(|name| name.to_str())
        .and_then(LockfileType::from_file_name);

    hinted.ok_or_else(|| {
        LockfileError::detection(
            path.map(Path::to_path_buf),
            "no content was supplied and the file name is not a known lockfile name",
        )
    })
}

/// Detects the lockfile type of `content`.
///
/// Checks run in order: npm JSON, yarn berry, yarn classic, pnpm. `path` is
/// only used to label the error.
pub fn detect_content(
    content: &str,
    path: Option<&Path>,
) -> Result<DetectedLockfile, LockfileError> {
    if let Ok(json) = serde_json::from_str::<serde_json::Value>(content) {
        if json.get("lockfileVersion").is_some_and(serde_json::Value::is_number) {
            return Ok(detected(LockfileType::Npm, ParsedDocument::Json(json)));
        }
    }

    let yaml = serde_yaml_ng::from_str::<YamlValue>(content).ok();
    let yaml_root = yaml.as_ref().and_then(YamlValue::as_mapping);

    if yaml_root.is_some_and(has_berry_metadata) {
        if let Some(yaml) = yaml {
            return Ok(detected(LockfileType::YarnBerry, ParsedDocument::Yaml(yaml)));
        }
    }

    let has_version_descriptor = yaml_root.is_some_and(|root| {
        VERSION_DESCRIPTORS
            .iter()
            .any(|descriptor| root.contains_key(*descriptor))
    });

    if !has_version_descriptor {
        if let Some(document) = classic_document(content) {
            return Ok(detected(
                LockfileType::YarnClassic,
                ParsedDocument::YarnClassic(document),
            ));
        }
    }

    if has_version_descriptor && !yaml_root.is_some_and(|root| root.contains_key(BERRY_METADATA_KEY)) {
        if let Some(yaml) = yaml {
            return Ok(detected(LockfileType::Pnpm, ParsedDocument::Yaml(yaml)));
        }
    }

    tracing::debug!(
        path = ?path,
        "content matched no lockfile grammar"
    );
    Err(LockfileError::detection(
        path.map(Path::to_path_buf),
        "content matches no supported lockfile format (npm, pnpm, yarn classic, yarn berry)",
    ))
}

fn detected(lockfile_type: LockfileType, document: ParsedDocument) -> DetectedLockfile {
    tracing::debug!(%lockfile_type, "detected lockfile type");
    DetectedLockfile {
        lockfile_type,
        document,
    }
}

fn has_berry_metadata(root: &Mapping) -> bool {
    matches!(
        root.get(BERRY_METADATA_KEY),
        Some(YamlValue::Mapping(metadata)) if metadata.contains_key("version")
    )
}

/// The classic document, when `content` is a non-empty yarn v1 lockfile
/// with at least one versioned entry.
fn classic_document(content: &str) -> Option<YarnLockDocument> {
    let document = grammar::parse(content).ok()?;
    let is_classic = !document.is_empty()
        && !document.contains_key(BERRY_METADATA_KEY)
        && !VERSION_DESCRIPTORS
            .iter()
            .any(|descriptor| document.contains_key(descriptor))
        && document
            .entries
            .iter()
            .any(|entry| entry.field_text("version").is_some());
    is_classic.then_some(document)
}

#[cfg(test)]
mod tests {
    use super::*;

    const NPM: &str = r#"{"name": "web", "lockfileVersion": 3, "packages": {}}"#;
    const PNPM: &str = "lockfileVersion: '9.0'\n\nimporters:\n  .: {}\n";
    const CLASSIC: &str =
        "# yarn lockfile v1\n\n\nlodash@^4.17.21:\n  version \"4.17.21\"\n";
    const BERRY: &str =
        "__metadata:\n  version: 8\n  cacheKey: 10c0\n\n\"lodash@npm:^4.17.21\":\n  version: 4.17.21\n  resolution: \"lodash@npm:4.17.21\"\n";

    fn detect_str(content: &str) -> Result<LockfileType, LockfileError> {
        detect(None, Some(content))
    }

    #[test]
    fn test_detects_each_format() {
        assert_eq!(detect_str(NPM).unwrap(), LockfileType::Npm);
        assert_eq!(detect_str(PNPM).unwrap(), LockfileType::Pnpm);
        assert_eq!(detect_str(CLASSIC).unwrap(), LockfileType::YarnClassic);
        assert_eq!(detect_str(BERRY).unwrap(), LockfileType::YarnBerry);
    }

    #[test]
    fn test_content_wins_over_file_name() {
        let path = Path::new("package-lock.json");
        assert_eq!(
            detect(Some(path), Some(BERRY)).unwrap(),
            LockfileType::YarnBerry
        );

        let yarn = Path::new("yarn.lock");
        assert_eq!(detect(Some(yarn), Some(PNPM)).unwrap(), LockfileType::Pnpm);
    }

    #[test]
    fn test_file_name_used_without_content() {
        let path = Path::new("/repo/pnpm-lock.yaml");
        assert_eq!(detect(Some(path), None).unwrap(), LockfileType::Pnpm);

        let unknown = Path::new("/repo/deps.lock");
        let err = detect(Some(unknown), None).unwrap_err();
        assert!(matches!(err, LockfileError::Detection { .. }));
        assert!(detect(None, None).is_err());
    }

    #[test]
    fn test_unrecognized_content_is_detection_error() {
        let path = Path::new("package-lock.json");
        for content in ["", "{}", "[1, 2]", "just some text", "name: web\n"] {
            let err = detect(Some(path), Some(content)).unwrap_err();
            assert!(
                matches!(err, LockfileError::Detection { .. }),
                "{:?} should not be detected",
                content
            );
        }
    }

    #[test]
    fn test_json_without_numeric_version_is_not_npm() {
        let content = r#"{"lockfileVersion": "9.0"}"#;
        assert_eq!(detect_str(content).unwrap(), LockfileType::Pnpm);
    }

    #[test]
    fn test_classic_requires_a_versioned_entry() {
        let content = "# yarn lockfile v1\n\nlodash@^4.17.21:\n  resolved \"https://x\"\n";
        assert!(detect_str(content).is_err());
    }

    #[test]
    fn test_berry_metadata_requires_version() {
        let content = "__metadata:\n  cacheKey: 8\n";
        assert!(detect_str(content).is_err());
    }

    #[test]
    fn test_detect_content_returns_parsed_document() {
        let detected = detect_content(CLASSIC, None).unwrap();
        match detected.document {
            ParsedDocument::YarnClassic(document) => assert_eq!(document.entries.len(), 1),
            other => panic!("unexpected document {:?}", other),
        }
    }

    #[test]
    fn test_metadata_marker_inside_values_does_not_mean_berry() {
        let npm = r#"{"lockfileVersion": 3, "packages": {"node_modules/x": {"version": "1.0.0", "resolved": "https://e.com/__metadata:\n  version: 8"}}}"#;
        assert_eq!(detect_str(npm).unwrap(), LockfileType::Npm);

        let pnpm = "lockfileVersion: '9.0'\n\npackages:\n  x@1.0.0:\n    resolution: {tarball: '__metadata: {version: 8}'}\n";
        assert_eq!(detect_str(pnpm).unwrap(), LockfileType::Pnpm);

        let classic = "# yarn lockfile v1\n\n\nx@^1.0.0:\n  version \"1.0.0\"\n  resolved \"https://e.com/__metadata/x-1.0.0.tgz\"\n";
        assert_eq!(detect_str(classic).unwrap(), LockfileType::YarnClassic);
    }
}
