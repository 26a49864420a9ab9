use super::{build_record, yaml_str, yaml_string_map, DependencyRecords};
use crate::sbom_generation::domain::{DependencyEdges, DependencyRecord, LockfileType};
use crate::shared::error::LockfileError;
use serde_yaml_ng::{Mapping, Value};
use std::collections::BTreeMap;

const METADATA_KEY: &str = "__metadata";

/// Resolution protocols that point at code inside the repository.
const LOCAL_PROTOCOLS: [&str; 4] = ["workspace", "portal", "link", "file"];

/// Parses a yarn v2+ `yarn.lock`.
pub fn parse(content: &str) -> Result<DependencyRecords, LockfileError> {
    let document: Value = serde_yaml_ng::from_str(content)
        .map_err(|e| LockfileError::parse(LockfileType::YarnBerry, e.to_string()))?;
    parse_document(document)
}

/// Parses an already decoded yarn v2+ document.
///
/// Every non-local entry is yielded, so several aliases of one package
/// produce duplicate records; collapsing them is left to the set.
pub fn parse_document(document: Value) -> Result<DependencyRecords, LockfileError> {
    let Value::Mapping(root) = document else {
        return Err(LockfileError::parse(
            LockfileType::YarnBerry,
            "document root must be a mapping",
        ));
    };

    Ok(DependencyRecords::new(root.into_iter().filter_map(
        |(key, entry)| {
            let key = key.as_str()?.to_string();
            if key == METADATA_KEY {
                return None;
            }
            record_from_entry(&key, entry.as_mapping()?)
        },
    )))
}

/// The ident of a `name@protocol:reference` locator or descriptor.
///
/// The name ends at the first `@` after an optional leading scope, which is
/// always the outermost protocol boundary: a `patch:` locator nests its
/// target only after that point.
pub fn locator_name(locator: &str) -> Option<&str> {
    let search_from = usize::from(locator.starts_with('@'));
    let index = locator.get(search_from..)?.find('@')? + search_from;
    let name = &locator[..index];
    (!name.is_empty() && name != "@").then_some(name)
}

/// Protocol of a locator's reference, e.g. `npm` for `lodash@npm:4.17.21`.
pub fn locator_protocol(locator: &str) -> Option<&str> {
    let name = locator_name(locator)?;
    let reference = &locator[name.len() + 1..];
    let (protocol, _) = reference.split_once(':')?;
    Some(protocol)
}

/// Whether a resolution refers to workspace-local code.
///
/// `patch:` resolutions are judged by the locator they patch.
pub fn is_local_resolution(locator: &str) -> bool {
    match locator_protocol(locator) {
        Some("patch") => patched_locator(locator)
            .map(|inner| is_local_resolution(&inner))
            .unwrap_or(false),
        Some(protocol) => LOCAL_PROTOCOLS.contains(&protocol),
        None => false,
    }
}

/// Decodes the locator wrapped by `name@patch:<encoded>#<patch-path>`.
fn patched_locator(locator: &str) -> Option<String> {
    let (_, wrapped) = locator.split_once("@patch:")?;
    let encoded = wrapped.split('#').next()?;
    urlencoding::decode(encoded).ok().map(|decoded| decoded.into_owned())
}

fn record_from_entry(key: &str, entry: &Mapping) -> Option<DependencyRecord> {
    let resolution = yaml_str(entry, "resolution").filter(|r| !r.is_empty());

    let name = match resolution.as_deref() {
        Some(resolution) => {
            if is_local_resolution(resolution) {
                return None;
            }
            locator_name(resolution)?.to_string()
        }
        None => {
            let first = key.split(',').next()?.trim();
            if is_local_resolution(first) {
                return None;
            }
            locator_name(first)?.to_string()
        }
    };

    let Some(version) = yaml_str(entry, "version") else {
        tracing::debug!(key, "skipping yarn entry without a version");
        return None;
    };

    Some(
        build_record(LockfileType::YarnBerry, key, &name, &version)?
            .with_integrity(yaml_str(entry, "checksum"))
            .with_resolved(resolution)
            .with_edges(edges(entry)),
    )
}

fn edges(entry: &Mapping) -> DependencyEdges {
    let optional_names = optional_dependency_names(entry);
    let mut dependencies = BTreeMap::new();
    let mut optional_dependencies = BTreeMap::new();

    for (name, range) in yaml_string_map(entry, "dependencies") {
        let range = strip_npm_protocol(&range);
        if optional_names.contains(&name) {
            optional_dependencies.insert(name, range);
        } else {
            dependencies.insert(name, range);
        }
    }

    let peer_dependencies = yaml_string_map(entry, "peerDependencies")
        .into_iter()
        .map(|(name, range)| {
            let range = strip_npm_protocol(&range);
            (name, range)
        })
        .collect();

    DependencyEdges {
        dependencies,
        optional_dependencies,
        peer_dependencies,
    }
}

fn optional_dependency_names(entry: &Mapping) -> Vec<String> {
    let Some(Value::Mapping(meta)) = entry.get("dependenciesMeta") else {
        return Vec::new();
    };
    meta.iter()
        .filter(|(_, flags)| {
            flags
                .get("optional")
                .and_then(Value::as_bool)
                .unwrap_or(false)
        })
        .filter_map(|(name, _)| name.as_str().map(str::to_string))
        .collect()
}

/// `npm:^1.0.0` -> `^1.0.0`; aliases (`npm:real@^1.0.0`) are kept.
fn strip_npm_protocol(range: &str) -> String {
    match range.strip_prefix("npm:") {
        Some(rest) if !rest.get(1..).is_some_and(|tail| tail.contains('@')) => rest.to_string(),
        _ => range.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOCKFILE: &str = r#"# This file is generated by running "yarn install" inside your project.

__metadata:
  version: 8
  cacheKey: 10c0

"@babel/core@npm:^7.23.0":
  version: 7.23.0
  resolution: "@babel/core@npm:7.23.0"
  dependencies:
    "@babel/code-frame": "npm:^7.22.13"
    debug: "npm:^4.1.0"
  checksum: 10c0/abc123
  languageName: node
  linkType: hard

"chokidar@npm:^3.5.3":
  version: 3.5.3
  resolution: "chokidar@npm:3.5.3"
  dependencies:
    anymatch: "npm:~3.1.2"
    fsevents: "npm:~2.3.2"
  dependenciesMeta:
    fsevents:
      optional: true
  peerDependencies:
    typescript: "*"
  languageName: node
  linkType: hard

"string-width-cjs@npm:string-width@^4.2.0, string-width@npm:^4.1.0":
  version: 4.2.3
  resolution: "string-width@npm:4.2.3"
  languageName: node
  linkType: hard

"resolve@patch:resolve@npm%3A^1.22.1#optional!builtin<compat/resolve>":
  version: 1.22.8
  resolution: "resolve@patch:resolve@npm%3A1.22.8#optional!builtin<compat/resolve>::version=1.22.8&hash=c3c19d"
  languageName: node
  linkType: hard

"web@workspace:.":
  version: 0.0.0-use.local
  resolution: "web@workspace:."
  languageName: unknown
  linkType: soft

"shared@portal:../shared::locator=web%40workspace%3A.":
  version: 0.0.0-use.local
  resolution: "shared@portal:../shared::locator=web%40workspace%3A."
  languageName: node
  linkType: soft
"#;

    fn records() -> Vec<DependencyRecord> {
        parse(LOCKFILE).unwrap().collect()
    }

    #[test]
    fn test_parse_lockfile() {
        let mut keys: Vec<String> = records().iter().map(|r| r.key()).collect();
        keys.sort();
        assert_eq!(
            keys,
            vec![
                "@babel/core@7.23.0",
                "chokidar@3.5.3",
                "resolve@1.22.8",
                "string-width@4.2.3"
            ]
        );
    }

    #[test]
    fn test_metadata_and_edges() {
        let records = records();
        let babel = records.iter().find(|r| r.name() == "@babel/core").unwrap();
        assert_eq!(babel.integrity(), Some("10c0/abc123"));
        assert_eq!(babel.resolved(), Some("@babel/core@npm:7.23.0"));
        assert_eq!(babel.edges().dependencies["debug"], "^4.1.0");

        let chokidar = records.iter().find(|r| r.name() == "chokidar").unwrap();
        assert_eq!(chokidar.edges().dependencies.len(), 1);
        assert_eq!(chokidar.edges().optional_dependencies["fsevents"], "~2.3.2");
        assert_eq!(chokidar.edges().peer_dependencies["typescript"], "*");
    }

    #[test]
    fn test_alias_uses_resolution_name() {
        let content = r#"
__metadata:
  version: 6

"alias@npm:real@^1.0.0":
  version: 1.0.0
  resolution: "real@npm:1.0.0"
"#;
        let records: Vec<DependencyRecord> = parse(content).unwrap().collect();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name(), "real");
    }

    #[test]
    fn test_aliases_are_not_deduplicated() {
        let content = r#"
__metadata:
  version: 6

"alias@npm:real@^1.0.0":
  version: 1.0.0
  resolution: "real@npm:1.0.0"

"real@npm:^1.0.0":
  version: 1.0.0
  resolution: "real@npm:1.0.0"
"#;
        let records: Vec<DependencyRecord> = parse(content).unwrap().collect();
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.key() == "real@1.0.0"));
    }

    #[test]
    fn test_missing_resolution_falls_back_to_key() {
        let content = "\"@scope/pkg@npm:^2.0.0, @scope/pkg@npm:^2.1.0\":\n  version: 2.1.0\n";
        let records: Vec<DependencyRecord> = parse(content).unwrap().collect();
        assert_eq!(records[0].name(), "@scope/pkg");
        assert_eq!(records[0].resolved(), None);
    }

    #[test]
    fn test_locator_name_across_protocols() {
        let cases = [
            ("lodash@npm:4.17.21", "lodash"),
            ("@types/node@npm:20.0.0", "@types/node"),
            ("web@workspace:packages/web", "web"),
            ("shared@portal:../shared::locator=web%40workspace%3A.", "shared"),
            ("linked@link:../linked::locator=web%40workspace%3A.", "linked"),
            (
                "resolve@patch:resolve@npm%3A1.22.8#optional!builtin<compat/resolve>",
                "resolve",
            ),
            (
                "@scope/p@patch:@scope/p@npm%3A1.0.0#./patches/p.patch",
                "@scope/p",
            ),
            ("tarball@file:./vendor/t.tgz::locator=web%40workspace%3A.", "tarball"),
            ("gen@exec:./gen.js::locator=web%40workspace%3A.", "gen"),
            (
                "repo@https://github.com/user/repo.git#commit=abc123",
                "repo",
            ),
            ("@scope/git@git+ssh://git@github.com/s/g.git#commit=1", "@scope/git"),
        ];
        for (locator, expected) in cases {
            assert_eq!(locator_name(locator), Some(expected), "{}", locator);
        }
        assert_eq!(locator_name("@"), None);
        assert_eq!(locator_name("noprotocol"), None);
    }

    #[test]
    fn test_local_resolution_protocols() {
        assert!(is_local_resolution("web@workspace:."));
        assert!(is_local_resolution("shared@portal:../shared"));
        assert!(is_local_resolution("linked@link:../linked"));
        assert!(is_local_resolution("tarball@file:./vendor/t.tgz"));
        assert!(is_local_resolution(
            "web@patch:web@workspace%3A.#./patches/web.patch"
        ));
        assert!(!is_local_resolution("lodash@npm:4.17.21"));
        assert!(!is_local_resolution("gen@exec:./gen.js"));
        assert!(!is_local_resolution(
            "resolve@patch:resolve@npm%3A1.22.8#optional!builtin<compat/resolve>"
        ));
        assert!(!is_local_resolution(
            "repo@https://github.com/user/repo.git#commit=abc"
        ));
    }

    #[test]
    fn test_strip_npm_protocol() {
        assert_eq!(strip_npm_protocol("npm:^1.0.0"), "^1.0.0");
        assert_eq!(strip_npm_protocol("npm:real@^1.0.0"), "npm:real@^1.0.0");
        assert_eq!(strip_npm_protocol("npm:@scope/real@1.0.0"), "npm:@scope/real@1.0.0");
        assert_eq!(strip_npm_protocol("workspace:^"), "workspace:^");
    }

    #[test]
    fn test_invalid_yaml_is_parse_error() {
        let err = parse("key: [unclosed").unwrap_err();
        assert!(matches!(err, LockfileError::Parse { .. }));
    }
}
