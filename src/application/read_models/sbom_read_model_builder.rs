//! Builder for constructing SbomReadModel from domain objects
//!
//! This module provides the builder that transforms the use case response
//! into the query-optimized read model.

use super::component_view::{ComponentView, HashView};
use super::sbom_read_model::{SbomMetadataView, SbomReadModel, SourceView};
use crate::application::dto::SbomResponse;
use crate::sbom_generation::domain::{DependencyCollection, DependencyRecord, SbomMetadata};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use std::collections::BTreeSet;

/// Byte length of a SHA-512 digest, as written in hex in yarn berry checksums
const SHA512_LEN: usize = 64;

/// Builder for constructing SbomReadModel from domain objects
pub struct SbomReadModelBuilder;

impl SbomReadModelBuilder {
    /// Builds the read model for a finished SBOM run
    pub fn build(response: &SbomResponse) -> SbomReadModel {
        SbomReadModel {
            metadata: Self::build_metadata(&response.metadata),
            components: Self::build_components(
                response.dependencies.values(),
                response.direct_dependencies.as_ref(),
            ),
            sources: response
                .sources
                .iter()
                .map(|source| SourceView {
                    path: source.path.display().to_string(),
                    lockfile_type: source.lockfile_type.to_string(),
                    record_count: source.record_count,
                })
                .collect(),
        }
    }

    /// Converts domain metadata to view representation
    fn build_metadata(metadata: &SbomMetadata) -> SbomMetadataView {
        SbomMetadataView {
            timestamp: metadata.timestamp(),
            tool_name: metadata.tool_name().to_string(),
            tool_version: metadata.tool_version().to_string(),
            serial_number: metadata.serial_number(),
        }
    }

    fn build_components<'a>(
        records: impl Iterator<Item = &'a DependencyRecord>,
        direct: Option<&BTreeSet<String>>,
    ) -> Vec<ComponentView> {
        let mut components: Vec<ComponentView> = records
            .map(|record| {
                let integrity = record.integrity().map(str::to_string);
                let hashes = integrity.as_deref().map(decode_integrity).unwrap_or_default();

                ComponentView {
                    bom_ref: record.key(),
                    name: record.name().to_string(),
                    version: record.version().to_string(),
                    purl: purl(record.name(), record.version()),
                    integrity,
                    hashes,
                    resolved: record.resolved().map(str::to_string),
                    link: record.link(),
                    is_direct_dependency: direct.is_some_and(|names| names.contains(record.name())),
                }
            })
            .collect();

        components.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.version.cmp(&b.version)));
        components
    }
}

/// Package URL for an npm package: `pkg:npm/%40scope/name@version`.
pub fn purl(name: &str, version: &str) -> String {
    let (namespace, package) = match name.split_once('/') {
        Some((scope, package)) if scope.starts_with('@') => (Some(scope), package),
        _ => (None, name),
    };

    let mut purl = String::from("pkg:npm/");
    if let Some(namespace) = namespace {
        purl.push_str(&urlencoding::encode(namespace));
        purl.push('/');
    }
    purl.push_str(&urlencoding::encode(package));
    purl.push('@');
    purl.push_str(&urlencoding::encode(version));
    purl
}

/// Decodes an integrity string into hex digests.
///
/// Handles Subresource Integrity values (`sha512-<base64>`, possibly several
/// separated by whitespace) and yarn berry checksums (`<cacheKey>/<hex>`).
/// Unknown algorithms and undecodable values are dropped.
pub fn decode_integrity(integrity: &str) -> Vec<HashView> {
    let mut hashes = Vec::new();

    for token in integrity.split_whitespace() {
        if let Some((algorithm, digest)) = token.split_once('-') {
            let Some(algorithm) = cyclonedx_algorithm(algorithm) else {
                continue;
            };
            let digest = digest.split('?').next().unwrap_or(digest);
            if let Ok(bytes) = BASE64.decode(digest) {
                hashes.push(HashView {
                    algorithm: algorithm.to_string(),
                    content: hex::encode(&bytes),
                });
            }
            continue;
        }

        let digest = token.rsplit('/').next().unwrap_or(token);
        if let Ok(bytes) = hex::decode(digest) {
            if bytes.len() == SHA512_LEN {
                hashes.push(HashView {
                    algorithm: "SHA-512".to_string(),
                    content: hex::encode(&bytes),
                });
            }
        }
    }

    hashes
}

fn cyclonedx_algorithm(sri_algorithm: &str) -> Option<&'static str> {
    match sri_algorithm {
        "sha1" => Some("SHA-1"),
        "sha256" => Some("SHA-256"),
        "sha384" => Some("SHA-384"),
        "sha512" => Some("SHA-512"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::dto::LockfileSummary;
    use crate::sbom_generation::domain::{DerivedDependencySet, LockfileType};
    use chrono::{TimeZone, Utc};
    use std::path::PathBuf;

    fn create_test_metadata() -> SbomMetadata {
        SbomMetadata::new(
            Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap(),
            "lockfile-sbom",
            "0.4.0",
            uuid::Uuid::parse_str("12345678-1234-1234-1234-123456789012").unwrap(),
        )
    }

    fn create_test_response(records: Vec<DependencyRecord>) -> SbomResponse {
        SbomResponse {
            dependencies: DerivedDependencySet::from_records(Some(LockfileType::Npm), records),
            sources: vec![LockfileSummary {
                path: PathBuf::from("package-lock.json"),
                lockfile_type: LockfileType::Npm,
                record_count: 2,
            }],
            metadata: create_test_metadata(),
            direct_dependencies: Some(BTreeSet::from(["react".to_string()])),
            unmatched_patterns: vec![],
        }
    }

    #[test]
    fn test_build_metadata() {
        let view = SbomReadModelBuilder::build_metadata(&create_test_metadata());

        assert_eq!(view.timestamp, "2024-01-15T10:30:00Z");
        assert_eq!(view.tool_name, "lockfile-sbom");
        assert_eq!(
            view.serial_number,
            "urn:uuid:12345678-1234-1234-1234-123456789012"
        );
    }

    #[test]
    fn test_build_components_sorted_with_direct_flag() {
        let response = create_test_response(vec![
            DependencyRecord::new("react", "18.2.0").unwrap(),
            DependencyRecord::new("loose-envify", "1.4.0").unwrap(),
        ]);
        let model = SbomReadModelBuilder::build(&response);

        let names: Vec<&str> = model.components.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["loose-envify", "react"]);
        assert!(!model.components[0].is_direct_dependency);
        assert!(model.components[1].is_direct_dependency);
        assert_eq!(model.components[1].bom_ref, "react@18.2.0");
        assert_eq!(model.sources[0].lockfile_type, "npm");
    }

    #[test]
    fn test_purl() {
        assert_eq!(purl("lodash", "4.17.21"), "pkg:npm/lodash@4.17.21");
        assert_eq!(
            purl("@babel/core", "7.23.0"),
            "pkg:npm/%40babel/core@7.23.0"
        );
        assert_eq!(
            purl("pkg", "1.0.0+build.1"),
            "pkg:npm/pkg@1.0.0%2Bbuild.1"
        );
    }

    #[test]
    fn test_decode_sri_integrity() {
        let hashes = decode_integrity("sha1-AAEC sha512-AP8=");
        assert_eq!(
            hashes,
            vec![
                HashView {
                    algorithm: "SHA-1".to_string(),
                    content: "000102".to_string()
                },
                HashView {
                    algorithm: "SHA-512".to_string(),
                    content: "00ff".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_decode_berry_checksum() {
        let hex = "a".repeat(128);
        let hashes = decode_integrity(&format!("10c0/{}", hex));
        assert_eq!(hashes.len(), 1);
        assert_eq!(hashes[0].algorithm, "SHA-512");
        assert_eq!(hashes[0].content, hex);
    }

    #[test]
    fn test_decode_real_sri_digest() {
        let hashes = decode_integrity(
            "sha512-6FlzubTLZG3J2a/NVCAleEhjzq5oxgHyaCU9yYXvcLsvoVaHJq/s5xXI6/XXP6tz7R9xAOtHnSO/tXtF3WRTlA==",
        );
        assert_eq!(hashes.len(), 1);
        assert_eq!(hashes[0].content.len(), 128);
        assert!(hashes[0].content.starts_with("e85973b9"));
    }

    #[test]
    fn test_decode_berry_checksum_is_lowercased() {
        let upper = "AB".repeat(64);
        let hashes = decode_integrity(&format!("10c0/{}", upper));
        assert_eq!(hashes[0].content, "ab".repeat(64));
    }

    #[test]
    fn test_decode_rejects_unknown_values() {
        assert!(decode_integrity("md5-AAEC").is_empty());
        assert!(decode_integrity("sha512-!!!").is_empty());
        assert!(decode_integrity("10c0/abc123").is_empty());
        assert!(decode_integrity("").is_empty());
    }
}
