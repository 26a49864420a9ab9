use crate::application::read_models::{ComponentView, SbomMetadataView, SbomReadModel};
use crate::ports::outbound::SbomFormatter;
use crate::shared::Result;
use serde::Serialize;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Bom {
    bom_format: &'static str,
    spec_version: &'static str,
    version: u32,
    serial_number: String,
    metadata: Metadata,
    components: Vec<Component>,
}

#[derive(Debug, Serialize)]
struct Metadata {
    timestamp: String,
    tools: Tools,
}

#[derive(Debug, Serialize)]
struct Tools {
    components: Vec<Tool>,
}

#[derive(Debug, Serialize)]
struct Tool {
    #[serde(rename = "type")]
    component_type: &'static str,
    name: String,
    version: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Component {
    #[serde(rename = "type")]
    component_type: &'static str,
    #[serde(rename = "bom-ref")]
    bom_ref: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    group: Option<String>,
    name: String,
    version: String,
    purl: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    hashes: Vec<Hash>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    external_references: Vec<ExternalReference>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    properties: Vec<Property>,
}

#[derive(Debug, Serialize)]
struct Hash {
    alg: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct ExternalReference {
    #[serde(rename = "type")]
    reference_type: &'static str,
    url: String,
}

#[derive(Debug, Serialize)]
struct Property {
    name: &'static str,
    value: String,
}

/// CycloneDxFormatter adapter for generating CycloneDX 1.6 JSON format
///
/// This adapter implements the SbomFormatter port for CycloneDX format.
pub struct CycloneDxFormatter;

impl CycloneDxFormatter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CycloneDxFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl SbomFormatter for CycloneDxFormatter {
    fn format(&self, model: &SbomReadModel) -> Result<String> {
        let bom = Bom {
            bom_format: "CycloneDX",
            spec_version: "1.6",
            version: 1,
            serial_number: model.metadata.serial_number.clone(),
            metadata: self.build_metadata(&model.metadata),
            components: self.build_components(&model.components),
        };

        serde_json::to_string_pretty(&bom).map_err(Into::into)
    }
}

impl CycloneDxFormatter {
    fn build_metadata(&self, metadata: &SbomMetadataView) -> Metadata {
        Metadata {
            timestamp: metadata.timestamp.clone(),
            tools: Tools {
                components: vec![Tool {
                    component_type: "application",
                    name: metadata.tool_name.clone(),
                    version: metadata.tool_version.clone(),
                }],
            },
        }
    }

    fn build_components(&self, components: &[ComponentView]) -> Vec<Component> {
        components.iter().map(|c| self.build_component(c)).collect()
    }

    /// Scoped packages put their scope in `group`, as CycloneDX expects for npm.
    fn build_component(&self, component: &ComponentView) -> Component {
        let (group, name) = match component.name.split_once('/') {
            Some((scope, name)) if scope.starts_with('@') => {
                (Some(scope.to_string()), name.to_string())
            }
            _ => (None, component.name.clone()),
        };

        let external_references = component
            .resolved
            .iter()
            .filter(|url| url.contains("://"))
            .map(|url| ExternalReference {
                reference_type: "distribution",
                url: url.clone(),
            })
            .collect();

        let mut properties = Vec::new();
        if component.is_direct_dependency {
            properties.push(Property {
                name: "lockfile-sbom:direct",
                value: "true".to_string(),
            });
        }

        Component {
            component_type: "library",
            bom_ref: component.bom_ref.clone(),
            group,
            name,
            version: component.version.clone(),
            purl: component.purl.clone(),
            hashes: component
                .hashes
                .iter()
                .map(|hash| Hash {
                    alg: hash.algorithm.clone(),
                    content: hash.content.clone(),
                })
                .collect(),
            external_references,
            properties,
        }
    }
}
