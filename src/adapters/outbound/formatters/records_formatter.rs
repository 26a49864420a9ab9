use crate::application::read_models::{ComponentView, SbomReadModel};
use crate::ports::outbound::SbomFormatter;
use crate::shared::Result;
use serde::Serialize;

/// The stable record shape: `{ name, version, integrity?, resolved?, link? }`.
#[derive(Debug, Serialize)]
struct Record<'a> {
    name: &'a str,
    version: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    integrity: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    resolved: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    link: Option<bool>,
}

impl<'a> From<&'a ComponentView> for Record<'a> {
    fn from(component: &'a ComponentView) -> Self {
        Self {
            name: &component.name,
            version: &component.version,
            integrity: component.integrity.as_deref(),
            resolved: component.resolved.as_deref(),
            link: component.link,
        }
    }
}

/// RecordsFormatter adapter emitting the dependency records as a JSON array
///
/// Values are copied verbatim from the lockfile; nothing is decoded or
/// normalized.
pub struct RecordsFormatter;

impl RecordsFormatter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RecordsFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl SbomFormatter for RecordsFormatter {
    fn format(&self, model: &SbomReadModel) -> Result<String> {
        let records: Vec<Record<'_>> = model.components.iter().map(Record::from).collect();
        let mut output = serde_json::to_string_pretty(&records)?;
        output.push('\n');
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::read_models::SbomMetadataView;
    use serde_json::{json, Value};

    #[test]
    fn test_records_shape() {
        let model = SbomReadModel {
            metadata: SbomMetadataView {
                timestamp: String::new(),
                tool_name: String::new(),
                tool_version: String::new(),
                serial_number: String::new(),
            },
            components: vec![ComponentView {
                bom_ref: "react@18.2.0".to_string(),
                name: "react".to_string(),
                version: "18.2.0".to_string(),
                purl: "pkg:npm/react@18.2.0".to_string(),
                integrity: Some("sha512-abc".to_string()),
                hashes: vec![],
                resolved: None,
                link: None,
                is_direct_dependency: true,
            }],
            sources: vec![],
        };

        let output = RecordsFormatter::new().format(&model).unwrap();
        let value: Value = serde_json::from_str(&output).unwrap();
        assert_eq!(
            value,
            json!([{"name": "react", "version": "18.2.0", "integrity": "sha512-abc"}])
        );
    }
}
