use crate::shared::error::LockfileError;
use serde::Deserialize;
use std::collections::BTreeMap;

/// The dependency-declaring subset of a `package.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageManifest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub dependencies: BTreeMap<String, String>,
    #[serde(default)]
    pub dev_dependencies: BTreeMap<String, String>,
    #[serde(default)]
    pub optional_dependencies: BTreeMap<String, String>,
    #[serde(default)]
    pub peer_dependencies: BTreeMap<String, String>,
}

impl PackageManifest {
    /// Parses a `package.json` document.
    ///
    /// # Errors
    /// Returns `LockfileError::Usage` when the input is not a JSON object or
    /// one of the dependency fields is not a `name -> range` map.
    pub fn from_json(content: &str) -> Result<Self, LockfileError> {
        let value: serde_json::Value = serde_json::from_str(content)
            .map_err(|e| LockfileError::usage(format!("manifest is not valid JSON: {}", e)))?;

        if !value.is_object() {
            return Err(LockfileError::usage(
                "manifest must be a JSON object with dependency fields",
            ));
        }

        serde_json::from_value(value)
            .map_err(|e| LockfileError::usage(format!("manifest has malformed fields: {}", e)))
    }

    pub fn with_dependency(mut self, name: &str, range: &str) -> Self {
        self.dependencies.insert(name.to_string(), range.to_string());
        self
    }

    pub fn with_dev_dependency(mut self, name: &str, range: &str) -> Self {
        self.dev_dependencies
            .insert(name.to_string(), range.to_string());
        self
    }

    pub fn with_optional_dependency(mut self, name: &str, range: &str) -> Self {
        self.optional_dependencies
            .insert(name.to_string(), range.to_string());
        self
    }

    pub fn with_peer_dependency(mut self, name: &str, range: &str) -> Self {
        self.peer_dependencies
            .insert(name.to_string(), range.to_string());
        self
    }
}
