use chrono::{DateTime, SecondsFormat, Utc};
use uuid::Uuid;

/// Provenance of one generated SBOM: when, by what, and under which serial.
///
/// Values are kept typed; the string forms used by output formats are
/// produced on demand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SbomMetadata {
    created_at: DateTime<Utc>,
    tool_name: String,
    tool_version: String,
    serial: Uuid,
}

impl SbomMetadata {
    pub fn new(
        created_at: DateTime<Utc>,
        tool_name: impl Into<String>,
        tool_version: impl Into<String>,
        serial: Uuid,
    ) -> Self {
        Self {
            created_at,
            tool_name: tool_name.into(),
            tool_version: tool_version.into(),
            serial,
        }
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// RFC 3339 creation time in UTC, second precision (`2024-01-15T10:30:00Z`).
    pub fn timestamp(&self) -> String {
        self.created_at.to_rfc3339_opts(SecondsFormat::Secs, true)
    }

    pub fn tool_name(&self) -> &str {
        &self.tool_name
    }

    pub fn tool_version(&self) -> &str {
        &self.tool_version
    }

    pub fn serial(&self) -> Uuid {
        self.serial
    }

    /// Serial in CycloneDX URN form.
    pub fn serial_number(&self) -> String {
        self.serial.urn().to_string()
    }
}
