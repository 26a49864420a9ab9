use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Maximum length for package names (npm registry limit)
const MAX_PACKAGE_NAME_LENGTH: usize = 214;

/// Maximum length for package versions (security limit)
const MAX_VERSION_LENGTH: usize = 256;

/// Reference prefixes that point at code inside the repository rather than
/// at an external package.
const LOCAL_PROTOCOLS: [&str; 4] = ["file:", "link:", "portal:", "workspace:"];

/// Returns true when a resolution, version or key refers to local code.
pub fn is_local_reference(reference: &str) -> bool {
    let reference = reference.trim_start_matches('"');
    LOCAL_PROTOCOLS
        .iter()
        .any(|protocol| reference.starts_with(protocol))
}

/// Declared requirements of one package, as recorded in the lockfile.
///
/// Each map goes from the depended-on package name to the requirement the
/// lockfile stores for it: a range for npm and yarn, an exact resolved
/// version for pnpm.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyEdges {
    pub dependencies: BTreeMap<String, String>,
    pub optional_dependencies: BTreeMap<String, String>,
    pub peer_dependencies: BTreeMap<String, String>,
}

impl DependencyEdges {
    pub fn is_empty(&self) -> bool {
        self.dependencies.is_empty()
            && self.optional_dependencies.is_empty()
            && self.peer_dependencies.is_empty()
    }

    /// Adds the other edges; existing entries are kept on conflict.
    pub fn merge(&mut self, other: DependencyEdges) {
        for (name, req) in other.dependencies {
            self.dependencies.entry(name).or_insert(req);
        }
        for (name, req) in other.optional_dependencies {
            self.optional_dependencies.entry(name).or_insert(req);
        }
        for (name, req) in other.peer_dependencies {
            self.peer_dependencies.entry(name).or_insert(req);
        }
    }
}

/// A resolved third-party package identity extracted from a lockfile.
///
/// Serializes to the stable record shape
/// `{ name, version, integrity?, resolved?, link? }`; edges are internal to
/// reachability and never serialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyRecord {
    name: String,
    version: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    integrity: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    resolved: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    link: Option<bool>,
    #[serde(skip)]
    edges: DependencyEdges,
}

/// Why a candidate record was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidRecord {
    #[error("package name cannot be empty")]
    EmptyName,
    #[error("package version cannot be empty")]
    EmptyVersion,
    #[error("package name is too long ({0} bytes, maximum {MAX_PACKAGE_NAME_LENGTH})")]
    NameTooLong(usize),
    #[error("package version is too long ({0} bytes, maximum {MAX_VERSION_LENGTH})")]
    VersionTooLong(usize),
    #[error("name or version contains whitespace or control characters")]
    ControlCharacters,
}

impl DependencyRecord {
    /// Creates a record, rejecting identities that cannot be yielded.
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
    ) -> Result<Self, InvalidRecord> {
        let name = name.into();
        let version = version.into();

        if name.is_empty() {
            return Err(InvalidRecord::EmptyName);
        }
        if version.is_empty() {
            return Err(InvalidRecord::EmptyVersion);
        }
        if name.len() > MAX_PACKAGE_NAME_LENGTH {
            return Err(InvalidRecord::NameTooLong(name.len()));
        }
        if version.len() > MAX_VERSION_LENGTH {
            return Err(InvalidRecord::VersionTooLong(version.len()));
        }
        if name
            .chars()
            .chain(version.chars())
            .any(|c| c.is_control() || c.is_whitespace())
        {
            return Err(InvalidRecord::ControlCharacters);
        }

        Ok(Self {
            name,
            version,
            integrity: None,
            resolved: None,
            link: None,
            edges: DependencyEdges::default(),
        })
    }

    pub fn with_integrity(mut self, integrity: Option<String>) -> Self {
        self.integrity = integrity.filter(|value| !value.is_empty());
        self
    }

    pub fn with_resolved(mut self, resolved: Option<String>) -> Self {
        self.resolved = resolved.filter(|value| !value.is_empty());
        self
    }

    pub fn with_link(mut self, link: Option<bool>) -> Self {
        self.link = link;
        self
    }

    pub fn with_edges(mut self, edges: DependencyEdges) -> Self {
        self.edges = edges;
        self
    }

    /// The identity key `name@version` used by dependency sets.
    pub fn key(&self) -> String {
        format!("{}@{}", self.name, self.version)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn integrity(&self) -> Option<&str> {
        self.integrity.as_deref()
    }

    pub fn resolved(&self) -> Option<&str> {
        self.resolved.as_deref()
    }

    pub fn link(&self) -> Option<bool> {
        self.link
    }

    pub fn edges(&self) -> &DependencyEdges {
        &self.edges
    }

    pub(crate) fn edges_mut(&mut self) -> &mut DependencyEdges {
        &mut self.edges
    }

    /// Copy of the record with edge metadata dropped.
    pub fn without_edges(&self) -> Self {
        Self {
            edges: DependencyEdges::default(),
            ..self.clone()
        }
    }
}

impl fmt::Display for DependencyRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.name, self.version)
    }
}
