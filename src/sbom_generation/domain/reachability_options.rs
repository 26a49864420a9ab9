use std::path::{Path, PathBuf};

/// Manifest file name looked up inside a workspace member.
pub const MANIFEST_FILE_NAME: &str = "package.json";

/// Which declared dependency kinds seed and widen a reachability query.
///
/// `dev`, `optional` and `peer` select the kinds taken from the manifest
/// root. Only production edges propagate past the root unless
/// `transitive_optional` or `transitive_peer` are set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReachabilityOptions {
    pub dev: bool,
    pub peer: bool,
    pub optional: bool,
    pub transitive_optional: bool,
    pub transitive_peer: bool,
    pub workspace_path: Option<PathBuf>,
    pub repo_dir: Option<PathBuf>,
}

impl Default for ReachabilityOptions {
    fn default() -> Self {
        Self {
            dev: false,
            peer: false,
            optional: true,
            transitive_optional: false,
            transitive_peer: false,
            workspace_path: None,
            repo_dir: None,
        }
    }
}

impl ReachabilityOptions {
    pub fn with_dev(mut self, dev: bool) -> Self {
        self.dev = dev;
        self
    }

    pub fn with_peer(mut self, peer: bool) -> Self {
        self.peer = peer;
        self
    }

    pub fn with_optional(mut self, optional: bool) -> Self {
        self.optional = optional;
        self
    }

    pub fn with_transitive_optional(mut self, transitive_optional: bool) -> Self {
        self.transitive_optional = transitive_optional;
        self
    }

    pub fn with_transitive_peer(mut self, transitive_peer: bool) -> Self {
        self.transitive_peer = transitive_peer;
        self
    }

    pub fn with_workspace_path(mut self, workspace_path: impl Into<PathBuf>) -> Self {
        self.workspace_path = Some(workspace_path.into());
        self
    }

    pub fn with_repo_dir(mut self, repo_dir: impl Into<PathBuf>) -> Self {
        self.repo_dir = Some(repo_dir.into());
        self
    }

    /// `repo_dir/workspace_path/package.json`, each part defaulting to the
    /// current directory.
    pub fn manifest_location(&self) -> PathBuf {
        let mut location = self
            .repo_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("."));
        if let Some(workspace) = &self.workspace_path {
            location.push(workspace);
        }
        location.join(MANIFEST_FILE_NAME)
    }

    /// Whether the manifest lives in a monorepo member rather than the root.
    pub fn targets_workspace(&self) -> bool {
        self.workspace_path
            .as_deref()
            .is_some_and(|path| path != Path::new("") && path != Path::new("."))
    }
}
