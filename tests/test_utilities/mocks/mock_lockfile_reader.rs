use lockfile_sbom::prelude::*;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Mock lockfile reader serving in-memory contents by path
#[derive(Default)]
pub struct MockLockfileReader {
    pub files: HashMap<PathBuf, String>,
    pub should_fail: bool,
}

impl MockLockfileReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, path: &str, content: &str) -> Self {
        self.files.insert(PathBuf::from(path), content.to_string());
        self
    }

    pub fn with_failure() -> Self {
        Self {
            files: HashMap::new(),
            should_fail: true,
        }
    }
}

impl LockfileReader for MockLockfileReader {
    fn read_lockfile(&self, path: &Path) -> Result<String> {
        if self.should_fail {
            anyhow::bail!("Mock lockfile read failure");
        }
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("Mock lockfile not found: {}", path.display()))
    }
}

#[async_trait::async_trait]
impl AsyncLockfileReader for MockLockfileReader {
    async fn read_lockfile_async(&self, path: &Path) -> Result<String> {
        self.read_lockfile(path)
    }
}
