//! Configuration file support for lockfile-sbom.
//!
//! Provides YAML-based configuration through `lockfile-sbom.config.yml`
//! files, including data structures, file loading, validation, and merging
//! with command-line flags.

use anyhow::{bail, Context};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::application::dto::OutputFormat;
use crate::cli::Args;
use crate::sbom_generation::domain::{LockfileType, ReachabilityOptions};
use crate::shared::security::validate_regular_file;
use crate::shared::Result;

pub const CONFIG_FILENAME: &str = "lockfile-sbom.config.yml";

/// Top-level configuration file schema.
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFile {
    pub format: Option<String>,
    pub exclude_packages: Option<Vec<String>>,
    pub lockfile_type: Option<String>,
    pub dev: Option<bool>,
    pub peer: Option<bool>,
    pub optional: Option<bool>,
    pub workspace: Option<PathBuf>,
    /// Captures unknown fields for warnings.
    #[serde(flatten)]
    pub unknown_fields: HashMap<String, serde_yaml_ng::Value>,
}

/// Load config from an explicit path. Returns an error if the file is not found.
pub fn load_config_from_path(path: &Path) -> Result<ConfigFile> {
    validate_regular_file(path, "config file")?;

    let content = std::fs::read_to_string(path).with_context(|| {
        format!(
            "Failed to read config file: {}\n\n💡 Hint: Check that the file exists and is readable.",
            path.display()
        )
    })?;

    let config: ConfigFile = serde_yaml_ng::from_str(&content).with_context(|| {
        format!(
            "Failed to parse config file: {}\n\n💡 Hint: Ensure the file contains valid YAML syntax.",
            path.display()
        )
    })?;

    validate_config(&config)?;
    warn_unknown_fields(&config);

    Ok(config)
}

/// Auto-discover config in a directory. Returns `None` silently if not found.
pub fn discover_config(dir: &Path) -> Result<Option<ConfigFile>> {
    let config_path = dir.join(CONFIG_FILENAME);

    if !config_path.exists() {
        return Ok(None);
    }

    let config = load_config_from_path(&config_path)?;
    Ok(Some(config))
}

/// Validate the loaded configuration.
fn validate_config(config: &ConfigFile) -> Result<()> {
    if let Some(ref patterns) = config.exclude_packages {
        for (i, pattern) in patterns.iter().enumerate() {
            if pattern.trim().is_empty() {
                bail!(
                    "Invalid config: exclude_packages[{}] must not be empty.\n\n\
                     💡 Hint: Each entry is a package name or a wildcard pattern such as \"@types/*\".",
                    i
                );
            }
        }
    }

    if let Some(ref format) = config.format {
        format
            .parse::<OutputFormat>()
            .map_err(|e| anyhow::anyhow!("Invalid config: format: {}", e))?;
    }

    if let Some(ref lockfile_type) = config.lockfile_type {
        lockfile_type
            .parse::<LockfileType>()
            .map_err(|e| anyhow::anyhow!("Invalid config: lockfile_type: {}", e))?;
    }

    Ok(())
}

/// Warn about unknown fields in the config file.
fn warn_unknown_fields(config: &ConfigFile) {
    for key in config.unknown_fields.keys() {
        tracing::warn!("Unknown config field '{}' will be ignored.", key);
    }
}

/// Effective options after merging flags over the config file.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub lockfile_type: Option<LockfileType>,
    pub format: OutputFormat,
    pub output: Option<PathBuf>,
    pub exclude_patterns: Vec<String>,
    pub reachability: Option<ReachabilityOptions>,
}

/// Merges command-line flags over an optional config file.
///
/// Precedence is CLI flag, then config file, then built-in default.
/// A workspace in the config file turns reachability on just like
/// `--workspace` does.
pub fn resolve_settings(args: &Args, config: Option<&ConfigFile>) -> Result<Settings> {
    let default_config = ConfigFile::default();
    let config = config.unwrap_or(&default_config);

    let format = match (args.format, config.format.as_deref()) {
        (Some(format), _) => format,
        (None, Some(format)) => format.parse().map_err(anyhow::Error::msg)?,
        (None, None) => OutputFormat::default(),
    };

    let lockfile_type = match (args.lockfile_type, config.lockfile_type.as_deref()) {
        (Some(lockfile_type), _) => Some(lockfile_type),
        (None, Some(lockfile_type)) => Some(lockfile_type.parse().map_err(anyhow::Error::msg)?),
        (None, None) => None,
    };

    let exclude_patterns = if args.exclude.is_empty() {
        config.exclude_packages.clone().unwrap_or_default()
    } else {
        args.exclude.clone()
    };

    let workspace = args.workspace.clone().or_else(|| config.workspace.clone());
    let reachability = (args.wants_reachability() || workspace.is_some()).then(|| {
        let mut options = ReachabilityOptions::default()
            .with_dev(args.dev || config.dev.unwrap_or(false))
            .with_peer(args.peer || config.peer.unwrap_or(false))
            .with_optional(!args.no_optional && config.optional.unwrap_or(true))
            .with_transitive_optional(args.transitive_optional)
            .with_transitive_peer(args.transitive_peer);
        if let Some(workspace) = workspace {
            options = options.with_workspace_path(workspace);
        }
        if let Some(dir) = &args.manifest_dir {
            options = options.with_repo_dir(dir);
        }
        options
    });

    Ok(Settings {
        lockfile_type,
        format,
        output: args.output.clone(),
        exclude_patterns,
        reachability,
    })
}
