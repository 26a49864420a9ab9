use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The lockfile ecosystems the parsers understand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LockfileType {
    /// `package-lock.json` / `npm-shrinkwrap.json`
    Npm,
    /// `pnpm-lock.yaml` (all eras, see [`PnpmEra`])
    Pnpm,
    /// Yarn v1 `yarn.lock`
    YarnClassic,
    /// Yarn v2+ `yarn.lock` (YAML with a `__metadata` block)
    YarnBerry,
}

impl LockfileType {
    pub const ALL: [LockfileType; 4] = [
        LockfileType::Npm,
        LockfileType::Pnpm,
        LockfileType::YarnClassic,
        LockfileType::YarnBerry,
    ];

    /// File names tried, in order, when no lockfile path is given.
    pub const FILE_NAMES: [&'static str; 5] = [
        "package-lock.json",
        "npm-shrinkwrap.json",
        "pnpm-lock.yaml",
        "yarn.lock",
        "shrinkwrap.yaml",
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            LockfileType::Npm => "npm",
            LockfileType::Pnpm => "pnpm",
            LockfileType::YarnClassic => "yarn-classic",
            LockfileType::YarnBerry => "yarn-berry",
        }
    }

    /// Guesses the type from a lockfile's file name.
    ///
    /// Only a hint: a bare `yarn.lock` name cannot tell classic from berry, so
    /// it maps to classic by convention.
    pub fn from_file_name(file_name: &str) -> Option<Self> {
        match file_name {
            "package-lock.json" | "npm-shrinkwrap.json" => Some(LockfileType::Npm),
            "pnpm-lock.yaml" | "shrinkwrap.yaml" => Some(LockfileType::Pnpm),
            "yarn.lock" => Some(LockfileType::YarnClassic),
            _ => None,
        }
    }
}

impl fmt::Display for LockfileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LockfileType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "npm" => Ok(LockfileType::Npm),
            "pnpm" => Ok(LockfileType::Pnpm),
            "yarn-classic" | "yarn1" | "yarn-v1" => Ok(LockfileType::YarnClassic),
            "yarn-berry" | "yarn2" | "yarn-v2" => Ok(LockfileType::YarnBerry),
            _ => Err(format!(
                "Invalid lockfile type: {}. Please specify 'npm', 'pnpm', 'yarn-classic' or 'yarn-berry'",
                s
            )),
        }
    }
}

/// On-disk grammar generations of `pnpm-lock.yaml`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PnpmEra {
    /// `shrinkwrap.yaml` with `shrinkwrapVersion` (pre-2019)
    Shrinkwrap,
    /// `lockfileVersion` 5.x and earlier numeric versions
    V5,
    /// The experimental `5.4-inlineSpecifiers` string version
    V5Inline,
    /// `lockfileVersion: '6.x'`
    V6,
    /// `lockfileVersion: '9.x'`
    V9,
}

impl PnpmEra {
    /// Keys separate name and version with `@` rather than `/`.
    pub fn uses_at_separator(self) -> bool {
        matches!(self, PnpmEra::V6 | PnpmEra::V9)
    }

    /// Peer variants are written as `(peer@version)` suffixes.
    pub fn uses_paren_peer_suffix(self) -> bool {
        matches!(self, PnpmEra::V6 | PnpmEra::V9)
    }

    /// Package keys begin with `/`.
    pub fn has_leading_slash(self) -> bool {
        !matches!(self, PnpmEra::V9)
    }

    /// Resolution metadata (`packages`) and dependency edges (`snapshots`)
    /// live in separate maps.
    pub fn splits_snapshots(self) -> bool {
        matches!(self, PnpmEra::V9)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PnpmEra::Shrinkwrap => "shrinkwrap",
            PnpmEra::V5 => "v5",
            PnpmEra::V5Inline => "v5-inline",
            PnpmEra::V6 => "v6",
            PnpmEra::V9 => "v9",
        }
    }
}

impl fmt::Display for PnpmEra {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
