use clap::Parser;
use std::path::PathBuf;

use crate::application::dto::OutputFormat;
use crate::sbom_generation::domain::LockfileType;

/// Generate SBOMs from npm, pnpm and yarn lockfiles
#[derive(Parser, Debug)]
#[command(name = "lockfile-sbom")]
#[command(version)]
#[command(
    about = "Generate SBOMs from npm, pnpm and yarn lockfiles",
    long_about = "Reads package-lock.json, pnpm-lock.yaml or yarn.lock files, detects their \
                  format from content, and writes a CycloneDX, Markdown or plain record list. \
                  Several lockfiles are merged into one inventory."
)]
pub struct Args {
    /// Lockfiles to read (defaults to the first lockfile found in the current directory)
    #[arg(value_name = "LOCKFILE")]
    pub lockfiles: Vec<PathBuf>,

    /// Force a lockfile type instead of detecting it: npm, pnpm, yarn-classic or yarn-berry
    #[arg(short = 't', long = "type", value_name = "TYPE")]
    pub lockfile_type: Option<LockfileType>,

    /// Output format: json, markdown or records [default: json]
    #[arg(short, long)]
    pub format: Option<OutputFormat>,

    /// Output file path (if not specified, outputs to stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Exclude packages matching patterns (supports wildcards: *)
    /// Can be specified multiple times: -e "@types/*" -e "eslint-*"
    #[arg(short, long = "exclude", value_name = "PATTERN")]
    pub exclude: Vec<String>,

    /// Keep only packages reachable from the project manifest (package.json)
    #[arg(short, long)]
    pub reachable: bool,

    /// Repository root holding the manifest; implies --reachable
    #[arg(long, value_name = "DIR")]
    pub manifest_dir: Option<PathBuf>,

    /// Workspace member path below the manifest directory; implies --reachable
    #[arg(short, long, value_name = "PATH")]
    pub workspace: Option<PathBuf>,

    /// Seed reachability with devDependencies
    #[arg(long)]
    pub dev: bool,

    /// Seed reachability with peerDependencies
    #[arg(long)]
    pub peer: bool,

    /// Do not seed reachability with optionalDependencies
    #[arg(long)]
    pub no_optional: bool,

    /// Follow optional edges of installed packages, not just the manifest's
    #[arg(long)]
    pub transitive_optional: bool,

    /// Follow peer edges of installed packages, not just the manifest's
    #[arg(long)]
    pub transitive_peer: bool,

    /// Path to a config file (defaults to ./lockfile-sbom.config.yml if present)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Suppress progress output on stderr
    #[arg(short, long)]
    pub quiet: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Args {
    /// Parses process arguments, leaving help/version/error exits to the caller.
    pub fn try_parse_args() -> Result<Self, clap::Error> {
        Self::try_parse()
    }

    /// Whether any flag asked for a reachability query.
    pub fn wants_reachability(&self) -> bool {
        self.reachable || self.manifest_dir.is_some() || self.workspace.is_some()
    }
}
