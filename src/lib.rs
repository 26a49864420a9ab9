//! lockfile-sbom - SBOM generation from JavaScript lockfiles
//!
//! This library reads `package-lock.json`, `pnpm-lock.yaml` (every era from
//! `shrinkwrap.yaml` to lockfile v9) and both `yarn.lock` grammars, detects
//! the format from content, and turns the installed packages into dependency
//! sets that support set algebra and manifest reachability.
//!
//! # Architecture
//!
//! The library is organized into the following layers:
//!
//! - **Domain Layer** (`sbom_generation`): Records, sets, detection and parsers
//! - **Application Layer** (`application`): Use cases, DTOs and read models
//! - **Ports** (`ports`): Interface definitions for infrastructure
//! - **Adapters** (`adapters`): Concrete implementations of ports
//! - **Shared** (`shared`): Common utilities and error types
//! - **Facade** (`lockfile`): One-call detection, parsing and set loading
//!
//! # Example
//!
//! ```no_run
//! use lockfile_sbom::prelude::*;
//! use std::path::PathBuf;
//!
//! # fn main() -> Result<()> {
//! // Create use case with injected adapters
//! let use_case = GenerateSbomUseCase::new(
//!     FileSystemReader::new(),
//!     FileSystemReader::new(),
//!     StderrProgressReporter::new(),
//! );
//!
//! // Execute
//! let request = SbomRequest::new(vec![PathBuf::from("pnpm-lock.yaml")]);
//! let runtime = tokio::runtime::Runtime::new()?;
//! let response = runtime.block_on(use_case.execute(request))?;
//!
//! // Format output
//! let model = SbomReadModelBuilder::build(&response);
//! let output = CycloneDxFormatter::new().format(&model)?;
//! println!("{}", output);
//! # Ok(())
//! # }
//! ```

pub mod adapters;
pub mod application;
pub mod cli;
pub mod config;
pub mod lockfile;
pub mod logging;
pub mod ports;
pub mod sbom_generation;
pub mod shared;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::adapters::outbound::console::StderrProgressReporter;
    pub use crate::adapters::outbound::filesystem::{
        FileSystemReader, FileSystemWriter, StdoutPresenter,
    };
    pub use crate::adapters::outbound::formatters::{
        CycloneDxFormatter, MarkdownFormatter, RecordsFormatter,
    };
    pub use crate::application::dto::{OutputFormat, SbomRequest, SbomResponse};
    pub use crate::application::read_models::{SbomReadModel, SbomReadModelBuilder};
    pub use crate::application::use_cases::GenerateSbomUseCase;
    pub use crate::lockfile::{
        dependencies_of_workspace, dependency_set_from_content, detect, load_dependency_set,
        parse_from_content, parse_from_path, parse_from_path_async, ParseHint,
    };
    pub use crate::ports::outbound::{
        AsyncLockfileReader, LockfileReader, ManifestReader, OutputPresenter, ProgressReporter,
        SbomFormatter,
    };
    pub use crate::sbom_generation::domain::{
        DependencyCollection, DependencyEdges, DependencyRecord, DerivedDependencySet,
        LockfileType, PackageManifest, PnpmEra, ReachabilityOptions, RootedDependencySet,
        SbomMetadata,
    };
    pub use crate::sbom_generation::parsers::DependencyRecords;
    pub use crate::sbom_generation::services::{PackageFilter, ReachabilityAnalyzer, SbomGenerator};
    pub use crate::shared::error::{ExitCode, LockfileError, SbomError};
    pub use crate::shared::Result;
}
