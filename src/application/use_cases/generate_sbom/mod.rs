use crate::application::dto::{LockfileSummary, SbomRequest, SbomResponse};
use crate::ports::outbound::{AsyncLockfileReader, ManifestReader, ProgressReporter};
use crate::sbom_generation::domain::{
    DependencyCollection, DerivedDependencySet, PackageManifest, ReachabilityOptions,
    RootedDependencySet,
};
use crate::sbom_generation::parsers;
use crate::sbom_generation::services::{PackageFilter, ReachabilityAnalyzer, SbomGenerator};
use crate::shared::error::{LockfileError, SbomError};
use crate::shared::Result;
use futures::future::try_join_all;
use std::collections::BTreeSet;
use std::path::PathBuf;

/// Selected packages together with the manifest names that seeded them
type Selection = (DerivedDependencySet, Option<BTreeSet<String>>);

/// GenerateSbomUseCase - Core use case for SBOM generation
///
/// This use case orchestrates the SBOM generation workflow using
/// generic dependency injection for all infrastructure dependencies:
/// read every lockfile, detect and parse each one, union the sets, narrow
/// them to what a manifest reaches, then drop excluded packages.
///
/// # Type Parameters
/// * `LR` - AsyncLockfileReader implementation
/// * `MR` - ManifestReader implementation
/// * `PR` - ProgressReporter implementation
pub struct GenerateSbomUseCase<LR, MR, PR> {
    lockfile_reader: LR,
    manifest_reader: MR,
    progress_reporter: PR,
}

impl<LR, MR, PR> GenerateSbomUseCase<LR, MR, PR>
where
    LR: AsyncLockfileReader,
    MR: ManifestReader,
    PR: ProgressReporter,
{
    /// Creates a new GenerateSbomUseCase with injected dependencies
    pub fn new(lockfile_reader: LR, manifest_reader: MR, progress_reporter: PR) -> Self {
        Self {
            lockfile_reader,
            manifest_reader,
            progress_reporter,
        }
    }

    /// Executes the SBOM generation use case
    ///
    /// # Arguments
    /// * `request` - Lockfile paths, forced type, exclusions and reachability options
    ///
    /// # Returns
    /// SbomResponse holding the final dependency set and metadata
    ///
    /// # Errors
    /// Detection and document-level parse errors propagate unchanged, as do
    /// read failures. Requesting reachability over several lockfiles is a
    /// usage error.
    pub async fn execute(&self, request: SbomRequest) -> Result<SbomResponse> {
        if request.lockfile_paths.is_empty() {
            return Err(SbomError::Validation {
                message: "at least one lockfile path is required".to_string(),
            }
            .into());
        }
        if request.reachability.is_some() && request.lockfile_paths.len() > 1 {
            return Err(LockfileError::usage(
                "reachability needs exactly one lockfile; the union of several lockfiles \
                 carries no edges to traverse",
            )
            .into());
        }

        // Step 1: Read every lockfile concurrently
        let contents = self.read_lockfiles(&request.lockfile_paths).await?;

        // Step 2: Detect and parse each one into a rooted set
        let (sets, sources) = self.parse_lockfiles(&request, contents)?;

        // Step 3: Union, or narrow to what the manifest reaches
        let (selected, direct_dependencies) = match &request.reachability {
            Some(options) => self.select_reachable(&sets, options)?,
            None => (Self::union_all(&sets), None),
        };

        // Step 4: Apply exclusion filters
        let (dependencies, unmatched_patterns) =
            self.apply_exclusion_filters(selected, &request.exclude_patterns)?;

        Ok(SbomResponse {
            dependencies,
            sources,
            metadata: SbomGenerator::generate_default_metadata(),
            direct_dependencies,
            unmatched_patterns,
        })
    }

    async fn read_lockfiles(&self, paths: &[PathBuf]) -> Result<Vec<String>> {
        self.progress_reporter.report(&format!(
            "📖 Loading {} lockfile(s)...",
            paths.len()
        ));

        try_join_all(
            paths
                .iter()
                .map(|path| self.lockfile_reader.read_lockfile_async(path)),
        )
        .await
    }

    fn parse_lockfiles(
        &self,
        request: &SbomRequest,
        contents: Vec<String>,
    ) -> Result<(Vec<RootedDependencySet>, Vec<LockfileSummary>)> {
        let total = request.lockfile_paths.len();
        let mut sets = Vec::with_capacity(total);
        let mut sources = Vec::with_capacity(total);

        for (index, (path, content)) in request.lockfile_paths.iter().zip(contents).enumerate() {
            let (lockfile_type, records) =
                parsers::parse_with_hint(&content, Some(path.as_path()), request.lockfile_type)?;
            let set = RootedDependencySet::from_records(lockfile_type, records);

            tracing::debug!(
                path = %path.display(),
                %lockfile_type,
                records = set.len(),
                "parsed lockfile"
            );
            self.progress_reporter.report_progress(
                index + 1,
                total,
                Some(&format!("{} ({})", path.display(), lockfile_type)),
            );
            self.progress_reporter.report(&format!(
                "✅ Detected {} package(s) in {} lockfile {}",
                set.len(),
                lockfile_type,
                path.display()
            ));

            sources.push(LockfileSummary {
                path: path.clone(),
                lockfile_type,
                record_count: set.len(),
            });
            sets.push(set);
        }

        Ok((sets, sources))
    }

    /// Unions every set; a single set keeps its lockfile type.
    fn union_all(sets: &[RootedDependencySet]) -> DerivedDependencySet {
        let mut sets = sets.iter();
        let Some(first) = sets.next() else {
            return DerivedDependencySet::default();
        };
        let initial =
            DerivedDependencySet::from_records(Some(first.lockfile_type()), first.values().cloned());
        sets.fold(initial, |acc, set| acc.union(set))
    }

    fn select_reachable(
        &self,
        sets: &[RootedDependencySet],
        options: &ReachabilityOptions,
    ) -> Result<Selection> {
        let [set] = sets else {
            return Err(LockfileError::usage("reachability needs exactly one lockfile").into());
        };

        let manifest_path = options.manifest_location();
        self.progress_reporter.report(&format!(
            "🔍 Resolving dependencies reachable from {}",
            manifest_path.display()
        ));
        let manifest = self.manifest_reader.read_manifest(&manifest_path)?;

        let reachable = set.dependencies_of(&manifest, options)?;
        self.progress_reporter.report(&format!(
            "✅ {} of {} package(s) are reachable",
            reachable.len(),
            set.len()
        ));

        Ok((reachable, Some(ReachabilityAnalyzer::seed_names(&manifest, options))))
    }

    /// Applies exclusion filters to the selected set
    ///
    /// # Errors
    /// Returns an error if a pattern is invalid or every package is excluded
    fn apply_exclusion_filters(
        &self,
        selected: DerivedDependencySet,
        exclude_patterns: &[String],
    ) -> Result<(DerivedDependencySet, Vec<String>)> {
        if exclude_patterns.is_empty() {
            return Ok((selected, Vec::new()));
        }

        let filter = PackageFilter::new(exclude_patterns.to_vec())?;
        let original_count = selected.len();
        let filtered = filter.filter_set(&selected);

        let excluded_count = original_count - filtered.len();
        if excluded_count > 0 {
            self.progress_reporter.report(&format!(
                "🚫 Excluded {} package(s) based on filters",
                excluded_count
            ));
        }

        // Check if all packages were excluded
        if original_count > 0 && filtered.is_empty() {
            anyhow::bail!(
                "All {} package(s) were excluded by the provided filters. \
                     The SBOM would be empty. Please adjust your exclusion patterns.",
                original_count
            );
        }

        // Warn about unmatched patterns
        let unmatched_patterns = filter.get_unmatched_patterns();
        for pattern in &unmatched_patterns {
            self.progress_reporter.report_error(&format!(
                "⚠️  Warning: Exclude pattern '{}' did not match any dependencies.",
                pattern
            ));
        }

        Ok((filtered, unmatched_patterns))
    }
}
