use super::version_range::{resolve_alias, select_installed};
use crate::sbom_generation::domain::{
    DependencyCollection, DependencyRecord, DerivedDependencySet, PackageManifest,
    ReachabilityOptions, RootedDependencySet,
};
use crate::shared::error::LockfileError;
use std::collections::{BTreeMap, BTreeSet, HashSet, VecDeque};

/// ReachabilityAnalyzer service for computing transitive dependency closures
///
/// This service contains pure business logic over a rooted dependency set.
/// It has no I/O dependencies; loading the manifest is the caller's job.
pub struct ReachabilityAnalyzer;

impl ReachabilityAnalyzer {
    /// Computes the packages transitively required by `manifest`.
    ///
    /// The frontier is seeded from the manifest's `dependencies`, plus
    /// `devDependencies`, `optionalDependencies` and `peerDependencies` as
    /// selected by `options`. Each requirement is resolved to an installed
    /// record and expanded through that record's production edges (and
    /// optional or peer edges when the transitive flags ask for them).
    /// Visited `name@version` keys guard against cycles.
    pub fn dependencies_of(
        set: &RootedDependencySet,
        manifest: &PackageManifest,
        options: &ReachabilityOptions,
    ) -> Result<DerivedDependencySet, LockfileError> {
        let by_name = Self::index_by_name(set);
        let mut frontier: VecDeque<(String, String)> = Self::seeds(manifest, options).collect();
        let mut visited: HashSet<String> = HashSet::new();

        while let Some((name, requirement)) = frontier.pop_front() {
            let (real_name, range) = resolve_alias(&name, &requirement);

            // Yarn classic keys aliased packages by their alias name.
            let Some(candidates) = by_name
                .get(real_name)
                .or_else(|| by_name.get(name.as_str()))
            else {
                tracing::debug!(%name, %requirement, "requirement not installed in lockfile");
                continue;
            };
            let Some(record) = select_installed(range, candidates) else {
                continue;
            };
            if !visited.insert(record.key()) {
                continue;
            }

            let edges = record.edges();
            frontier.extend(
                edges
                    .dependencies
                    .iter()
                    .map(|(dep, req)| (dep.clone(), req.clone())),
            );
            if options.transitive_optional {
                frontier.extend(
                    edges
                        .optional_dependencies
                        .iter()
                        .map(|(dep, req)| (dep.clone(), req.clone())),
                );
            }
            if options.transitive_peer {
                frontier.extend(
                    edges
                        .peer_dependencies
                        .iter()
                        .map(|(dep, req)| (dep.clone(), req.clone())),
                );
            }
        }

        tracing::debug!(
            reachable = visited.len(),
            total = set.len(),
            "reachability traversal finished"
        );

        let reached = set
            .values()
            .filter(|record| visited.contains(&record.key()))
            .cloned();
        Ok(DerivedDependencySet::from_records(
            Some(set.lockfile_type()),
            reached,
        ))
    }

    /// Runs the traversal on any collection, rejecting sets without edges.
    ///
    /// # Errors
    /// Returns `LockfileError::Usage` for sets produced by algebra or by a
    /// previous traversal.
    pub fn dependencies_of_collection(
        set: &dyn DependencyCollection,
        manifest: &PackageManifest,
        options: &ReachabilityOptions,
    ) -> Result<DerivedDependencySet, LockfileError> {
        let rooted = set.as_rooted().ok_or_else(|| {
            LockfileError::usage(
                "dependencies_of requires a set loaded directly from a lockfile; \
                 sets produced by union, intersection, difference or filtering carry no edges",
            )
        })?;
        Self::dependencies_of(rooted, manifest, options)
    }

    fn index_by_name(set: &RootedDependencySet) -> BTreeMap<&str, Vec<&DependencyRecord>> {
        let mut by_name: BTreeMap<&str, Vec<&DependencyRecord>> = BTreeMap::new();
        for record in set.values() {
            by_name.entry(record.name()).or_default().push(record);
        }
        by_name
    }

    /// Manifest names that seed a traversal under `options`.
    pub fn seed_names(manifest: &PackageManifest, options: &ReachabilityOptions) -> BTreeSet<String> {
        Self::seeds(manifest, options).map(|(name, _)| name).collect()
    }

    fn seeds<'m>(
        manifest: &'m PackageManifest,
        options: &ReachabilityOptions,
    ) -> impl Iterator<Item = (String, String)> + 'm {
        let dev = options.dev.then_some(&manifest.dev_dependencies);
        let optional = options.optional.then_some(&manifest.optional_dependencies);
        let peer = options.peer.then_some(&manifest.peer_dependencies);

        std::iter::once(&manifest.dependencies)
            .chain(dev)
            .chain(optional)
            .chain(peer)
            .flat_map(|declared| declared.iter())
            .map(|(name, range)| (name.clone(), range.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sbom_generation::domain::{DependencyEdges, LockfileType};

    fn record(name: &str, version: &str, deps: &[(&str, &str)]) -> DependencyRecord {
        let mut edges = DependencyEdges::default();
        for (dep, req) in deps {
            edges.dependencies.insert(dep.to_string(), req.to_string());
        }
        DependencyRecord::new(name, version).unwrap().with_edges(edges)
    }

    fn keys(set: &DerivedDependencySet) -> Vec<String> {
        set.keys().cloned().collect()
    }

    fn sample_set() -> RootedDependencySet {
        let mut react = record("react", "18.2.0", &[("loose-envify", "^1.1.0")]);
        react
            .edges_mut()
            .peer_dependencies
            .insert("scheduler".into(), "^0.23.0".into());
        let mut chokidar = record("chokidar", "3.5.3", &[("anymatch", "~3.1.2")]);
        chokidar
            .edges_mut()
            .optional_dependencies
            .insert("fsevents".into(), "~2.3.2".into());

        RootedDependencySet::from_records(
            LockfileType::Npm,
            vec![
                react,
                record("loose-envify", "1.4.0", &[("js-tokens", "^3.0.0 || ^4.0.0")]),
                record("js-tokens", "4.0.0", &[]),
                record("scheduler", "0.23.0", &[("loose-envify", "^1.1.0")]),
                record("typescript", "5.2.2", &[]),
                record("fsevents", "2.3.3", &[]),
                chokidar,
                record("anymatch", "3.1.3", &[]),
                record("unused", "1.0.0", &[]),
            ],
        )
    }

    fn manifest() -> PackageManifest {
        PackageManifest::default()
            .with_dependency("react", "^18.2.0")
            .with_dev_dependency("typescript", "~5.2.0")
            .with_optional_dependency("fsevents", "^2.3.2")
            .with_peer_dependency("chokidar", "^3.5.0")
    }

    #[test]
    fn test_production_closure_with_default_options() {
        let set = sample_set();
        let result =
            ReachabilityAnalyzer::dependencies_of(&set, &manifest(), &ReachabilityOptions::default())
                .unwrap();

        assert_eq!(
            keys(&result),
            vec!["fsevents@2.3.3", "js-tokens@4.0.0", "loose-envify@1.4.0", "react@18.2.0"]
        );
        assert!(!result.can_traverse());
        assert_eq!(result.lockfile_type(), Some(LockfileType::Npm));
    }

    #[test]
    fn test_dev_and_peer_flags_add_roots() {
        let set = sample_set();
        let options = ReachabilityOptions::default().with_dev(true).with_peer(true);
        let result = ReachabilityAnalyzer::dependencies_of(&set, &manifest(), &options).unwrap();

        assert!(result.contains("typescript@5.2.2"));
        assert!(result.contains("chokidar@3.5.3"));
        assert!(result.contains("anymatch@3.1.3"));
        assert!(!result.contains("unused@1.0.0"));
    }

    #[test]
    fn test_transitive_kinds_are_opt_in() {
        let set = sample_set();
        let default = ReachabilityAnalyzer::dependencies_of(
            &set,
            &manifest(),
            &ReachabilityOptions::default(),
        )
        .unwrap();
        assert!(!default.contains("scheduler@0.23.0"));

        let widened = ReachabilityAnalyzer::dependencies_of(
            &set,
            &manifest(),
            &ReachabilityOptions::default().with_transitive_peer(true),
        )
        .unwrap();
        assert!(widened.contains("scheduler@0.23.0"));
        assert!(widened.is_superset_of(&default));
    }

    #[test]
    fn test_flags_are_monotonic() {
        let set = sample_set();
        let manifest = manifest();
        let base = ReachabilityOptions::default().with_optional(false);
        let narrow = ReachabilityAnalyzer::dependencies_of(&set, &manifest, &base).unwrap();

        for widened in [
            base.clone().with_dev(true),
            base.clone().with_peer(true),
            base.clone().with_optional(true),
        ] {
            let wide = ReachabilityAnalyzer::dependencies_of(&set, &manifest, &widened).unwrap();
            assert!(wide.is_superset_of(&narrow));
        }
    }

    #[test]
    fn test_idempotent() {
        let set = sample_set();
        let options = ReachabilityOptions::default().with_dev(true);
        let first = ReachabilityAnalyzer::dependencies_of(&set, &manifest(), &options).unwrap();
        let second = ReachabilityAnalyzer::dependencies_of(&set, &manifest(), &options).unwrap();
        assert_eq!(keys(&first), keys(&second));
    }

    #[test]
    fn test_cycles_terminate() {
        let set = RootedDependencySet::from_records(
            LockfileType::YarnClassic,
            vec![
                record("a", "1.0.0", &[("b", "^1.0.0")]),
                record("b", "1.0.0", &[("a", "^1.0.0")]),
            ],
        );
        let manifest = PackageManifest::default().with_dependency("a", "^1.0.0");
        let result =
            ReachabilityAnalyzer::dependencies_of(&set, &manifest, &ReachabilityOptions::default())
                .unwrap();
        assert_eq!(keys(&result), vec!["a@1.0.0", "b@1.0.0"]);
    }

    #[test]
    fn test_resolves_between_installed_versions() {
        let set = RootedDependencySet::from_records(
            LockfileType::Npm,
            vec![
                record("app-dep", "1.0.0", &[("debug", "^2.6.0")]),
                record("debug", "2.6.9", &[("ms", "2.0.0")]),
                record("debug", "4.3.4", &[("ms", "2.1.2")]),
                record("ms", "2.0.0", &[]),
                record("ms", "2.1.2", &[]),
            ],
        );
        let manifest = PackageManifest::default().with_dependency("app-dep", "1.0.0");
        let result =
            ReachabilityAnalyzer::dependencies_of(&set, &manifest, &ReachabilityOptions::default())
                .unwrap();
        assert_eq!(
            keys(&result),
            vec!["app-dep@1.0.0", "debug@2.6.9", "ms@2.0.0"]
        );
    }

    #[test]
    fn test_alias_requirement_resolves_real_package() {
        let set = RootedDependencySet::from_records(
            LockfileType::Npm,
            vec![
                record("string-width", "4.2.3", &[]),
                record("string-width", "5.1.2", &[]),
            ],
        );
        let manifest =
            PackageManifest::default().with_dependency("string-width-cjs", "npm:string-width@^4.2.0");
        let result =
            ReachabilityAnalyzer::dependencies_of(&set, &manifest, &ReachabilityOptions::default())
                .unwrap();
        assert_eq!(keys(&result), vec!["string-width@4.2.3"]);
    }

    #[test]
    fn test_alias_falls_back_to_declared_name() {
        let set = RootedDependencySet::from_records(
            LockfileType::YarnClassic,
            vec![record("string-width-cjs", "4.2.3", &[])],
        );
        let manifest =
            PackageManifest::default().with_dependency("string-width-cjs", "npm:string-width@^4.2.0");
        let result =
            ReachabilityAnalyzer::dependencies_of(&set, &manifest, &ReachabilityOptions::default())
                .unwrap();
        assert_eq!(keys(&result), vec!["string-width-cjs@4.2.3"]);
    }

    #[test]
    fn test_collection_entry_point_rejects_derived_sets() {
        let set = sample_set();
        let derived = set.union(&set);
        let err = ReachabilityAnalyzer::dependencies_of_collection(
            &derived,
            &manifest(),
            &ReachabilityOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, LockfileError::Usage { .. }));

        let ok = ReachabilityAnalyzer::dependencies_of_collection(
            &set,
            &manifest(),
            &ReachabilityOptions::default(),
        );
        assert!(ok.is_ok());
    }

    #[test]
    fn test_missing_requirements_are_skipped() {
        let set = sample_set();
        let manifest = PackageManifest::default()
            .with_dependency("not-installed", "^1.0.0")
            .with_dependency("workspace-lib", "workspace:*");
        let result =
            ReachabilityAnalyzer::dependencies_of(&set, &manifest, &ReachabilityOptions::default())
                .unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn test_seed_names_follow_section_flags() {
        let names = |options: ReachabilityOptions| -> Vec<String> {
            ReachabilityAnalyzer::seed_names(&manifest(), &options)
                .into_iter()
                .collect()
        };

        assert_eq!(names(ReachabilityOptions::default()), vec!["fsevents", "react"]);
        assert_eq!(
            names(ReachabilityOptions::default().with_optional(false)),
            vec!["react"]
        );
        assert_eq!(
            names(ReachabilityOptions::default().with_dev(true).with_peer(true)),
            vec!["chokidar", "fsevents", "react", "typescript"]
        );
    }
}
