use super::{DependencyRecord, LockfileType, PackageManifest, ReachabilityOptions};
use crate::sbom_generation::services::ReachabilityAnalyzer;
use crate::shared::error::LockfileError;
use std::collections::btree_map::{self, BTreeMap};

/// Read-only view shared by every dependency set, keyed by `name@version`.
///
/// Set algebra is available on any collection and always produces a
/// [`DerivedDependencySet`]. Reachability is only offered by
/// [`RootedDependencySet`], which is the one variant that still carries the
/// lockfile's edge metadata.
pub trait DependencyCollection {
    fn entries(&self) -> &BTreeMap<String, DependencyRecord>;

    /// Lockfile type the records came from, if a single one applies.
    fn lockfile_type(&self) -> Option<LockfileType>;

    /// Whether `dependencies_of` may be called on this set.
    fn can_traverse(&self) -> bool;

    fn len(&self) -> usize {
        self.entries().len()
    }

    fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    fn contains(&self, key: &str) -> bool {
        self.entries().contains_key(key)
    }

    fn contains_package(&self, name: &str, version: &str) -> bool {
        self.contains(&format!("{}@{}", name, version))
    }

    fn get(&self, key: &str) -> Option<&DependencyRecord> {
        self.entries().get(key)
    }

    fn keys(&self) -> btree_map::Keys<'_, String, DependencyRecord> {
        self.entries().keys()
    }

    fn values(&self) -> btree_map::Values<'_, String, DependencyRecord> {
        self.entries().values()
    }

    fn iter(&self) -> btree_map::Iter<'_, String, DependencyRecord> {
        self.entries().iter()
    }

    /// Records in key order.
    fn to_vec(&self) -> Vec<DependencyRecord> {
        self.values().cloned().collect()
    }

    /// Every key of either set; the right-hand record wins on shared keys.
    fn union(&self, other: &dyn DependencyCollection) -> DerivedDependencySet {
        let mut records = strip_edges(self.entries());
        for (key, record) in other.entries() {
            records.insert(key.clone(), record.without_edges());
        }
        DerivedDependencySet::new(combined_type(self.lockfile_type(), other), records)
    }

    /// Keys present in both sets, with the left-hand records.
    fn intersection(&self, other: &dyn DependencyCollection) -> DerivedDependencySet {
        let records = self
            .entries()
            .iter()
            .filter(|(key, _)| other.contains(key))
            .map(|(key, record)| (key.clone(), record.without_edges()))
            .collect();
        DerivedDependencySet::new(combined_type(self.lockfile_type(), other), records)
    }

    /// Keys of this set that the other set lacks.
    fn difference(&self, other: &dyn DependencyCollection) -> DerivedDependencySet {
        let records = self
            .entries()
            .iter()
            .filter(|(key, _)| !other.contains(key))
            .map(|(key, record)| (key.clone(), record.without_edges()))
            .collect();
        DerivedDependencySet::new(combined_type(self.lockfile_type(), other), records)
    }

    fn is_subset_of(&self, other: &dyn DependencyCollection) -> bool {
        self.len() <= other.len() && self.keys().all(|key| other.contains(key))
    }

    fn is_superset_of(&self, other: &dyn DependencyCollection) -> bool {
        other.is_subset_of(self.as_collection())
    }

    fn is_disjoint_from(&self, other: &dyn DependencyCollection) -> bool {
        let (small, large) = if self.len() <= other.len() {
            (self.as_collection(), other)
        } else {
            (other, self.as_collection())
        };
        small.keys().all(|key| !large.contains(key))
    }

    /// Upcast helper so default methods can pass `self` as a trait object.
    fn as_collection(&self) -> &dyn DependencyCollection;

    /// The edge-carrying view of this set, if it has one.
    fn as_rooted(&self) -> Option<&RootedDependencySet> {
        None
    }
}

fn strip_edges(records: &BTreeMap<String, DependencyRecord>) -> BTreeMap<String, DependencyRecord> {
    records
        .iter()
        .map(|(key, record)| (key.clone(), record.without_edges()))
        .collect()
}

fn combined_type(
    left: Option<LockfileType>,
    right: &dyn DependencyCollection,
) -> Option<LockfileType> {
    match (left, right.lockfile_type()) {
        (Some(left), Some(right)) if left == right => Some(left),
        _ => None,
    }
}

/// A set built directly from one parsed lockfile.
///
/// Records keep their edges, so this is the only set kind that can answer
/// reachability queries.
#[derive(Debug, Clone)]
pub struct RootedDependencySet {
    lockfile_type: LockfileType,
    records: BTreeMap<String, DependencyRecord>,
}

impl RootedDependencySet {
    /// Collects parser output; a repeated `name@version` keeps the last record.
    pub fn from_records<I>(lockfile_type: LockfileType, records: I) -> Self
    where
        I: IntoIterator<Item = DependencyRecord>,
    {
        let records = records
            .into_iter()
            .map(|record| (record.key(), record))
            .collect();
        Self {
            lockfile_type,
            records,
        }
    }

    pub fn lockfile_type(&self) -> LockfileType {
        self.lockfile_type
    }

    /// Packages transitively required by `manifest`, resolved against this
    /// lockfile's recorded edges.
    ///
    /// # Errors
    /// Returns `LockfileError::Usage` when the manifest cannot seed a
    /// traversal.
    pub fn dependencies_of(
        &self,
        manifest: &PackageManifest,
        options: &ReachabilityOptions,
    ) -> Result<DerivedDependencySet, LockfileError> {
        ReachabilityAnalyzer::dependencies_of(self, manifest, options)
    }
}

impl DependencyCollection for RootedDependencySet {
    fn entries(&self) -> &BTreeMap<String, DependencyRecord> {
        &self.records
    }

    fn lockfile_type(&self) -> Option<LockfileType> {
        Some(self.lockfile_type)
    }

    fn can_traverse(&self) -> bool {
        true
    }

    fn as_collection(&self) -> &dyn DependencyCollection {
        self
    }

    fn as_rooted(&self) -> Option<&RootedDependencySet> {
        Some(self)
    }
}

impl<'a> IntoIterator for &'a RootedDependencySet {
    type Item = (&'a String, &'a DependencyRecord);
    type IntoIter = btree_map::Iter<'a, String, DependencyRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// A set produced by algebra or traversal; membership only, no edges.
#[derive(Debug, Clone, Default)]
pub struct DerivedDependencySet {
    lockfile_type: Option<LockfileType>,
    records: BTreeMap<String, DependencyRecord>,
}

impl DerivedDependencySet {
    pub(crate) fn new(
        lockfile_type: Option<LockfileType>,
        records: BTreeMap<String, DependencyRecord>,
    ) -> Self {
        Self {
            lockfile_type,
            records,
        }
    }

    /// Builds a derived set from loose records, e.g. after filtering.
    pub fn from_records<I>(lockfile_type: Option<LockfileType>, records: I) -> Self
    where
        I: IntoIterator<Item = DependencyRecord>,
    {
        let records = records
            .into_iter()
            .map(|record| (record.key(), record.without_edges()))
            .collect();
        Self::new(lockfile_type, records)
    }
}

impl DependencyCollection for DerivedDependencySet {
    fn entries(&self) -> &BTreeMap<String, DependencyRecord> {
        &self.records
    }

    fn lockfile_type(&self) -> Option<LockfileType> {
        self.lockfile_type
    }

    fn can_traverse(&self) -> bool {
        false
    }

    fn as_collection(&self) -> &dyn DependencyCollection {
        self
    }
}

impl<'a> IntoIterator for &'a DerivedDependencySet {
    type Item = (&'a String, &'a DependencyRecord);
    type IntoIter = btree_map::Iter<'a, String, DependencyRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
