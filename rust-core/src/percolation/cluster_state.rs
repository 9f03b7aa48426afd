use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::PercolationError;
use crate::structure::SiteLabel;

/// Raw cluster id. Ids are allocated from 1 upwards and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClusterId(usize);

impl ClusterId {
    pub fn new(raw: usize) -> Self {
        ClusterId(raw)
    }

    pub fn get(self) -> usize {
        self.0
    }
}

impl fmt::Display for ClusterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A cluster id is either a proper root carrying its size or an alias of
/// another id after a merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClusterEntry {
    Root { size: usize },
    Alias { target: ClusterId },
}

/// Union-find bookkeeping of one Hoshen-Kopelman sweep.
///
/// Invariants:
/// - every alias chain ends in a `Root` within `entries.len()` hops;
/// - the sizes of all roots sum to the number of labeled sites;
/// - `site_cluster` holds the id first handed to a site, which may since have
///   become an alias; resolve it with [`ClusterState::resolve`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClusterState {
    entries: Vec<ClusterEntry>,
    site_cluster: BTreeMap<SiteLabel, ClusterId>,
}

impl ClusterState {
    pub fn new() -> Self {
        ClusterState::default()
    }

    /// Number of ids allocated so far.
    pub fn id_count(&self) -> usize {
        self.entries.len()
    }

    /// Number of labeled sites.
    pub fn len(&self) -> usize {
        self.site_cluster.len()
    }

    pub fn is_empty(&self) -> bool {
        self.site_cluster.is_empty()
    }

    pub fn is_labeled(&self, site: &SiteLabel) -> bool {
        self.site_cluster.contains_key(site)
    }

    /// Id first assigned to `site`, not resolved.
    pub fn raw_cluster(&self, site: &SiteLabel) -> Option<ClusterId> {
        self.site_cluster.get(site).copied()
    }

    pub fn entry(&self, id: ClusterId) -> Result<ClusterEntry, PercolationError> {
        id.get()
            .checked_sub(1)
            .and_then(|index| self.entries.get(index))
            .copied()
            .ok_or(PercolationError::UnknownCluster(id.get()))
    }

    /// Start a singleton cluster for `site`.
    pub fn allocate(&mut self, site: SiteLabel) -> ClusterId {
        self.entries.push(ClusterEntry::Root { size: 1 });
        let id = ClusterId(self.entries.len());
        self.site_cluster.insert(site, id);
        id
    }

    /// Follow aliases from `id` to its proper root.
    pub fn find(&self, id: ClusterId) -> Result<ClusterId, PercolationError> {
        let mut current = id;
        for _ in 0..=self.entries.len() {
            match self.entry(current)? {
                ClusterEntry::Root { .. } => return Ok(current),
                ClusterEntry::Alias { target } => current = target,
            }
        }
        Err(PercolationError::AliasCycle(id.get()))
    }

    /// Proper root of the cluster containing `site`.
    pub fn resolve(&self, site: &SiteLabel) -> Result<ClusterId, PercolationError> {
        let raw = self
            .raw_cluster(site)
            .ok_or(PercolationError::UnlabeledSite(*site))?;
        self.find(raw)
    }

    /// Size of `id` if it is a proper root.
    pub fn root_size(&self, id: ClusterId) -> Option<usize> {
        match self.entry(id) {
            Ok(ClusterEntry::Root { size }) => Some(size),
            _ => None,
        }
    }

    /// Attach `site` to the union of `roots`.
    ///
    /// The numerically smallest root survives; every other root becomes an alias
    /// of it and the survivor's size becomes the sum of all sizes plus one.
    pub fn join(
        &mut self,
        site: SiteLabel,
        roots: &BTreeSet<ClusterId>,
    ) -> Result<ClusterId, PercolationError> {
        let Some(&survivor) = roots.iter().next() else {
            return Ok(self.allocate(site));
        };

        let mut total = 1;
        for &root in roots {
            match self.entry(root)? {
                ClusterEntry::Root { size } => total += size,
                ClusterEntry::Alias { .. } => return Err(PercolationError::NotARoot(root.get())),
            }
        }
        for &root in roots.iter().skip(1) {
            self.entries[root.get() - 1] = ClusterEntry::Alias { target: survivor };
        }
        self.entries[survivor.get() - 1] = ClusterEntry::Root { size: total };
        self.site_cluster.insert(site, survivor);
        Ok(survivor)
    }

    /// Path compression: point every alias and every site directly at its root.
    ///
    /// Returns the number of entries rewritten; zero when the state is already
    /// fully resolved.
    pub fn flatten(&mut self) -> Result<usize, PercolationError> {
        let mut changed = 0;
        for index in 0..self.entries.len() {
            if let ClusterEntry::Alias { target } = self.entries[index] {
                let root = self.find(target)?;
                if root != target {
                    self.entries[index] = ClusterEntry::Alias { target: root };
                    changed += 1;
                }
            }
        }
        let resolved: Vec<(SiteLabel, ClusterId)> = self
            .site_cluster
            .iter()
            .map(|(site, id)| self.find(*id).map(|root| (*site, root)))
            .collect::<Result<_, _>>()?;
        for (site, root) in resolved {
            if let Some(id) = self.site_cluster.get_mut(&site) {
                if *id != root {
                    *id = root;
                    changed += 1;
                }
            }
        }
        Ok(changed)
    }

    /// Proper roots and their sizes, ascending by id.
    pub fn roots(&self) -> impl Iterator<Item = (ClusterId, usize)> + '_ {
        self.entries
            .iter()
            .enumerate()
            .filter_map(|(index, entry)| match entry {
                ClusterEntry::Root { size } => Some((ClusterId(index + 1), *size)),
                ClusterEntry::Alias { .. } => None,
            })
    }

    pub fn cluster_count(&self) -> usize {
        self.roots().count()
    }

    /// Sum of all root sizes; equals [`ClusterState::len`] after a sweep.
    pub fn total_root_size(&self) -> usize {
        self.roots().map(|(_, size)| size).sum()
    }

    /// Labeled sites with their raw ids, in label order.
    pub fn assignments(&self) -> impl Iterator<Item = (&SiteLabel, ClusterId)> {
        self.site_cluster.iter().map(|(site, id)| (site, *id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn site(n: usize) -> SiteLabel {
        SiteLabel::new(0, 0, n, 1)
    }

    fn roots(ids: &[usize]) -> BTreeSet<ClusterId> {
        ids.iter().map(|&id| ClusterId::new(id)).collect()
    }

    #[test]
    fn test_allocate_is_monotonic() {
        let mut state = ClusterState::new();
        assert_eq!(state.allocate(site(0)), ClusterId::new(1));
        assert_eq!(state.allocate(site(1)), ClusterId::new(2));
        assert_eq!(state.root_size(ClusterId::new(2)), Some(1));
        assert_eq!(state.id_count(), 2);
    }

    #[test]
    fn test_join_smallest_id_survives() {
        let mut state = ClusterState::new();
        state.allocate(site(0));
        state.allocate(site(1));
        state.allocate(site(2));

        let survivor = state.join(site(3), &roots(&[3, 2])).unwrap();
        assert_eq!(survivor, ClusterId::new(2));
        assert_eq!(state.root_size(ClusterId::new(2)), Some(3));
        assert_eq!(
            state.entry(ClusterId::new(3)).unwrap(),
            ClusterEntry::Alias {
                target: ClusterId::new(2)
            }
        );
        assert_eq!(state.resolve(&site(2)).unwrap(), ClusterId::new(2));
        assert_eq!(state.total_root_size(), state.len());
    }

    #[test]
    fn test_alias_chain_resolves() {
        let mut state = ClusterState::new();
        for n in 0..3 {
            state.allocate(site(n));
        }
        state.join(site(3), &roots(&[2, 3])).unwrap(); // 3 -> 2
        state.join(site(4), &roots(&[1, 2])).unwrap(); // 2 -> 1
        assert_eq!(state.find(ClusterId::new(3)).unwrap(), ClusterId::new(1));
        assert_eq!(state.resolve(&site(2)).unwrap(), ClusterId::new(1));
        assert_eq!(state.cluster_count(), 1);
        assert_eq!(state.root_size(ClusterId::new(1)), Some(5));
    }

    #[test]
    fn test_join_without_roots_allocates() {
        let mut state = ClusterState::new();
        let id = state.join(site(0), &BTreeSet::new()).unwrap();
        assert_eq!(id, ClusterId::new(1));
        assert_eq!(state.root_size(id), Some(1));
    }

    #[test]
    fn test_join_rejects_alias_roots() {
        let mut state = ClusterState::new();
        state.allocate(site(0));
        state.allocate(site(1));
        state.join(site(2), &roots(&[1, 2])).unwrap();
        assert_eq!(
            state.join(site(3), &roots(&[2])),
            Err(PercolationError::NotARoot(2))
        );
    }

    #[test]
    fn test_flatten_is_idempotent() {
        let mut state = ClusterState::new();
        for n in 0..4 {
            state.allocate(site(n));
        }
        state.join(site(4), &roots(&[3, 4])).unwrap();
        state.join(site(5), &roots(&[2, 3])).unwrap();
        state.join(site(6), &roots(&[1, 2])).unwrap();

        assert!(state.flatten().unwrap() > 0);
        let resolved = state.clone();
        assert_eq!(state.flatten().unwrap(), 0);
        assert_eq!(state, resolved);
        for (label, id) in state.assignments() {
            assert_eq!(state.resolve(label).unwrap(), id);
        }
    }

    #[test]
    fn test_unknown_and_unlabeled() {
        let state = ClusterState::new();
        assert_eq!(
            state.find(ClusterId::new(0)),
            Err(PercolationError::UnknownCluster(0))
        );
        assert_eq!(
            state.resolve(&site(9)),
            Err(PercolationError::UnlabeledSite(site(9)))
        );
    }
}
