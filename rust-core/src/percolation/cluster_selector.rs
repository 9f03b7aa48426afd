use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::PercolationError;
use crate::percolation::cluster_state::{ClusterId, ClusterState};
use crate::structure::SiteLabel;

/// Size of one proper-root cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterSize {
    pub id: ClusterId,
    pub size: usize,
}

/// The largest cluster and its member sites in label order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LargestCluster {
    pub id: ClusterId,
    pub size: usize,
    pub members: Vec<SiteLabel>,
}

/// Proper roots and their sizes, ascending by id.
pub fn cluster_sizes(state: &ClusterState) -> Vec<ClusterSize> {
    state
        .roots()
        .map(|(id, size)| ClusterSize { id, size })
        .collect()
}

/// Member sites of every cluster, keyed by proper root.
pub fn cluster_partition(
    state: &ClusterState,
) -> Result<BTreeMap<ClusterId, Vec<SiteLabel>>, PercolationError> {
    let mut partition: BTreeMap<ClusterId, Vec<SiteLabel>> = BTreeMap::new();
    for (site, raw) in state.assignments() {
        partition.entry(state.find(raw)?).or_default().push(*site);
    }
    Ok(partition)
}

/// Pick the cluster with the largest size.
///
/// Ties go to the lowest root id (the first one met when scanning ids upwards).
pub fn select_largest_cluster(
    state: &ClusterState,
    species: &str,
) -> Result<LargestCluster, PercolationError> {
    let mut best: Option<(ClusterId, usize)> = None;
    for (id, size) in state.roots() {
        match best {
            Some((_, best_size)) if size <= best_size => {}
            _ => best = Some((id, size)),
        }
    }
    let (id, size) = best.ok_or_else(|| PercolationError::NoClusters {
        species: species.to_string(),
    })?;

    let mut members = Vec::with_capacity(size);
    for (site, raw) in state.assignments() {
        if state.find(raw)? == id {
            members.push(*site);
        }
    }

    Ok(LargestCluster { id, size, members })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn site(n: usize) -> SiteLabel {
        SiteLabel::new(n, 0, 0, 1)
    }

    #[test]
    fn test_empty_state_has_no_clusters() {
        let state = ClusterState::new();
        assert_eq!(
            select_largest_cluster(&state, "Li"),
            Err(PercolationError::NoClusters {
                species: "Li".to_string()
            })
        );
    }

    #[test]
    fn test_tie_goes_to_lowest_id() {
        let mut state = ClusterState::new();
        let first = state.allocate(site(0));
        state.join(site(1), &BTreeSet::from([first])).unwrap();
        let second = state.allocate(site(2));
        state.join(site(3), &BTreeSet::from([second])).unwrap();

        let largest = select_largest_cluster(&state, "Li").unwrap();
        assert_eq!(largest.id, first);
        assert_eq!(largest.size, 2);
        assert_eq!(largest.members, vec![site(0), site(1)]);
    }

    #[test]
    fn test_members_follow_aliases() {
        let mut state = ClusterState::new();
        let a = state.allocate(site(0));
        let b = state.allocate(site(1));
        state.allocate(site(5));
        state.join(site(2), &BTreeSet::from([a, b])).unwrap();

        let largest = select_largest_cluster(&state, "Li").unwrap();
        assert_eq!(largest.id, a);
        assert_eq!(largest.members, vec![site(0), site(1), site(2)]);

        let sizes = cluster_sizes(&state);
        assert_eq!(
            sizes,
            vec![
                ClusterSize { id: a, size: 3 },
                ClusterSize {
                    id: ClusterId::new(3),
                    size: 1
                },
            ]
        );

        let partition = cluster_partition(&state).unwrap();
        assert_eq!(partition.len(), 2);
        assert_eq!(partition[&a].len(), 3);
    }
}
