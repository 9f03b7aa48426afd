use std::collections::{BTreeMap, BTreeSet};

use log::debug;
#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::config::BondWindow;
use crate::structure::{Configuration, LatticeMetric, Site, SiteLabel};

/// Bonded neighbours of every candidate site.
///
/// Each list keeps discovery order over the label-ordered candidate scan; gate
/// positions index into these lists, so the order is part of the contract.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NeighborList {
    neighbors: BTreeMap<SiteLabel, Vec<SiteLabel>>,
}

impl NeighborList {
    pub fn new() -> Self {
        NeighborList::default()
    }

    /// Build from pre-computed lists, keeping each list's order as given.
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (SiteLabel, Vec<SiteLabel>)>,
    {
        NeighborList {
            neighbors: entries.into_iter().collect(),
        }
    }

    pub fn insert(&mut self, site: SiteLabel, neighbors: Vec<SiteLabel>) {
        self.neighbors.insert(site, neighbors);
    }

    /// Neighbours of `site`; empty when the site is not a candidate.
    pub fn neighbors(&self, site: &SiteLabel) -> &[SiteLabel] {
        self.neighbors.get(site).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains_site(&self, site: &SiteLabel) -> bool {
        self.neighbors.contains_key(site)
    }

    /// Position of `neighbor` within the list of `site`.
    pub fn position(&self, site: &SiteLabel, neighbor: &SiteLabel) -> Option<usize> {
        self.neighbors(site).iter().position(|n| n == neighbor)
    }

    /// Sites with a list, in label order.
    pub fn sites(&self) -> impl Iterator<Item = &SiteLabel> {
        self.neighbors.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&SiteLabel, &[SiteLabel])> {
        self.neighbors.iter().map(|(site, list)| (site, list.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.neighbors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.neighbors.is_empty()
    }

    /// Number of directed edges.
    pub fn edge_count(&self) -> usize {
        self.neighbors.values().map(Vec::len).sum()
    }
}

/// Find, for every candidate site, all other candidates within the bond window.
///
/// O(n²) over candidates. With the `parallel` feature the outer scan is split
/// across rayon workers; each inner scan stays sequential so order is unchanged.
pub fn build_neighbor_list(
    configuration: &Configuration,
    excluded_species: &BTreeSet<String>,
    window: &BondWindow,
) -> NeighborList {
    let metric = configuration.metric();
    let candidates: Vec<(&SiteLabel, &Site)> =
        configuration.candidate_sites(excluded_species).collect();

    let scan = |(label, site): &(&SiteLabel, &Site)| -> (SiteLabel, Vec<SiteLabel>) {
        (**label, neighbors_of(label, site, &candidates, &metric, window))
    };

    #[cfg(feature = "parallel")]
    let entries: Vec<(SiteLabel, Vec<SiteLabel>)> = candidates.par_iter().map(scan).collect();
    #[cfg(not(feature = "parallel"))]
    let entries: Vec<(SiteLabel, Vec<SiteLabel>)> = candidates.iter().map(scan).collect();

    let list = NeighborList::from_entries(entries);
    debug!(
        "Neighbour list: {} candidate sites, {} directed edges in [{:.3}, {:.3}]",
        list.len(),
        list.edge_count(),
        window.r_min,
        window.r_max
    );
    list
}

fn neighbors_of(
    label: &SiteLabel,
    site: &Site,
    candidates: &[(&SiteLabel, &Site)],
    metric: &LatticeMetric,
    window: &BondWindow,
) -> Vec<SiteLabel> {
    candidates
        .iter()
        .filter(|(other_label, _)| *other_label != label)
        .filter(|(_, other)| {
            window.contains(metric.distance(&site.internal_coord, &other.internal_coord))
        })
        .map(|(other_label, _)| **other_label)
        .collect()
}
