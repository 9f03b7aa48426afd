use std::collections::BTreeMap;

use log::debug;
#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::config::BondWindow;
use crate::error::PercolationError;
use crate::percolation::neighbor_indexer::NeighborList;
use crate::structure::{Configuration, LatticeMetric, SiteLabel};

/// The four neighbours shared by two bonded sites.
///
/// `members[0..2]` is the near sub-pair (anchor plus its only in-window partner),
/// `members[2..4]` the far sub-pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Gate {
    members: [SiteLabel; 4],
}

impl Gate {
    pub fn new(members: [SiteLabel; 4]) -> Self {
        Gate { members }
    }

    pub fn members(&self) -> &[SiteLabel; 4] {
        &self.members
    }

    pub fn near_pair(&self) -> (SiteLabel, SiteLabel) {
        (self.members[0], self.members[1])
    }

    pub fn far_pair(&self) -> (SiteLabel, SiteLabel) {
        (self.members[2], self.members[3])
    }
}

/// Gates keyed by `(site, neighbour position)`, parallel to a [`NeighborList`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GateTable {
    gates: BTreeMap<SiteLabel, Vec<Gate>>,
}

impl GateTable {
    pub fn new() -> Self {
        GateTable::default()
    }

    /// Gates of `site`, one per entry of its neighbour list.
    pub fn insert(&mut self, site: SiteLabel, gates: Vec<Gate>) {
        self.gates.insert(site, gates);
    }

    pub fn get(&self, site: &SiteLabel, position: usize) -> Option<&Gate> {
        self.gates.get(site).and_then(|gates| gates.get(position))
    }

    pub fn gates_of(&self, site: &SiteLabel) -> &[Gate] {
        self.gates.get(site).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Total number of gates (one per directed edge).
    pub fn len(&self) -> usize {
        self.gates.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl FromIterator<(SiteLabel, Vec<Gate>)> for GateTable {
    fn from_iter<I: IntoIterator<Item = (SiteLabel, Vec<Gate>)>>(iter: I) -> Self {
        GateTable {
            gates: iter.into_iter().collect(),
        }
    }
}

/// Resolve the gate of the edge `site -> neighbors[site][position]`.
///
/// Shared neighbours are taken in the order they appear in the list of `site`.
/// The first is the anchor; exactly one of the remaining three must lie within
/// the bond window of the anchor.
pub fn resolve_gate(
    neighbors: &NeighborList,
    configuration: &Configuration,
    metric: &LatticeMetric,
    window: &BondWindow,
    site: &SiteLabel,
    position: usize,
) -> Result<Gate, PercolationError> {
    let site_neighbors = neighbors.neighbors(site);
    let neighbor = site_neighbors
        .get(position)
        .ok_or(PercolationError::MissingGate {
            site: *site,
            position,
        })?;
    let neighbor_neighbors = neighbors.neighbors(neighbor);

    let common: Vec<SiteLabel> = site_neighbors
        .iter()
        .filter(|candidate| neighbor_neighbors.contains(candidate))
        .copied()
        .collect();
    if common.len() != 4 {
        return Err(PercolationError::GateSize {
            site: *site,
            neighbor: *neighbor,
            found: common.len(),
        });
    }

    let coord = |label: &SiteLabel| {
        configuration
            .site(label)
            .map(|s| s.internal_coord)
            .ok_or(PercolationError::UnknownSite(*label))
    };
    let anchor = common[0];
    let anchor_coord = coord(&anchor)?;

    let mut near = Vec::with_capacity(1);
    let mut far = Vec::with_capacity(2);
    for partner in &common[1..] {
        if window.contains(metric.distance(&anchor_coord, &coord(partner)?)) {
            near.push(*partner);
        } else {
            far.push(*partner);
        }
    }
    if near.len() != 1 {
        return Err(PercolationError::AmbiguousGate {
            site: *site,
            neighbor: *neighbor,
            near_found: near.len(),
        });
    }

    Ok(Gate::new([anchor, near[0], far[0], far[1]]))
}

/// Resolve every gate of the network; the first structural fault aborts.
pub fn resolve_gates(
    neighbors: &NeighborList,
    configuration: &Configuration,
    window: &BondWindow,
) -> Result<GateTable, PercolationError> {
    let metric = configuration.metric();
    let sites: Vec<&SiteLabel> = neighbors.sites().collect();

    let resolve_site = |site: &&SiteLabel| -> Result<(SiteLabel, Vec<Gate>), PercolationError> {
        let gates = (0..neighbors.neighbors(site).len())
            .map(|position| resolve_gate(neighbors, configuration, &metric, window, site, position))
            .collect::<Result<Vec<Gate>, PercolationError>>()?;
        Ok((**site, gates))
    };

    #[cfg(feature = "parallel")]
    let entries = sites
        .par_iter()
        .map(resolve_site)
        .collect::<Result<Vec<_>, PercolationError>>()?;
    #[cfg(not(feature = "parallel"))]
    let entries = sites
        .iter()
        .map(resolve_site)
        .collect::<Result<Vec<_>, PercolationError>>()?;

    let table: GateTable = entries.into_iter().collect();
    debug!("Resolved {} gates over {} sites", table.len(), sites.len());
    Ok(table)
}
