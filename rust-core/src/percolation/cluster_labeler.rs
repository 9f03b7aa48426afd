use std::collections::BTreeSet;

use log::{debug, trace, warn};

use crate::error::PercolationError;
use crate::percolation::cluster_state::{ClusterId, ClusterState};
use crate::percolation::gate_resolver::GateTable;
use crate::percolation::neighbor_indexer::NeighborList;
use crate::percolation::percolation_filter::{PercolationFilter, PercolationScheme};
use crate::structure::{SiteLabel, SpeciesLookup};

/// Hoshen-Kopelman labeling of target-species sites over a fixed network.
///
/// The neighbour and gate tables come from the reference configuration; the
/// occupancy handed to [`ClusterLabeler::label`] may be a different one.
pub struct ClusterLabeler<'a> {
    neighbors: &'a NeighborList,
    gates: &'a GateTable,
    filter: PercolationFilter<'a>,
}

impl<'a> ClusterLabeler<'a> {
    pub fn new(
        neighbors: &'a NeighborList,
        gates: &'a GateTable,
        scheme: PercolationScheme,
        target_species: &'a str,
    ) -> Self {
        ClusterLabeler {
            neighbors,
            gates,
            filter: PercolationFilter::new(scheme, target_species),
        }
    }

    pub fn filter(&self) -> &PercolationFilter<'a> {
        &self.filter
    }

    /// Neighbours of `site` that hold the target species and whose bond passes
    /// the percolation filter, in neighbour-list order.
    pub fn traversable_neighbors<L>(
        &self,
        site: &SiteLabel,
        occupancy: &L,
    ) -> Result<Vec<SiteLabel>, PercolationError>
    where
        L: SpeciesLookup + ?Sized,
    {
        let target = self.filter.target_species();
        let mut traversable = Vec::new();
        for (position, neighbor) in self.neighbors.neighbors(site).iter().enumerate() {
            if !occupancy.is_species(neighbor, target) {
                continue;
            }
            if self.filter.scheme().requires_gates() {
                let gate = self
                    .gates
                    .get(site, position)
                    .ok_or(PercolationError::MissingGate {
                        site: *site,
                        position,
                    })?;
                if !self.filter.allows(gate, occupancy) {
                    continue;
                }
            }
            traversable.push(*neighbor);
        }
        Ok(traversable)
    }

    /// Sweep `order`, labeling every site that holds the target species.
    ///
    /// A site whose traversable neighbours are all still unlabeled opens a new
    /// cluster; otherwise it joins the union of its labeled neighbours' roots,
    /// with the smallest root id surviving.
    pub fn label<L, I>(&self, occupancy: &L, order: I) -> Result<ClusterState, PercolationError>
    where
        L: SpeciesLookup + ?Sized,
        I: IntoIterator<Item = SiteLabel>,
    {
        let target = self.filter.target_species();
        let mut state = ClusterState::new();

        for site in order {
            if !occupancy.is_species(&site, target) {
                continue;
            }
            if state.is_labeled(&site) {
                warn!("Site {} enumerated twice; keeping its first label", site);
                continue;
            }

            let (visited, unvisited): (Vec<SiteLabel>, Vec<SiteLabel>) = self
                .traversable_neighbors(&site, occupancy)?
                .into_iter()
                .partition(|neighbor| state.is_labeled(neighbor));

            if visited.is_empty() {
                let id = state.allocate(site);
                trace!(
                    "{} opens cluster {} ({} unvisited links)",
                    site,
                    id,
                    unvisited.len()
                );
                continue;
            }

            let roots = visited
                .iter()
                .map(|neighbor| state.resolve(neighbor))
                .collect::<Result<BTreeSet<ClusterId>, PercolationError>>()?;
            let survivor = state.join(site, &roots)?;
            trace!(
                "{} joins cluster {} (merged {} roots)",
                site,
                survivor,
                roots.len()
            );
        }

        debug!(
            "Labeled {} '{}' sites into {} clusters ({} ids allocated, scheme {})",
            state.len(),
            target,
            state.cluster_count(),
            state.id_count(),
            self.filter.scheme()
        );
        Ok(state)
    }
}
