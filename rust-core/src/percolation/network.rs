use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::config::PercolationConfig;
use crate::error::PercolationError;
use crate::percolation::cluster_labeler::ClusterLabeler;
use crate::percolation::cluster_selector::{
    cluster_sizes, select_largest_cluster, ClusterSize, LargestCluster,
};
use crate::percolation::cluster_state::ClusterState;
use crate::percolation::gate_resolver::{resolve_gates, GateTable};
use crate::percolation::neighbor_indexer::{build_neighbor_list, NeighborList};
use crate::percolation::percolation_filter::PercolationScheme;
use crate::structure::{lattice_enumeration, Configuration, SiteLabel, SiteRecord, SpeciesLookup};

/// Outcome of one percolation analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PercolationReport {
    pub scheme: PercolationScheme,
    pub target_species: String,
    /// Target-species sites visited by the sweep.
    pub target_site_count: usize,
    pub cluster_count: usize,
    pub cluster_sizes: Vec<ClusterSize>,
    pub largest: LargestCluster,
}

impl PercolationReport {
    /// Share of target-species sites that belong to the largest cluster.
    pub fn percolating_fraction(&self) -> f64 {
        if self.target_site_count == 0 {
            return 0.0;
        }
        self.largest.size as f64 / self.target_site_count as f64
    }

    /// Site records of the largest cluster, in label order, as stored in `target`.
    pub fn largest_cluster_records(&self, target: &Configuration) -> Vec<SiteRecord> {
        self.largest
            .members
            .iter()
            .filter_map(|label| {
                target
                    .site(label)
                    .map(|site| SiteRecord::new(*label, site.clone()))
            })
            .collect()
    }
}

/// Neighbour and gate tables of a reference configuration, ready to cluster
/// any number of target occupancies on the same supercell.
#[derive(Debug, Clone, PartialEq)]
pub struct PercolationNetwork {
    neighbors: NeighborList,
    gates: GateTable,
    supercell: [usize; 3],
}

impl PercolationNetwork {
    /// Build the neighbour list and resolve all gates of `reference`.
    pub fn from_reference(
        reference: &Configuration,
        config: &PercolationConfig,
    ) -> Result<Self, PercolationError> {
        config.validate()?;
        let neighbors =
            build_neighbor_list(reference, &config.excluded_species, &config.bond_window);
        let gates = resolve_gates(&neighbors, reference, &config.bond_window)?;
        info!(
            "Network built: {} candidate sites, {} edges, {} gates",
            neighbors.len(),
            neighbors.edge_count(),
            gates.len()
        );
        Ok(PercolationNetwork {
            neighbors,
            gates,
            supercell: reference.supercell(),
        })
    }

    /// Assemble a network from pre-computed tables.
    pub fn from_parts(neighbors: NeighborList, gates: GateTable, supercell: [usize; 3]) -> Self {
        PercolationNetwork {
            neighbors,
            gates,
            supercell,
        }
    }

    pub fn neighbors(&self) -> &NeighborList {
        &self.neighbors
    }

    pub fn gates(&self) -> &GateTable {
        &self.gates
    }

    pub fn supercell(&self) -> [usize; 3] {
        self.supercell
    }

    /// Default sweep order over every lattice position of the supercell.
    pub fn enumeration(&self) -> impl Iterator<Item = SiteLabel> {
        lattice_enumeration(self.supercell)
    }

    /// Cluster the target occupancy in lattice enumeration order.
    pub fn analyze(
        &self,
        target: &Configuration,
        config: &PercolationConfig,
    ) -> Result<PercolationReport, PercolationError> {
        self.analyze_in_order(target, config, self.enumeration())
    }

    /// Cluster the target occupancy in a caller-supplied order.
    pub fn analyze_in_order<I>(
        &self,
        target: &Configuration,
        config: &PercolationConfig,
        order: I,
    ) -> Result<PercolationReport, PercolationError>
    where
        I: IntoIterator<Item = SiteLabel>,
    {
        if target.supercell() != self.supercell {
            return Err(PercolationError::SupercellMismatch {
                reference: self.supercell,
                target: target.supercell(),
            });
        }
        for label in target.sites_of_species(&config.target_species) {
            if !self.neighbors.contains_site(label) {
                warn!(
                    "Target site {} is not a candidate in the reference network",
                    label
                );
            }
        }

        let report = self.report(target, config, order)?;
        let in_table = target.count_species(&config.target_species);
        if in_table != report.target_site_count {
            warn!(
                "{} of {} '{}' sites were not enumerated",
                in_table - report.target_site_count.min(in_table),
                in_table,
                config.target_species
            );
        }
        Ok(report)
    }

    /// Run the labeling sweep only.
    pub fn label<L, I>(
        &self,
        occupancy: &L,
        config: &PercolationConfig,
        order: I,
    ) -> Result<ClusterState, PercolationError>
    where
        L: SpeciesLookup + ?Sized,
        I: IntoIterator<Item = SiteLabel>,
    {
        config.validate()?;
        ClusterLabeler::new(
            &self.neighbors,
            &self.gates,
            config.scheme,
            &config.target_species,
        )
        .label(occupancy, order)
    }

    /// Label, then select the largest cluster.
    pub fn report<L, I>(
        &self,
        occupancy: &L,
        config: &PercolationConfig,
        order: I,
    ) -> Result<PercolationReport, PercolationError>
    where
        L: SpeciesLookup + ?Sized,
        I: IntoIterator<Item = SiteLabel>,
    {
        let state = self.label(occupancy, config, order)?;
        let largest = select_largest_cluster(&state, &config.target_species)?;
        let report = PercolationReport {
            scheme: config.scheme,
            target_species: config.target_species.clone(),
            target_site_count: state.len(),
            cluster_count: state.cluster_count(),
            cluster_sizes: cluster_sizes(&state),
            largest,
        };
        info!(
            "Scheme {}: largest '{}' cluster {} of {} sites ({:.1}%), {} clusters",
            report.scheme,
            report.target_species,
            report.largest.size,
            report.target_site_count,
            100.0 * report.percolating_fraction(),
            report.cluster_count
        );
        Ok(report)
    }
}
