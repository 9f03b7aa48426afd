// Percolation module: neighbour indexing, gate resolution and Hoshen-Kopelman clustering
// This module finds the largest percolating network of mobile-ion sites in a supercell

// ======================== MODULE DECLARATIONS ========================
pub mod cluster_labeler;
pub mod cluster_selector;
pub mod cluster_state;
pub mod gate_resolver;
pub mod neighbor_indexer;
pub mod network;
pub mod percolation_filter;

mod _tests_gate_resolver;

// ======================== NEIGHBOUR INDEXING ========================
pub use neighbor_indexer::{
    NeighborList,        // struct - ordered bonded neighbours per candidate site
    build_neighbor_list, // fn(config: &Configuration, excluded: &BTreeSet<String>, window: &BondWindow) -> NeighborList
};

// ======================== GATES ========================
pub use gate_resolver::{
    Gate,          // struct - four shared neighbours: near pair then far pair
    GateTable,     // struct - gates keyed by (site, neighbour position)
    resolve_gate,  // fn(neighbors, config, metric, window, site, position) -> Result<Gate, PercolationError>
    resolve_gates, // fn(neighbors, config, window) -> Result<GateTable, PercolationError>
};

// ======================== FILTERING ========================
pub use percolation_filter::{
    PercolationFilter, // struct - scheme + target species; decides bond traversability
    PercolationScheme, // enum - ZeroTm (0), OneTm (1), TwoTm (2)
};

// ======================== CLUSTERING ========================
pub use cluster_state::{
    ClusterEntry, // enum - Root { size } | Alias { target }
    ClusterId,    // struct - raw cluster id, allocated from 1
    ClusterState, // struct - union-find entries plus per-site raw ids
};
// ClusterState impl methods:
//   allocate(&mut self, site) -> ClusterId                      - open a singleton cluster
//   find(&self, id) -> Result<ClusterId, _>                     - follow aliases to the proper root
//   join(&mut self, site, roots) -> Result<ClusterId, _>        - merge roots, smallest id survives
//   resolve(&self, site) -> Result<ClusterId, _>                - proper root of a labeled site
//   flatten(&mut self) -> Result<usize, _>                      - path compression, returns rewrites

pub use cluster_labeler::ClusterLabeler; // struct - Hoshen-Kopelman sweep over an enumeration order

pub use cluster_selector::{
    ClusterSize,            // struct - (root id, size)
    LargestCluster,         // struct - root id, size and member sites
    cluster_partition,      // fn(state: &ClusterState) -> Result<BTreeMap<ClusterId, Vec<SiteLabel>>, _>
    cluster_sizes,          // fn(state: &ClusterState) -> Vec<ClusterSize>
    select_largest_cluster, // fn(state: &ClusterState, species: &str) -> Result<LargestCluster, _>
};

// ======================== PIPELINE ========================
pub use network::{
    PercolationNetwork, // struct - reference tables + analysis entry points
    PercolationReport,  // struct - cluster sizes and largest cluster of one target
};
