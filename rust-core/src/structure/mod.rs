// Structure module: site labels, lattice vectors, periodic metric and site tables
// This module is the data model handed over by site-table readers

// ======================== MODULE DECLARATIONS ========================
pub mod configuration;
pub mod construction;
pub mod lattice_metric;
pub mod site;


// ======================== SITES ========================
pub use site::{
    Site,       // struct - species, doubled fractional coordinate, source line index
    SiteLabel,  // struct - (k, j, i) cell plus sublattice reference; ordered lexicographically
    SiteRecord, // struct - flat (label, site) row as delivered by readers
};

// ======================== LATTICE & METRIC ========================
pub use lattice_metric::{
    LatticeMetric,  // struct - minimum-image distance under a general lattice
    LatticeVectors, // struct - supercell vectors as matrix columns, serialised as rows
};
// LatticeMetric impl methods:
//   new(lattice: &LatticeVectors) -> Self                       - metric tensor from half-scaled vectors
//   minimum_image(&self, from, to) -> Vector3<f64>              - wrapped doubled-coordinate displacement
//   distance(&self, from, to) -> f64                            - periodic distance in Angstrom

// ======================== SITE TABLES ========================
pub use configuration::{
    Configuration,         // struct - validated lattice + supercell + site table
    ConfigurationDocument, // struct - serde shape of an already-parsed table
    ConfigurationHeader,   // struct - optional header metadata from a reader
    SpeciesLookup,         // trait - label -> species lookup used by the filter and labeler
};

// ======================== CONSTRUCTION ========================
pub use construction::{
    FCC_REFERENCE_OFFSETS,         // const - in-cell offsets of refs 1, 3, 5, 7
    fcc_cation_configuration,      // fn(supercell, a, occupant) -> Result<Configuration, _>
    fcc_lattice_constant_for_bond, // fn(bond: f64) -> f64
    lattice_enumeration,           // fn(supercell) -> impl Iterator<Item = SiteLabel>
};
