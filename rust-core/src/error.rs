//! Error types for percolation analysis.
//!
//! Structural faults in the reference network (gates with the wrong number of
//! shared neighbours, ambiguous near pairs) and missing header metadata are fatal
//! and surface before any clustering work begins.

use thiserror::Error;

use crate::structure::SiteLabel;

/// Errors raised while building the neighbour/gate network or labeling clusters.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PercolationError {
    // ========== Input Errors ==========
    /// A required header field was absent from the collaborator's site table.
    #[error("missing configuration metadata: {field}")]
    MissingMetadata { field: &'static str },

    /// Lattice vectors are linearly dependent or degenerate.
    #[error("lattice vectors are singular (det = {determinant:.3e})")]
    SingularLattice { determinant: f64 },

    /// The same site label appears twice in one site table.
    #[error("duplicate site label {0}")]
    DuplicateSite(SiteLabel),

    /// Reference and target configurations describe different supercells.
    #[error("supercell mismatch: reference {reference:?}, target {target:?}")]
    SupercellMismatch {
        reference: [usize; 3],
        target: [usize; 3],
    },

    /// A neighbour table refers to a site the configuration does not contain.
    #[error("site {0} is not present in the site table")]
    UnknownSite(SiteLabel),

    // ========== Configuration Errors ==========
    /// A configuration value is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Percolation scheme outside `0..=2`.
    #[error("unknown percolation scheme {0} (expected 0, 1 or 2)")]
    UnknownScheme(u8),

    // ========== Structural Integrity Faults ==========
    /// An edge does not share exactly four neighbours.
    #[error("gate {site} -> {neighbor}: expected 4 common neighbours, found {found}")]
    GateSize {
        site: SiteLabel,
        neighbor: SiteLabel,
        found: usize,
    },

    /// The gate anchor does not have exactly one in-window partner.
    #[error("gate {site} -> {neighbor}: expected exactly 1 near partner, found {near_found}")]
    AmbiguousGate {
        site: SiteLabel,
        neighbor: SiteLabel,
        near_found: usize,
    },

    /// The filter was asked about an edge with no resolved gate.
    #[error("no gate for edge {site} -> neighbour #{position}")]
    MissingGate { site: SiteLabel, position: usize },

    // ========== Labeling Errors ==========
    /// Alias chain did not terminate in a proper root.
    #[error("alias chain from cluster {0} does not terminate")]
    AliasCycle(usize),

    /// A merge was asked to absorb an id that is already an alias.
    #[error("cluster {0} is an alias, not a proper root")]
    NotARoot(usize),

    /// A cluster id that was never allocated.
    #[error("unknown cluster id {0}")]
    UnknownCluster(usize),

    /// A site was queried that the labeling sweep never assigned.
    #[error("site {0} has no cluster assignment")]
    UnlabeledSite(SiteLabel),

    /// The target species does not occupy any site.
    #[error("no clusters found: species '{species}' occupies no sites")]
    NoClusters { species: String },
}
