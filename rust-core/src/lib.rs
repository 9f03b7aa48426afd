//! Lithium percolation analysis for crystal supercells
//!
//! This library builds the bonded network of candidate cation sites in a periodic
//! supercell, resolves the four-site gate of every bond, and labels percolating
//! clusters of the mobile species with the Hoshen-Kopelman algorithm.

pub mod config;
pub mod error;
pub mod percolation;
pub mod structure;

pub use config::{BondWindow, PercolationConfig};
pub use error::PercolationError;
pub use percolation::{PercolationNetwork, PercolationReport, PercolationScheme};
pub use structure::{Configuration, ConfigurationDocument, SiteLabel};

/// Common result type used throughout the library
pub type Result<T> = std::result::Result<T, PercolationError>;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
