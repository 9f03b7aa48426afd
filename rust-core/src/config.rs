// Constants and run configuration

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::PercolationError;
use crate::percolation::PercolationScheme;

// Bond window (Angstrom) for cation-cation neighbours
pub const DEFAULT_R_MIN: f64 = 2.90;
pub const DEFAULT_R_MAX: f64 = 2.95;

// Sublattice positions that hold candidate cation sites in every unit cell
pub const CANDIDATE_REFS: [u8; 4] = [1, 3, 5, 7];

pub const DEFAULT_TARGET_SPECIES: &str = "Li";
pub const DEFAULT_EXCLUDED_SPECIES: [&str; 2] = ["O", "F"];

// Tolerances
pub const LATTICE_TOLERANCE: f64 = 1e-10; // For singularity checks on lattice vectors

/// Closed distance interval `[r_min, r_max]` that defines a bond.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BondWindow {
    pub r_min: f64,
    pub r_max: f64,
}

impl BondWindow {
    pub fn new(r_min: f64, r_max: f64) -> Self {
        BondWindow { r_min, r_max }
    }

    /// Both ends are inclusive.
    pub fn contains(&self, distance: f64) -> bool {
        self.r_min <= distance && distance <= self.r_max
    }

    fn validate(&self) -> Result<(), PercolationError> {
        if !self.r_min.is_finite() || !self.r_max.is_finite() {
            return Err(PercolationError::InvalidConfig(
                "bond window radii must be finite".to_string(),
            ));
        }
        if self.r_min < 0.0 {
            return Err(PercolationError::InvalidConfig(format!(
                "r_min must be non-negative, got {}",
                self.r_min
            )));
        }
        if self.r_min > self.r_max {
            return Err(PercolationError::InvalidConfig(format!(
                "r_min ({}) exceeds r_max ({})",
                self.r_min, self.r_max
            )));
        }
        Ok(())
    }
}

impl Default for BondWindow {
    fn default() -> Self {
        BondWindow::new(DEFAULT_R_MIN, DEFAULT_R_MAX)
    }
}

/// Everything a percolation run needs besides the two site tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PercolationConfig {
    /// Gating strictness.
    pub scheme: PercolationScheme,
    /// Mobile species whose network is clustered.
    pub target_species: String,
    /// Species that never become candidate sites (anions).
    pub excluded_species: BTreeSet<String>,
    pub bond_window: BondWindow,
}

impl Default for PercolationConfig {
    fn default() -> Self {
        PercolationConfig {
            scheme: PercolationScheme::default(),
            target_species: DEFAULT_TARGET_SPECIES.to_string(),
            excluded_species: DEFAULT_EXCLUDED_SPECIES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            bond_window: BondWindow::default(),
        }
    }
}

impl PercolationConfig {
    pub fn with_scheme(mut self, scheme: PercolationScheme) -> Self {
        self.scheme = scheme;
        self
    }

    pub fn with_target_species(mut self, species: impl Into<String>) -> Self {
        self.target_species = species.into();
        self
    }

    pub fn with_excluded_species<I, S>(mut self, species: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excluded_species = species.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_bond_window(mut self, r_min: f64, r_max: f64) -> Self {
        self.bond_window = BondWindow::new(r_min, r_max);
        self
    }

    /// Reject configurations that cannot produce a meaningful analysis.
    pub fn validate(&self) -> Result<(), PercolationError> {
        self.bond_window.validate()?;
        if self.target_species.trim().is_empty() {
            return Err(PercolationError::InvalidConfig(
                "target species must not be empty".to_string(),
            ));
        }
        if self.excluded_species.contains(&self.target_species) {
            return Err(PercolationError::InvalidConfig(format!(
                "target species '{}' is also excluded",
                self.target_species
            )));
        }
        Ok(())
    }
}
