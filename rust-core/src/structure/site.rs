use std::fmt;

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::config::CANDIDATE_REFS;

/// Identifies a site by its lattice cell `(k, j, i)` and sublattice reference.
///
/// Ordering is lexicographic over `(k, j, i, reference)`, which is the fixed
/// traversal order used throughout the analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SiteLabel {
    pub k: usize,
    pub j: usize,
    pub i: usize,
    pub reference: u8,
}

impl SiteLabel {
    pub fn new(k: usize, j: usize, i: usize, reference: u8) -> Self {
        SiteLabel { k, j, i, reference }
    }

    /// Lattice cell coordinate `(k, j, i)`.
    pub fn cell(&self) -> [usize; 3] {
        [self.k, self.j, self.i]
    }

    /// True when the reference index names a candidate cation position.
    pub fn is_candidate_reference(&self) -> bool {
        CANDIDATE_REFS.contains(&self.reference)
    }

    /// True when the cell coordinate lies inside a supercell of the given extent.
    pub fn within(&self, supercell: [usize; 3]) -> bool {
        self.k < supercell[0] && self.j < supercell[1] && self.i < supercell[2]
    }
}

impl fmt::Display for SiteLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{} {} {}]#{}", self.k, self.j, self.i, self.reference)
    }
}

/// Attributes of an occupied site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Site {
    /// Chemical species occupying the site.
    pub species: String,
    /// Doubled fractional coordinate, `2f - 1`, each component in `[-1, 1)`.
    pub internal_coord: Vector3<f64>,
    /// Ordinal in the source table; only used when re-serialising.
    pub line_index: usize,
}

impl Site {
    pub fn new(species: impl Into<String>, internal_coord: Vector3<f64>, line_index: usize) -> Self {
        Site {
            species: species.into(),
            internal_coord,
            line_index,
        }
    }

    /// Build a site from an ordinary fractional coordinate in `[0, 1)`.
    pub fn from_fractional(
        species: impl Into<String>,
        fractional: Vector3<f64>,
        line_index: usize,
    ) -> Self {
        Site::new(species, fractional * 2.0 - Vector3::repeat(1.0), line_index)
    }

    /// Fractional coordinate recovered from the doubled convention.
    pub fn fractional_coord(&self) -> Vector3<f64> {
        (self.internal_coord + Vector3::repeat(1.0)) / 2.0
    }
}

/// Flat row of a site table, the shape collaborators hand over.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteRecord {
    pub label: SiteLabel,
    #[serde(flatten)]
    pub site: Site,
}

impl SiteRecord {
    pub fn new(label: SiteLabel, site: Site) -> Self {
        SiteRecord { label, site }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_label_order_is_kji_then_reference() {
        let mut labels = vec![
            SiteLabel::new(0, 1, 0, 1),
            SiteLabel::new(0, 0, 1, 1),
            SiteLabel::new(1, 0, 0, 1),
            SiteLabel::new(0, 0, 0, 7),
            SiteLabel::new(0, 0, 0, 3),
        ];
        labels.sort();
        assert_eq!(
            labels,
            vec![
                SiteLabel::new(0, 0, 0, 3),
                SiteLabel::new(0, 0, 0, 7),
                SiteLabel::new(0, 0, 1, 1),
                SiteLabel::new(0, 1, 0, 1),
                SiteLabel::new(1, 0, 0, 1),
            ]
        );
    }

    #[test]
    fn test_candidate_references() {
        assert!(SiteLabel::new(0, 0, 0, 1).is_candidate_reference());
        assert!(SiteLabel::new(0, 0, 0, 7).is_candidate_reference());
        assert!(!SiteLabel::new(0, 0, 0, 2).is_candidate_reference());
        assert!(!SiteLabel::new(0, 0, 0, 8).is_candidate_reference());
    }

    #[test]
    fn test_doubled_coordinate_convention() {
        let site = Site::from_fractional("Li", Vector3::new(0.0, 0.25, 0.5), 0);
        assert_relative_eq!(site.internal_coord.x, -1.0);
        assert_relative_eq!(site.internal_coord.y, -0.5);
        assert_relative_eq!(site.internal_coord.z, 0.0);
        assert_relative_eq!(site.fractional_coord().y, 0.25);
    }
}
