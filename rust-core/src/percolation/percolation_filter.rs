use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::PercolationError;
use crate::percolation::gate_resolver::Gate;
use crate::structure::{SiteLabel, SpeciesLookup};

/// Gating strictness: which local environments allow a hop between two sites.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum PercolationScheme {
    /// "0TM": a full gate sub-pair must be the mobile species.
    #[default]
    ZeroTm,
    /// "0TM & 1TM": any gate member being the mobile species suffices.
    OneTm,
    /// "0TM, 1TM, 2TM": every bond is traversable.
    TwoTm,
}

impl PercolationScheme {
    pub const ALL: [PercolationScheme; 3] = [
        PercolationScheme::ZeroTm,
        PercolationScheme::OneTm,
        PercolationScheme::TwoTm,
    ];

    /// False only for the ungated scheme.
    pub fn requires_gates(&self) -> bool {
        !matches!(self, PercolationScheme::TwoTm)
    }

    pub fn description(&self) -> &'static str {
        match self {
            PercolationScheme::ZeroTm => "0TM only",
            PercolationScheme::OneTm => "0TM & 1TM",
            PercolationScheme::TwoTm => "0TM, 1TM, 2TM",
        }
    }
}

impl TryFrom<u8> for PercolationScheme {
    type Error = PercolationError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(PercolationScheme::ZeroTm),
            1 => Ok(PercolationScheme::OneTm),
            2 => Ok(PercolationScheme::TwoTm),
            other => Err(PercolationError::UnknownScheme(other)),
        }
    }
}

impl From<PercolationScheme> for u8 {
    fn from(scheme: PercolationScheme) -> Self {
        match scheme {
            PercolationScheme::ZeroTm => 0,
            PercolationScheme::OneTm => 1,
            PercolationScheme::TwoTm => 2,
        }
    }
}

impl fmt::Display for PercolationScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", u8::from(*self), self.description())
    }
}

/// Decides whether a bond between two target-species sites is traversable.
#[derive(Debug, Clone, Copy)]
pub struct PercolationFilter<'a> {
    scheme: PercolationScheme,
    target_species: &'a str,
}

impl<'a> PercolationFilter<'a> {
    pub fn new(scheme: PercolationScheme, target_species: &'a str) -> Self {
        PercolationFilter {
            scheme,
            target_species,
        }
    }

    pub fn scheme(&self) -> PercolationScheme {
        self.scheme
    }

    pub fn target_species(&self) -> &'a str {
        self.target_species
    }

    pub fn allows<L>(&self, gate: &Gate, occupancy: &L) -> bool
    where
        L: SpeciesLookup + ?Sized,
    {
        let is_target = |label: &SiteLabel| occupancy.is_species(label, self.target_species);
        let members = gate.members();
        match self.scheme {
            PercolationScheme::ZeroTm => {
                (is_target(&members[0]) && is_target(&members[1]))
                    || (is_target(&members[2]) && is_target(&members[3]))
            }
            PercolationScheme::OneTm => members.iter().any(is_target),
            PercolationScheme::TwoTm => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn gate() -> Gate {
        Gate::new([
            SiteLabel::new(0, 0, 0, 1),
            SiteLabel::new(0, 0, 0, 3),
            SiteLabel::new(0, 0, 0, 5),
            SiteLabel::new(0, 0, 0, 7),
        ])
    }

    fn occupancy(species: [&str; 4]) -> BTreeMap<SiteLabel, String> {
        gate()
            .members()
            .iter()
            .zip(species)
            .map(|(label, s)| (*label, s.to_string()))
            .collect()
    }

    #[test]
    fn test_zero_tm_needs_a_full_pair() {
        let filter = PercolationFilter::new(PercolationScheme::ZeroTm, "Li");
        assert!(filter.allows(&gate(), &occupancy(["Li", "Li", "Mn", "Mn"])));
        assert!(filter.allows(&gate(), &occupancy(["Mn", "Mn", "Li", "Li"])));
        assert!(!filter.allows(&gate(), &occupancy(["Li", "Mn", "Li", "Mn"])));
        assert!(!filter.allows(&gate(), &occupancy(["Mn", "Mn", "Mn", "Mn"])));
    }

    #[test]
    fn test_one_tm_needs_any_member() {
        let filter = PercolationFilter::new(PercolationScheme::OneTm, "Li");
        assert!(filter.allows(&gate(), &occupancy(["Mn", "Mn", "Mn", "Li"])));
        assert!(filter.allows(&gate(), &occupancy(["Li", "Mn", "Li", "Mn"])));
        assert!(!filter.allows(&gate(), &occupancy(["Mn", "Ni", "Co", "Mn"])));
    }

    #[test]
    fn test_two_tm_is_ungated() {
        let filter = PercolationFilter::new(PercolationScheme::TwoTm, "Li");
        assert!(filter.allows(&gate(), &occupancy(["Mn", "Mn", "Mn", "Mn"])));
        assert!(!PercolationScheme::TwoTm.requires_gates());
    }

    #[test]
    fn test_missing_members_are_not_target() {
        let filter = PercolationFilter::new(PercolationScheme::OneTm, "Li");
        let empty: BTreeMap<SiteLabel, String> = BTreeMap::new();
        assert!(!filter.allows(&gate(), &empty));
    }

    #[test]
    fn test_scheme_integer_conversion() {
        for scheme in PercolationScheme::ALL {
            assert_eq!(PercolationScheme::try_from(u8::from(scheme)).unwrap(), scheme);
        }
        assert_eq!(
            PercolationScheme::try_from(7),
            Err(PercolationError::UnknownScheme(7))
        );
        assert_eq!(PercolationScheme::OneTm.to_string(), "1 (0TM & 1TM)");
    }
}
