use std::collections::{BTreeMap, BTreeSet};

use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::PercolationError;
use crate::structure::lattice_metric::{LatticeMetric, LatticeVectors};
use crate::structure::site::{Site, SiteLabel, SiteRecord};

/// Header metadata as delivered by a site-table reader. Every field may be
/// missing at this stage; [`Configuration::new`] decides whether that is fatal.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigurationHeader {
    pub lattice_vectors: Option<LatticeVectors>,
    pub supercell: Option<[usize; 3]>,
    pub number_density: Option<f64>,
}

/// Serde shape of an already-parsed site table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigurationDocument {
    pub header: ConfigurationHeader,
    pub sites: Vec<SiteRecord>,
}

/// Read-only species lookup used by the percolation filter and labeler.
pub trait SpeciesLookup {
    fn species(&self, label: &SiteLabel) -> Option<&str>;

    fn is_species(&self, label: &SiteLabel, species: &str) -> bool {
        self.species(label) == Some(species)
    }
}

impl SpeciesLookup for BTreeMap<SiteLabel, String> {
    fn species(&self, label: &SiteLabel) -> Option<&str> {
        self.get(label).map(String::as_str)
    }
}

/// A validated supercell configuration: lattice, extent and site table.
#[derive(Debug, Clone, PartialEq)]
pub struct Configuration {
    lattice: LatticeVectors,
    supercell: [usize; 3],
    number_density: f64,
    sites: BTreeMap<SiteLabel, Site>,
}

impl Configuration {
    /// Validate header metadata and index the site records by label.
    pub fn new(
        header: ConfigurationHeader,
        records: impl IntoIterator<Item = SiteRecord>,
    ) -> Result<Self, PercolationError> {
        let lattice = header
            .lattice_vectors
            .ok_or(PercolationError::MissingMetadata {
                field: "lattice vectors",
            })?;
        let supercell = header.supercell.ok_or(PercolationError::MissingMetadata {
            field: "supercell dimensions",
        })?;
        let number_density = header.number_density.ok_or(PercolationError::MissingMetadata {
            field: "number density",
        })?;

        lattice.validate()?;
        if supercell.iter().any(|&n| n == 0) {
            return Err(PercolationError::InvalidConfig(format!(
                "supercell dimensions must be non-zero, got {:?}",
                supercell
            )));
        }

        let mut sites = BTreeMap::new();
        for record in records {
            if !record.label.within(supercell) {
                warn!(
                    "Site {} lies outside supercell {:?}; it will never be enumerated",
                    record.label, supercell
                );
            }
            if sites.insert(record.label, record.site).is_some() {
                return Err(PercolationError::DuplicateSite(record.label));
            }
        }

        Ok(Configuration {
            lattice,
            supercell,
            number_density,
            sites,
        })
    }

    pub fn from_document(document: ConfigurationDocument) -> Result<Self, PercolationError> {
        Configuration::new(document.header, document.sites)
    }

    pub fn lattice(&self) -> &LatticeVectors {
        &self.lattice
    }

    pub fn metric(&self) -> LatticeMetric {
        LatticeMetric::new(&self.lattice)
    }

    pub fn supercell(&self) -> [usize; 3] {
        self.supercell
    }

    pub fn number_density(&self) -> f64 {
        self.number_density
    }

    pub fn len(&self) -> usize {
        self.sites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }

    pub fn site(&self, label: &SiteLabel) -> Option<&Site> {
        self.sites.get(label)
    }

    /// All sites in label order.
    pub fn sites(&self) -> impl Iterator<Item = (&SiteLabel, &Site)> {
        self.sites.iter()
    }

    /// Sites on a candidate sublattice position whose species is not excluded,
    /// in label order.
    pub fn candidate_sites<'a>(
        &'a self,
        excluded: &'a BTreeSet<String>,
    ) -> impl Iterator<Item = (&'a SiteLabel, &'a Site)> + 'a {
        self.sites.iter().filter(move |(label, site)| {
            label.is_candidate_reference() && !excluded.contains(&site.species)
        })
    }

    pub fn sites_of_species<'a>(
        &'a self,
        species: &'a str,
    ) -> impl Iterator<Item = &'a SiteLabel> + 'a {
        self.sites
            .iter()
            .filter(move |(_, site)| site.species == species)
            .map(|(label, _)| label)
    }

    pub fn count_species(&self, species: &str) -> usize {
        self.sites_of_species(species).count()
    }

    /// Flat records in label order, ready for an external writer.
    pub fn to_document(&self) -> ConfigurationDocument {
        ConfigurationDocument {
            header: ConfigurationHeader {
                lattice_vectors: Some(self.lattice),
                supercell: Some(self.supercell),
                number_density: Some(self.number_density),
            },
            sites: self
                .sites
                .iter()
                .map(|(label, site)| SiteRecord::new(*label, site.clone()))
                .collect(),
        }
    }
}

impl SpeciesLookup for Configuration {
    fn species(&self, label: &SiteLabel) -> Option<&str> {
        self.sites.get(label).map(|site| site.species.as_str())
    }
}
