use nalgebra::Vector3;

use crate::config::CANDIDATE_REFS;
use crate::error::PercolationError;
use crate::structure::configuration::{Configuration, ConfigurationHeader};
use crate::structure::lattice_metric::LatticeVectors;
use crate::structure::site::{Site, SiteLabel, SiteRecord};

/// Positions of the four candidate refs inside a cubic conventional cell.
/// Together they form a face-centred cubic cation sublattice.
pub const FCC_REFERENCE_OFFSETS: [(u8, [f64; 3]); 4] = [
    (1, [0.0, 0.0, 0.0]),
    (3, [0.5, 0.5, 0.0]),
    (5, [0.5, 0.0, 0.5]),
    (7, [0.0, 0.5, 0.5]),
];

/// Cubic conventional-cell edge whose FCC nearest-neighbour distance equals `bond`.
pub fn fcc_lattice_constant_for_bond(bond: f64) -> f64 {
    bond * 2.0_f64.sqrt()
}

/// Enumerate every `(k, j, i, ref)` lattice position of a supercell in the
/// fixed traversal order: `k` outermost, then `j`, then `i`, then ref.
pub fn lattice_enumeration(supercell: [usize; 3]) -> impl Iterator<Item = SiteLabel> {
    let [nk, nj, ni] = supercell;
    (0..nk).flat_map(move |k| {
        (0..nj).flat_map(move |j| {
            (0..ni).flat_map(move |i| {
                CANDIDATE_REFS
                    .into_iter()
                    .map(move |reference| SiteLabel::new(k, j, i, reference))
            })
        })
    })
}

/// Build a cubic supercell whose candidate refs sit on an FCC sublattice.
///
/// Cell `(k, j, i)` runs along lattice vectors `(a, b, c)`; `occupant` decides the
/// species at every position.
pub fn fcc_cation_configuration<F>(
    supercell: [usize; 3],
    lattice_constant: f64,
    occupant: F,
) -> Result<Configuration, PercolationError>
where
    F: Fn(&SiteLabel) -> String,
{
    let extent = Vector3::new(
        supercell[0] as f64,
        supercell[1] as f64,
        supercell[2] as f64,
    );
    let lattice = LatticeVectors::orthorhombic(
        extent.x * lattice_constant,
        extent.y * lattice_constant,
        extent.z * lattice_constant,
    );

    let records: Vec<SiteRecord> = lattice_enumeration(supercell)
        .enumerate()
        .map(|(line_index, label)| {
            let offset = FCC_REFERENCE_OFFSETS
                .iter()
                .find(|(reference, _)| *reference == label.reference)
                .map(|(_, offset)| Vector3::from(*offset))
                .unwrap_or_else(Vector3::zeros);
            let cell = Vector3::new(label.k as f64, label.j as f64, label.i as f64);
            let fractional = (cell + offset).component_div(&extent);
            SiteRecord::new(
                label,
                Site::from_fractional(occupant(&label), fractional, line_index),
            )
        })
        .collect();

    let number_density = records.len() as f64 / lattice.volume();
    let header = ConfigurationHeader {
        lattice_vectors: Some(lattice),
        supercell: Some(supercell),
        number_density: Some(number_density),
    };
    Configuration::new(header, records)
}
