#[cfg(test)]
mod _tests_gate_resolver {
    use super::super::gate_resolver::*;
    use super::super::neighbor_indexer::{build_neighbor_list, NeighborList};
    use crate::config::{BondWindow, PercolationConfig};
    use crate::error::PercolationError;
    use crate::structure::{
        fcc_cation_configuration, fcc_lattice_constant_for_bond, Configuration,
        ConfigurationHeader, LatticeVectors, Site, SiteLabel, SiteRecord,
    };
    use nalgebra::Vector3;

    fn all_li_fcc() -> Configuration {
        fcc_cation_configuration([2, 2, 2], fcc_lattice_constant_for_bond(2.925), |_| {
            "Li".to_string()
        })
        .unwrap()
    }

    /// Configuration in a 20 Å cube from fractional positions.
    fn cube(sites: &[(SiteLabel, [f64; 3])]) -> Configuration {
        let header = ConfigurationHeader {
            lattice_vectors: Some(LatticeVectors::orthorhombic(20.0, 20.0, 20.0)),
            supercell: Some([1, 1, 1]),
            number_density: Some(0.01),
        };
        let records = sites.iter().enumerate().map(|(n, (label, frac))| {
            SiteRecord::new(*label, Site::from_fractional("Li", Vector3::from(*frac), n))
        });
        Configuration::new(header, records.collect::<Vec<_>>()).unwrap()
    }

    #[test]
    fn test_fcc_gate_split() {
        let configuration = all_li_fcc();
        let config = PercolationConfig::default();
        let neighbors =
            build_neighbor_list(&configuration, &config.excluded_species, &config.bond_window);
        let gates = resolve_gates(&neighbors, &configuration, &config.bond_window).unwrap();

        let origin = SiteLabel::new(0, 0, 0, 1);
        let position = neighbors
            .position(&origin, &SiteLabel::new(0, 0, 0, 3))
            .unwrap();
        let gate = gates.get(&origin, position).unwrap();

        assert_eq!(
            gate.near_pair(),
            (SiteLabel::new(0, 0, 0, 5), SiteLabel::new(0, 0, 0, 7))
        );
        assert_eq!(
            gate.far_pair(),
            (SiteLabel::new(0, 0, 1, 5), SiteLabel::new(0, 0, 1, 7))
        );
    }

    #[test]
    fn test_every_edge_has_a_gate() {
        let configuration = all_li_fcc();
        let config = PercolationConfig::default();
        let neighbors =
            build_neighbor_list(&configuration, &config.excluded_species, &config.bond_window);
        let gates = resolve_gates(&neighbors, &configuration, &config.bond_window).unwrap();

        assert_eq!(gates.len(), neighbors.edge_count());
        for (site, list) in neighbors.iter() {
            assert_eq!(gates.gates_of(site).len(), list.len());
            for gate in gates.gates_of(site) {
                // Members are shared neighbours of both ends, never the ends themselves.
                assert!(!gate.members().contains(site));
                for member in gate.members() {
                    assert!(list.contains(member));
                }
            }
        }
    }

    #[test]
    fn test_isolated_pair_has_no_gate() {
        let a = SiteLabel::new(0, 0, 0, 1);
        let b = SiteLabel::new(0, 0, 0, 3);
        let configuration = cube(&[(a, [0.1, 0.1, 0.1]), (b, [0.24625, 0.1, 0.1])]);
        let config = PercolationConfig::default();
        let neighbors =
            build_neighbor_list(&configuration, &config.excluded_species, &config.bond_window);
        assert_eq!(neighbors.neighbors(&a), &[b]);

        assert_eq!(
            resolve_gates(&neighbors, &configuration, &config.bond_window),
            Err(PercolationError::GateSize {
                site: a,
                neighbor: b,
                found: 0
            })
        );
    }

    fn four_shared(partners: [[f64; 3]; 4]) -> (NeighborList, Configuration, SiteLabel, SiteLabel) {
        let a = SiteLabel::new(0, 0, 0, 1);
        let b = SiteLabel::new(0, 0, 0, 2);
        let shared: Vec<SiteLabel> = (3..7).map(|r| SiteLabel::new(0, 0, 0, r)).collect();

        let mut sites = vec![(a, [0.5, 0.5, 0.5]), (b, [0.6, 0.5, 0.5])];
        sites.extend(shared.iter().copied().zip(partners));
        let configuration = cube(&sites);

        let mut list_a = vec![b];
        list_a.extend(&shared);
        let mut list_b = vec![a];
        list_b.extend(&shared);
        let neighbors = NeighborList::from_entries(vec![(a, list_a), (b, list_b)]);
        (neighbors, configuration, a, b)
    }

    #[test]
    fn test_no_near_partner_is_a_fault() {
        let (neighbors, configuration, a, b) = four_shared([
            [0.1, 0.1, 0.1],
            [0.4, 0.1, 0.1],
            [0.1, 0.4, 0.1],
            [0.1, 0.1, 0.4],
        ]);
        let metric = configuration.metric();
        let result = resolve_gate(
            &neighbors,
            &configuration,
            &metric,
            &BondWindow::default(),
            &a,
            0,
        );
        assert_eq!(
            result,
            Err(PercolationError::AmbiguousGate {
                site: a,
                neighbor: b,
                near_found: 0
            })
        );
    }

    #[test]
    fn test_two_near_partners_is_a_fault() {
        // 0.14625 of a 20 Å cube is 2.925 Å.
        let (neighbors, configuration, a, _) = four_shared([
            [0.1, 0.1, 0.1],
            [0.24625, 0.1, 0.1],
            [0.1, 0.24625, 0.1],
            [0.1, 0.1, 0.4],
        ]);
        let metric = configuration.metric();
        let result = resolve_gate(
            &neighbors,
            &configuration,
            &metric,
            &BondWindow::default(),
            &a,
            0,
        );
        assert!(matches!(
            result,
            Err(PercolationError::AmbiguousGate { near_found: 2, .. })
        ));
    }

    #[test]
    fn test_single_near_partner_orders_gate() {
        let (neighbors, configuration, a, _) = four_shared([
            [0.1, 0.1, 0.1],
            [0.1, 0.1, 0.4],
            [0.24625, 0.1, 0.1],
            [0.1, 0.4, 0.1],
        ]);
        let metric = configuration.metric();
        let gate = resolve_gate(
            &neighbors,
            &configuration,
            &metric,
            &BondWindow::default(),
            &a,
            0,
        )
        .unwrap();
        assert_eq!(
            gate.members(),
            &[
                SiteLabel::new(0, 0, 0, 3),
                SiteLabel::new(0, 0, 0, 5),
                SiteLabel::new(0, 0, 0, 4),
                SiteLabel::new(0, 0, 0, 6),
            ]
        );
    }

    #[test]
    fn test_position_out_of_range() {
        let (neighbors, configuration, a, _) = four_shared([[0.1; 3], [0.2; 3], [0.3; 3], [0.4; 3]]);
        let metric = configuration.metric();
        assert_eq!(
            resolve_gate(
                &neighbors,
                &configuration,
                &metric,
                &BondWindow::default(),
                &a,
                9
            ),
            Err(PercolationError::MissingGate { site: a, position: 9 })
        );
    }
}
