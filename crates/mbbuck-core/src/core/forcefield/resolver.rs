//! Coefficient resolution for a pair of sites.
//!
//! A query names two sites, `(mon_id1, index1)` and `(mon_id2, index2)`. Entries are
//! stored under a canonical [`PairKey`], so both orderings of a query reach the same
//! entry. The repulsion depends only on the distance between the two atoms, hence the
//! resolved `(A, B)` apply unchanged with the first-named site as the reference atom,
//! whichever order the entry was registered in.

use super::params::{BuckinghamCoefficients, CoefficientTable, PairKey};

impl CoefficientTable {
    /// Looks up the coefficients for a site pair.
    ///
    /// Returns `None` when the monomer pair is not enabled or no entry is registered.
    /// Absence means the two sites do not repel through this term; it is not an error.
    pub fn resolve(
        &self,
        mon_id1: &str,
        mon_id2: &str,
        index1: usize,
        index2: usize,
    ) -> Option<BuckinghamCoefficients> {
        if !self.is_enabled(mon_id1, mon_id2) {
            return None;
        }
        self.entries
            .get(&PairKey::new(mon_id1, index1, mon_id2, index2))
            .copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_with_oh() -> CoefficientTable {
        let mut table = CoefficientTable::new();
        table
            .insert("O", 0, "H", 0, BuckinghamCoefficients::new(500.0, 3.2))
            .unwrap();
        table
    }

    #[test]
    fn resolve_returns_registered_values_in_stored_order() {
        let table = table_with_oh();
        assert_eq!(
            table.resolve("O", "H", 0, 0),
            Some(BuckinghamCoefficients::new(500.0, 3.2))
        );
    }

    #[test]
    fn resolve_returns_identical_values_for_reversed_query() {
        let table = table_with_oh();
        assert_eq!(table.resolve("H", "O", 0, 0), table.resolve("O", "H", 0, 0));
    }

    #[test]
    fn resolve_swaps_site_indices_together_with_monomer_ids() {
        let mut table = CoefficientTable::new();
        table
            .insert("h2o", 1, "cl", 0, BuckinghamCoefficients::new(2100.0, 3.1))
            .unwrap();

        assert!(table.resolve("cl", "h2o", 0, 1).is_some());
        assert!(table.resolve("cl", "h2o", 1, 0).is_none());
        assert!(table.resolve("h2o", "cl", 0, 1).is_none());
    }

    #[test]
    fn resolve_returns_none_for_unregistered_pair() {
        let table = table_with_oh();
        assert_eq!(table.resolve("O", "N", 0, 0), None);
        assert_eq!(table.resolve("O", "H", 0, 1), None);
    }

    #[test]
    fn resolve_returns_none_for_disabled_monomer_pair() {
        let mut table = table_with_oh();
        table.enable_pair("O", "N");
        assert_eq!(table.resolve("O", "H", 0, 0), None);

        table.enable_pair("H", "O");
        assert!(table.resolve("O", "H", 0, 0).is_some());
    }

    #[test]
    fn resolve_distinguishes_sites_of_same_monomer_type() {
        let mut table = CoefficientTable::new();
        table
            .insert("h2o", 0, "h2o", 1, BuckinghamCoefficients::new(1.0, 1.0))
            .unwrap();
        table
            .insert("h2o", 0, "h2o", 0, BuckinghamCoefficients::new(2.0, 2.0))
            .unwrap();

        assert_eq!(table.resolve("h2o", "h2o", 1, 0).map(|c| c.a), Some(1.0));
        assert_eq!(table.resolve("h2o", "h2o", 0, 0).map(|c| c.a), Some(2.0));
        assert_eq!(table.resolve("h2o", "h2o", 1, 1), None);
    }
}
