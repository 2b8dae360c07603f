//! Species selection from a layer's cumulative predominance table.
//!
//! A predominance table holds one ascending cumulative threshold per species, e.g.
//! `[0.4, 0.75, 1.0]` gives the species shares 40%, 35% and 25%. A uniform draw `u` in
//! `[0, 1)` selects the first species whose threshold exceeds `u`. Entries above `1.0`
//! are accepted, so tables accumulated in `f32` that overshoot slightly stay complete.
//!
//! - [validate_predominance]: structural checks run once per layer.
//! - [select_species]: lookup for a given draw.
//! - [pick_species]: draws `u` from an RNG implementing [rand::RngCore] and selects.
use rand::RngCore;

use crate::error::{Error, Result};

/// Outcome of a successful table validation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PredominanceCheck {
    /// The table ends at or above `1.0`; every draw selects a species.
    Complete,
    /// The table ends below `1.0`; draws at or above `last` fall back to species 0.
    Incomplete { last: f32 },
}

/// A selected species index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub index: usize,
    /// Set when no threshold exceeded the draw and index 0 was used instead.
    pub fallback: bool,
}

/// Checks a predominance table against the number of species it selects from.
pub fn validate_predominance(table: &[f32], species_count: usize) -> Result<PredominanceCheck> {
    const CONTEXT: &str = "predominance";

    if species_count == 0 {
        return Err(Error::invalid_parameter(CONTEXT, "layer has no species"));
    }
    if table.len() != species_count {
        return Err(Error::invalid_parameter(
            CONTEXT,
            format!(
                "table has {} entries for {species_count} species",
                table.len()
            ),
        ));
    }

    let mut previous = 0.0f32;
    for (i, &value) in table.iter().enumerate() {
        if !value.is_finite() || value < 0.0 {
            return Err(Error::invalid_parameter(
                CONTEXT,
                format!("entry {i} is {value}, expected a finite value >= 0"),
            ));
        }
        if value < previous {
            return Err(Error::invalid_parameter(
                CONTEXT,
                format!("entry {i} ({value}) is below entry {} ({previous})", i - 1),
            ));
        }
        previous = value;
    }

    if previous < 1.0 {
        Ok(PredominanceCheck::Incomplete { last: previous })
    } else {
        Ok(PredominanceCheck::Complete)
    }
}

/// Returns the first index whose threshold exceeds `u`, or index 0 flagged as fallback.
#[inline]
pub fn select_species(table: &[f32], u: f32) -> Selection {
    match table.iter().position(|&t| u < t) {
        Some(index) => Selection {
            index,
            fallback: false,
        },
        None => Selection {
            index: 0,
            fallback: true,
        },
    }
}

/// Draws one uniform value and selects a species with it.
pub fn pick_species(table: &[f32], rng: &mut dyn RngCore) -> Selection {
    select_species(table, crate::sampling::rand01(rng))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sampling::test_rng::SequenceRng;

    #[test]
    fn draws_select_matching_species() {
        let table = [0.4, 0.75, 1.0];
        let mut rng = SequenceRng::from_unit_draws(&[0.1, 0.5, 0.9]);
        let picked: Vec<usize> = (0..3).map(|_| pick_species(&table, &mut rng).index).collect();
        assert_eq!(picked, vec![0, 1, 2]);
    }

    #[test]
    fn threshold_is_exclusive() {
        let table = [0.4, 1.0];
        assert_eq!(select_species(&table, 0.4).index, 1);
        assert_eq!(select_species(&table, 0.399).index, 0);
    }

    #[test]
    fn zero_share_species_is_never_selected() {
        let table = [0.0, 0.0, 1.0];
        assert_eq!(select_species(&table, 0.0).index, 2);
    }

    #[test]
    fn incomplete_table_falls_back_to_first_species() {
        let table = [0.3, 0.6];
        assert_eq!(
            validate_predominance(&table, 2).unwrap(),
            PredominanceCheck::Incomplete { last: 0.6 }
        );
        let s = select_species(&table, 0.8);
        assert_eq!(
            s,
            Selection {
                index: 0,
                fallback: true
            }
        );
        assert!(!select_species(&table, 0.5).fallback);
    }

    #[test]
    fn complete_table_validates() {
        assert_eq!(
            validate_predominance(&[0.4, 0.75, 1.0], 3).unwrap(),
            PredominanceCheck::Complete
        );
        assert_eq!(
            validate_predominance(&[1.0], 1).unwrap(),
            PredominanceCheck::Complete
        );
    }

    #[test]
    fn accumulated_tenths_table_is_complete() {
        let mut acc = 0.0f32;
        let table: Vec<f32> = (0..10)
            .map(|_| {
                acc += 0.1;
                acc
            })
            .collect();
        assert!(table[9] > 1.0);
        assert_eq!(
            validate_predominance(&table, 10).unwrap(),
            PredominanceCheck::Complete
        );
        let s = select_species(&table, 0.99);
        assert_eq!(s.index, 9);
        assert!(!s.fallback);
    }

    #[test]
    fn malformed_tables_are_rejected() {
        let cases: [(&[f32], usize); 6] = [
            (&[], 0),
            (&[0.5, 1.0], 3),
            (&[0.6, 0.4, 1.0], 3),
            (&[-0.1, 1.0], 2),
            (&[0.5, f32::INFINITY], 2),
            (&[f32::NAN, 1.0], 2),
        ];
        for (table, count) in cases {
            assert!(
                matches!(
                    validate_predominance(table, count),
                    Err(Error::InvalidParameter { .. })
                ),
                "{table:?} / {count}"
            );
        }
    }
}
