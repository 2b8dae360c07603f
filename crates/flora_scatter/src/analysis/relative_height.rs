//! Relative height: a relief-amplified height signal.
//!
//! ```text
//! inverse  = (neighborhood min + max) - raw
//! relative = raw - inverse + offset
//! ```
//!
//! The result is not normalized; curves consuming it must be authored for whatever
//! range the terrain produces.
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::analysis::grid::{Grid, HeightGrid};
use crate::analysis::mean_height::NeighborhoodCache;
use crate::error::{Error, Result};

/// Constant added to every relative height sample.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum RelativeHeightOffset {
    /// Mean of the raw heightfield.
    #[default]
    GlobalMean,
    /// Fixed constant.
    Fixed(f32),
}

impl RelativeHeightOffset {
    /// Resolves the offset for `heights`.
    pub fn resolve(self, heights: &HeightGrid) -> f32 {
        match self {
            RelativeHeightOffset::GlobalMean => heights.mean(),
            RelativeHeightOffset::Fixed(value) => value,
        }
    }
}

/// Computes the relative height grid, consuming the neighborhood cache.
pub fn relative_height(
    heights: &HeightGrid,
    neighborhood: NeighborhoodCache,
    offset: RelativeHeightOffset,
) -> Result<Grid<f32>> {
    if neighborhood.size() != heights.size() {
        return Err(Error::DimensionMismatch {
            stage: "relative_height".into(),
            expected: heights.size(),
            actual: format!(
                "{0}x{0} neighborhood cache",
                neighborhood.size()
            ),
        });
    }

    let offset = offset.resolve(heights);
    debug!("Relative height offset: {}.", offset);

    let sums = neighborhood.as_grid().as_slice();
    let data = heights
        .iter()
        .zip(sums)
        .map(|(&raw, &min_max_sum)| {
            let inverse = min_max_sum - raw;
            raw - inverse + offset
        })
        .collect();
    Grid::from_vec(heights.size(), data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::mean_height::mean_height;

    fn heights() -> HeightGrid {
        Grid::from_fn(5, |x, y| ((x * 7 + y * 3) % 5) as f32 / 4.0)
    }

    #[test]
    fn matches_identity_for_fixed_offset() {
        let h = heights();
        let mean = mean_height(&h, 1.5).unwrap();
        let cache = mean.neighborhood.clone();
        let rel = relative_height(&h, mean.neighborhood, RelativeHeightOffset::Fixed(0.25))
            .unwrap();

        for (x, y, &raw) in h.cells() {
            let sum = cache.min_max_sum(x, y).unwrap();
            let expected = raw - (sum - raw) + 0.25;
            assert_eq!(*rel.get(x, y).unwrap(), expected);
        }
    }

    #[test]
    fn global_mean_offset_uses_raw_average() {
        let h = Grid::from_vec(2, vec![0.0, 0.2, 0.4, 0.6]).unwrap();
        assert!((RelativeHeightOffset::GlobalMean.resolve(&h) - 0.3).abs() < 1e-6);

        let mean = mean_height(&h, 0.0).unwrap();
        let rel = relative_height(&h, mean.neighborhood, RelativeHeightOffset::GlobalMean)
            .unwrap();
        // With a zero radius min + max = 2 * raw, so relative = offset everywhere.
        for &v in rel.iter() {
            assert!((v - 0.3).abs() < 1e-6);
        }
    }

    #[test]
    fn output_is_not_normalized() {
        let h = Grid::from_vec(2, vec![0.0, 1.0, 1.0, 1.0]).unwrap();
        let mean = mean_height(&h, 1.0).unwrap();
        let rel = relative_height(&h, mean.neighborhood, RelativeHeightOffset::Fixed(0.0))
            .unwrap();
        // (0,0): window {0,1,1} -> sum 1, inverse 1, relative -1.
        assert_eq!(*rel.get(0, 0).unwrap(), -1.0);
    }

    #[test]
    fn rejects_mismatched_cache() {
        let h = heights();
        let other = mean_height(&Grid::new(3, 0.5), 1.0).unwrap();
        let err = relative_height(&h, other.neighborhood, RelativeHeightOffset::GlobalMean)
            .unwrap_err();
        assert!(matches!(err, Error::DimensionMismatch { expected: 5, .. }));
    }
}
