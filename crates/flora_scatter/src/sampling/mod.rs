//! Sampling strategies for generating candidate positions in a 2D domain.
//!
//! This module defines the trait used by the placement pipeline to propose positions
//! prior to evaluation, and the Poisson disk strategy that implements it.
use mint::Vector2;
use rand::RngCore;

use crate::error::Result;

pub mod poisson_disk;

pub use poisson_disk::{poisson_disk, PoissonDiskSampling};

/// Trait for position sampling over `[0, extent.x) × [0, extent.y)`.
pub trait PositionSampling: Send + Sync {
    fn generate(
        &self,
        domain_extent: Vector2<f32>,
        rng: &mut dyn RngCore,
    ) -> Result<Vec<Vector2<f32>>>;
}

/// Generate a random float in the range [0, 1).
///
/// Uses the top 24 bits of one `u32` draw so every result is exactly representable
/// and strictly below `1.0`.
#[inline]
pub(crate) fn rand01(rng: &mut dyn RngCore) -> f32 {
    (rng.next_u32() >> 8) as f32 * (1.0 / (1u32 << 24) as f32)
}


#[cfg(test)]
mod tests {
    use super::test_rng::SequenceRng;
    use super::*;

    struct FixedRng {
        value: u32,
    }

    impl RngCore for FixedRng {
        fn next_u32(&mut self) -> u32 {
            self.value
        }

        fn next_u64(&mut self) -> u64 {
            self.value as u64
        }

        fn fill_bytes(&mut self, dest: &mut [u8]) {
            let bytes = self.value.to_le_bytes();
            for (i, b) in dest.iter_mut().enumerate() {
                *b = bytes[i % 4];
            }
        }
    }

    #[test]
    fn rand01_returns_zero_for_zero_input() {
        let mut rng = FixedRng { value: 0 };
        assert_eq!(rand01(&mut rng), 0.0);
    }

    #[test]
    fn rand01_stays_below_one_for_max_input() {
        let mut rng = FixedRng { value: u32::MAX };
        let result = rand01(&mut rng);
        assert!(result < 1.0);
        assert!(result > 0.999_999);
    }

    #[test]
    fn rand01_distribution_properties() {
        let mut rng = FixedRng {
            value: u32::MAX / 2,
        };
        let result = rand01(&mut rng);
        assert!((result - 0.5).abs() < 0.001);
    }

    #[test]
    fn sequence_rng_reproduces_unit_draws() {
        let mut rng = SequenceRng::from_unit_draws(&[0.1, 0.5, 0.9]);
        assert!((rand01(&mut rng) - 0.1).abs() < 1e-6);
        assert_eq!(rand01(&mut rng), 0.5);
        assert!((rand01(&mut rng) - 0.9).abs() < 1e-6);
        assert!((rand01(&mut rng) - 0.1).abs() < 1e-6);
    }
}
