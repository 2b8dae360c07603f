//! Poisson disk position sampling strategy.
//!
//! Dart throwing around an active list, accelerated by a background grid whose cells
//! (`radius / √2` wide) hold at most one accepted point. Each active point receives a
//! fixed budget of candidates drawn from the annulus `[radius, 2 * radius]`; every
//! candidate that keeps its distance to all accepted points becomes a new point, and the
//! active point retires once its budget is spent. Output is in acceptance order.
use std::collections::VecDeque;
use std::f32::consts::TAU;

use glam::Vec2;
use mint::Vector2;
use rand::RngCore;

use crate::error::{Error, Result};
use crate::sampling::{rand01, PositionSampling};

/// Default number of candidates tried around each active point.
pub const DEFAULT_MAX_ATTEMPTS: usize = 30;

/// Upper bound on background grid cells; radii too small for the domain are rejected.
pub const MAX_GRID_CELLS: usize = 1 << 24;

/// Poisson disk sampling strategy.
#[derive(Debug, Clone)]
pub struct PoissonDiskSampling {
    /// Minimum distance between samples in grid units.
    pub radius: f32,
    /// Candidates tried around each active point before it retires.
    pub max_attempts: usize,
}

impl PositionSampling for PoissonDiskSampling {
    fn generate(
        &self,
        domain_extent: Vector2<f32>,
        rng: &mut dyn RngCore,
    ) -> Result<Vec<Vector2<f32>>> {
        let points = poisson_disk(
            self.radius,
            Vec2::from(domain_extent),
            self.max_attempts,
            rng,
        )?;
        Ok(points.into_iter().map(Into::into).collect())
    }
}

impl PoissonDiskSampling {
    /// Create a new PoissonDiskSampling with specified radius and the default attempt budget.
    pub fn new(radius: f32) -> Self {
        Self {
            radius,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    /// Sets the per-point attempt budget.
    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts;
        self
    }
}

/// Generates points over `[0, domain.x) × [0, domain.y)` with pairwise distance `>= radius`.
pub fn poisson_disk(
    radius: f32,
    domain: Vec2,
    max_attempts: usize,
    rng: &mut dyn RngCore,
) -> Result<Vec<Vec2>> {
    if !radius.is_finite() || radius <= 0.0 {
        return Err(Error::invalid_parameter(
            "poisson_disk",
            format!("radius must be finite and > 0, got {radius}"),
        ));
    }
    if !domain.is_finite() || domain.x <= 0.0 || domain.y <= 0.0 {
        return Err(Error::invalid_parameter(
            "poisson_disk",
            format!("domain must be finite and > 0 in both components, got {domain}"),
        ));
    }
    if max_attempts == 0 {
        return Err(Error::invalid_parameter(
            "poisson_disk",
            "max_attempts must be > 0",
        ));
    }

    let mut sampler = PoissonDiskSampler::try_new(radius, domain)?;
    Ok(sampler.generate(rng, max_attempts))
}

struct PoissonDiskSampler {
    radius: f32,
    radius_squared: f32,
    cell_size: f32,
    grid_width: usize,
    grid_height: usize,
    grid: Vec<Option<Vec2>>,
    active_list: VecDeque<Vec2>,
    bounds: Vec2,
}

impl PoissonDiskSampler {
    fn try_new(radius: f32, bounds: Vec2) -> Result<Self> {
        debug_assert!(radius > 0.0);
        let radius_squared = radius * radius;
        let cell_size = radius / std::f32::consts::SQRT_2;
        let grid_width = ((bounds.x / cell_size).ceil() as usize).saturating_add(1);
        let grid_height = ((bounds.y / cell_size).ceil() as usize).saturating_add(1);
        let cells = grid_width
            .checked_mul(grid_height)
            .filter(|&cells| cells <= MAX_GRID_CELLS)
            .ok_or_else(|| {
                Error::invalid_parameter(
                    "poisson_disk",
                    format!(
                        "radius {radius} needs a {grid_width}x{grid_height} acceleration grid \
                         over {bounds}, more than {MAX_GRID_CELLS} cells"
                    ),
                )
            })?;

        Ok(Self {
            radius,
            radius_squared,
            cell_size,
            grid_width,
            grid_height,
            grid: vec![None; cells],
            active_list: VecDeque::new(),
            bounds,
        })
    }

    #[inline]
    fn grid_index(&self, x: usize, y: usize) -> usize {
        y * self.grid_width + x
    }

    #[inline]
    fn point_to_grid(&self, point: Vec2) -> (usize, usize) {
        let x = ((point.x / self.cell_size).floor() as isize)
            .clamp(0, self.grid_width as isize - 1) as usize;
        let y = ((point.y / self.cell_size).floor() as isize)
            .clamp(0, self.grid_height as isize - 1) as usize;
        (x, y)
    }

    fn in_bounds(&self, point: Vec2) -> bool {
        point.x >= 0.0 && point.x < self.bounds.x && point.y >= 0.0 && point.y < self.bounds.y
    }

    fn is_valid_point(&self, point: Vec2) -> bool {
        if !self.in_bounds(point) {
            return false;
        }

        let (gx, gy) = self.point_to_grid(point);
        let start_x = gx.saturating_sub(2);
        let end_x = (gx + 3).min(self.grid_width);
        let start_y = gy.saturating_sub(2);
        let end_y = (gy + 3).min(self.grid_height);

        for y in start_y..end_y {
            for x in start_x..end_x {
                if let Some(existing) = self.grid[self.grid_index(x, y)] {
                    if point.distance_squared(existing) < self.radius_squared {
                        return false;
                    }
                }
            }
        }

        true
    }

    fn add_point(&mut self, point: Vec2) {
        let (gx, gy) = self.point_to_grid(point);
        let idx = self.grid_index(gx, gy);
        self.grid[idx] = Some(point);
        self.active_list.push_back(point);
    }

    fn candidate_around(&self, rng: &mut dyn RngCore, point: Vec2) -> Vec2 {
        let angle = rand01(rng) * TAU;
        let distance = self.radius + rand01(rng) * self.radius;
        Vec2::new(
            point.x + angle.cos() * distance,
            point.y + angle.sin() * distance,
        )
    }

    fn generate(&mut self, rng: &mut dyn RngCore, max_attempts: usize) -> Vec<Vec2> {
        let initial = Vec2::new(rand01(rng) * self.bounds.x, rand01(rng) * self.bounds.y);
        self.add_point(initial);
        let mut points = vec![initial];

        while let Some(active) = self.active_list.pop_front() {
            for _ in 0..max_attempts {
                let candidate = self.candidate_around(rng, active);
                if self.is_valid_point(candidate) {
                    self.add_point(candidate);
                    points.push(candidate);
                }
            }
        }

        points
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    fn pairwise_min_distance(points: &[Vec2]) -> f32 {
        let mut min = f32::MAX;
        for i in 0..points.len() {
            for j in (i + 1)..points.len() {
                min = min.min(points[i].distance(points[j]));
            }
        }
        min
    }

    #[test]
    fn sampler_initializes_grid_dimensions() {
        let sampler = PoissonDiskSampler::try_new(0.5, Vec2::new(2.0, 1.0)).unwrap();
        assert_eq!(
            sampler.grid_width,
            ((2.0 / sampler.cell_size).ceil() as usize) + 1
        );
        assert_eq!(
            sampler.grid_height,
            ((1.0 / sampler.cell_size).ceil() as usize) + 1
        );
    }

    #[test]
    fn is_valid_point_rejects_close_neighbors() {
        let mut sampler = PoissonDiskSampler::try_new(1.0, Vec2::new(4.0, 4.0)).unwrap();
        sampler.add_point(Vec2::new(2.0, 2.0));

        assert!(!sampler.is_valid_point(Vec2::new(2.5, 2.0)));
        assert!(sampler.is_valid_point(Vec2::new(3.5, 3.5)));
        assert!(!sampler.is_valid_point(Vec2::new(-0.1, 1.0)));
        assert!(!sampler.is_valid_point(Vec2::new(1.0, 4.0)));
    }

    #[test]
    fn radius_five_over_fifty_square() {
        let mut rng = StdRng::seed_from_u64(5);
        let radius = 5.0;
        let domain = Vec2::new(50.0, 50.0);
        let points = poisson_disk(radius, domain, 30, &mut rng).unwrap();

        for p in &points {
            assert!(p.x >= 0.0 && p.x < 50.0);
            assert!(p.y >= 0.0 && p.y < 50.0);
        }
        assert!(pairwise_min_distance(&points) >= radius - 1e-4);

        // Lower bound: a near-maximal set covers the domain with discs of `radius`.
        // Upper bound: discs of `radius / 2` are disjoint and fit in the padded domain.
        let area = domain.x * domain.y;
        let covering = area / (std::f32::consts::PI * radius * radius);
        let padded = (domain.x + radius) * (domain.y + radius);
        let packing = padded / (std::f32::consts::PI * radius * radius / 4.0);
        let n = points.len() as f32;
        assert!(n >= covering * 0.8, "too few points: {n}");
        assert!(n <= packing, "too many points: {n}");
    }

    #[test]
    fn same_seed_same_points() {
        let a = poisson_disk(2.0, Vec2::new(30.0, 20.0), 30, &mut StdRng::seed_from_u64(9))
            .unwrap();
        let b = poisson_disk(2.0, Vec2::new(30.0, 20.0), 30, &mut StdRng::seed_from_u64(9))
            .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn first_point_is_the_seed_draw() {
        let mut rng = crate::sampling::test_rng::SequenceRng::from_unit_draws(&[0.5, 0.25]);
        let points = poisson_disk(100.0, Vec2::new(10.0, 10.0), 1, &mut rng).unwrap();
        // The radius exceeds the domain, so only the seed point fits.
        assert_eq!(points, vec![Vec2::new(5.0, 2.5)]);
    }

    #[test]
    fn trait_generates_in_domain() {
        let sampling = PoissonDiskSampling::new(0.3).with_max_attempts(10);
        let mut rng = StdRng::seed_from_u64(123);
        let points = sampling
            .generate(Vec2::new(1.0, 1.0).into(), &mut rng)
            .unwrap();
        assert!(!points.is_empty());
        for p in &points {
            assert!(p.x >= 0.0 && p.x < 1.0);
            assert!(p.y >= 0.0 && p.y < 1.0);
        }
    }

    #[test]
    fn invalid_parameters_are_rejected() {
        let mut rng = StdRng::seed_from_u64(1);
        let domain = Vec2::new(10.0, 10.0);
        for radius in [0.0, -1.0, f32::NAN, f32::INFINITY] {
            assert!(matches!(
                poisson_disk(radius, domain, 30, &mut rng),
                Err(Error::InvalidParameter { .. })
            ));
        }
        assert!(poisson_disk(1.0, Vec2::new(0.0, 10.0), 30, &mut rng).is_err());
        assert!(poisson_disk(1.0, Vec2::new(10.0, -1.0), 30, &mut rng).is_err());
        assert!(poisson_disk(1.0, domain, 0, &mut rng).is_err());
    }

    #[test]
    fn tiny_radius_is_rejected_before_allocating() {
        let mut rng = StdRng::seed_from_u64(1);
        let domain = Vec2::new(256.0, 256.0);
        for radius in [1e-9, 1e-3] {
            assert!(matches!(
                poisson_disk(radius, domain, 30, &mut rng),
                Err(Error::InvalidParameter { .. })
            ));
        }
    }
}
