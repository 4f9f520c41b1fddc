//! Initial site placement and weighting
//!
//! A simulation asks its position strategy for one starting point per site
//! and its weight strategy for one starting power weight per site. Plain
//! closures work as strategies too.

use glam::DVec2;
use rand::{Rng, RngCore};
use std::f64::consts::PI;
use tracing::trace;

use crate::diagram::Boundary;
use crate::geometry::polygon;

/// Attempts of rejection sampling before settling for the clip centroid
const MAX_SAMPLING_ATTEMPTS: usize = 10_000;

/// Chooses the starting position of each site
pub trait PositionStrategy {
    /// Position of site `index` out of `count`
    fn position(
        &mut self,
        index: usize,
        count: usize,
        boundary: &Boundary,
        rng: &mut dyn RngCore,
    ) -> DVec2;
}

impl<F> PositionStrategy for F
where
    F: FnMut(usize, usize, &Boundary, &mut dyn RngCore) -> DVec2,
{
    fn position(
        &mut self,
        index: usize,
        count: usize,
        boundary: &Boundary,
        rng: &mut dyn RngCore,
    ) -> DVec2 {
        self(index, count, boundary, rng)
    }
}

/// Chooses the starting power weight of each site
pub trait WeightStrategy {
    /// Weight of site `index` out of `count`
    fn weight(&mut self, index: usize, count: usize, boundary: &Boundary) -> f64;
}

impl<F> WeightStrategy for F
where
    F: FnMut(usize, usize, &Boundary) -> f64,
{
    fn weight(&mut self, index: usize, count: usize, boundary: &Boundary) -> f64 {
        self(index, count, boundary)
    }
}

/// Uniform position inside the clip polygon, by rejection sampling over its
/// extent
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RandomPosition;

impl PositionStrategy for RandomPosition {
    fn position(
        &mut self,
        _index: usize,
        _count: usize,
        boundary: &Boundary,
        rng: &mut dyn RngCore,
    ) -> DVec2 {
        let [min, _] = boundary.extent();
        let size = boundary.size();
        for _ in 0..MAX_SAMPLING_ATTEMPTS {
            let p = min + size * DVec2::new(rng.gen::<f64>(), rng.gen::<f64>());
            if boundary.contains(p) {
                return p;
            }
        }
        trace!("rejection sampling exhausted, using the clip centroid");
        boundary.centroid()
    }
}

/// Sites spread evenly on a circle around the clip centroid
///
/// The circle's radius is half the distance from the centroid to the
/// nearest clip edge. Every coordinate gets a jitter of at most ±5e-4 so no
/// two layouts are exactly symmetric.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PiePosition {
    /// Angle of the first site, in radians
    pub start_angle: f64,
}

impl PiePosition {
    /// Pie layout starting at `start_angle`
    pub fn new(start_angle: f64) -> Self {
        Self { start_angle }
    }
}

impl PositionStrategy for PiePosition {
    fn position(
        &mut self,
        index: usize,
        count: usize,
        boundary: &Boundary,
        rng: &mut dyn RngCore,
    ) -> DVec2 {
        let center = boundary.centroid();
        let radius = polygon::min_distance_to_edges(boundary.clip(), center) / 2.0;
        let angle = self.start_angle + index as f64 * 2.0 * PI / count.max(1) as f64;
        let jitter = DVec2::new(rng.gen::<f64>() - 0.5, rng.gen::<f64>() - 0.5) * 1e-3;
        center + DVec2::new(angle.cos(), angle.sin()) * radius + jitter
    }
}

/// Every site starts with half the average cell area as its weight
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct HalfAverageArea;

impl WeightStrategy for HalfAverageArea {
    fn weight(&mut self, _index: usize, count: usize, boundary: &Boundary) -> f64 {
        boundary.area() / count.max(1) as f64 / 2.0
    }
}
