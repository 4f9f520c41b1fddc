//! Voronoi map simulation
//!
//! Fits the cell areas of a set of sibling sites to their values. Each tick
//! moves every site towards its cell centroid, rescales its power weight by
//! the ratio of targeted to current area and recomputes the diagram, until
//! the total area error drops below the convergence threshold or the
//! iteration budget runs out.
//!
//! # Example
//!
//! ```
//! use voronoi_treemap::*;
//!
//! let config = SimulationConfig::with_seed(42);
//! let mut simulation = VoronoiMapSimulation::new(
//!     vec![10.0, 20.0, 30.0],
//!     |v: &f64| *v,
//!     Boundary::from_size(100.0, 100.0).unwrap(),
//!     config,
//! )
//! .unwrap();
//!
//! let state = simulation.run().unwrap();
//! assert!(state.ended);
//! assert_eq!(state.polygons.len(), 3);
//! ```

pub mod flicker;
pub mod initial;
pub mod overweight;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use glam::DVec2;
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::time::Instant;
use tracing::{debug, info, info_span};

use crate::config::SimulationConfig;
use crate::diagram::{Boundary, CellPolygon, WeightedSite, WeightedVoronoi};
use crate::error::{Result, VoronoiError};
use crate::geometry::EPSILON;

pub use flicker::FlickeringMitigation;
pub use initial::{HalfAverageArea, PiePosition, PositionStrategy, RandomPosition, WeightStrategy};
pub use overweight::{correct_overweight, OverweightStrategy, MAX_FIXES};

/// Position damping per unit of flicker ratio
const POSITION_FLICKER_INFLUENCE: f64 = 0.5;
/// Weight adaptation bound per tick, narrowed by the flicker ratio
const WEIGHT_FLICKER_INFLUENCE: f64 = 0.1;

/// Lifecycle of a simulation
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimulationStatus {
    /// No diagram computed yet
    Uninitialized,
    /// Initialized, not yet within tolerance
    Running,
    /// Area error fell below the convergence threshold
    Converged,
    /// Iteration budget used up before converging
    Exhausted,
}

impl SimulationStatus {
    /// Whether further ticks are no-ops
    pub fn is_terminal(self) -> bool {
        matches!(self, SimulationStatus::Converged | SimulationStatus::Exhausted)
    }
}

/// Per-site state of a simulation
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct MapPoint {
    /// Index of the site's datum
    pub index: usize,
    /// Current position
    pub position: DVec2,
    /// Current power weight, never below [`EPSILON`]
    pub weight: f64,
    /// Datum value after the minimum-ratio floor
    pub value: f64,
    /// Area the site's cell should end up with
    pub targeted_area: f64,
}

impl WeightedSite for MapPoint {
    fn position(&self) -> DVec2 {
        self.position
    }

    fn weight(&self) -> f64 {
        self.weight
    }
}

/// Snapshot of a simulation
#[derive(Debug, Clone, Copy)]
pub struct SimulationState<'a> {
    /// Whether the simulation reached a terminal status
    pub ended: bool,
    /// Current status
    pub status: SimulationStatus,
    /// Ticks performed since initialization
    pub iteration_count: usize,
    /// Total area error over the clip area (NaN before initialization)
    pub convergence_ratio: f64,
    /// Current cells, one per site in site order
    pub polygons: &'a [CellPolygon],
}

/// Progress callbacks of [`VoronoiMapSimulation::run_with_observer`]
pub trait SimulationObserver {
    /// Called after every tick
    fn on_tick(&mut self, _state: &SimulationState<'_>) {}

    /// Called once when the simulation reaches a terminal status
    fn on_end(&mut self, _state: &SimulationState<'_>) {}
}

/// Area-fitting simulation over one set of sibling data
pub struct VoronoiMapSimulation<T, R: RngCore = ChaCha8Rng> {
    config: SimulationConfig,
    diagram: WeightedVoronoi,
    data: Vec<T>,
    values: Vec<f64>,
    rng: R,
    initial_position: Box<dyn PositionStrategy>,
    initial_weight: Box<dyn WeightStrategy>,
    flickering: FlickeringMitigation,
    points: Vec<MapPoint>,
    polygons: Vec<CellPolygon>,
    status: SimulationStatus,
    iteration_count: usize,
    total_area: f64,
    area_error: f64,
}

impl<T> VoronoiMapSimulation<T, ChaCha8Rng> {
    /// Simulation seeded from `config.seed`
    ///
    /// # Arguments
    ///
    /// * `data` - One datum per site
    /// * `value` - Accessor of each datum's value; cell areas end up
    ///   proportional to it
    /// * `boundary` - Region the cells tile
    /// * `config` - Tunables
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` when a value is negative or not finite, or
    /// when no value is positive.
    pub fn new(
        data: Vec<T>,
        value: impl Fn(&T) -> f64,
        boundary: Boundary,
        config: SimulationConfig,
    ) -> Result<Self> {
        let rng = ChaCha8Rng::seed_from_u64(config.seed);
        Self::with_rng(data, value, boundary, config, rng)
    }
}

impl<T, R: RngCore> VoronoiMapSimulation<T, R> {
    /// Simulation drawing its randomness from `rng` instead of the seed
    pub fn with_rng(
        data: Vec<T>,
        value: impl Fn(&T) -> f64,
        boundary: Boundary,
        config: SimulationConfig,
        rng: R,
    ) -> Result<Self> {
        let values: Vec<f64> = data.iter().map(value).collect();
        if let Some(bad) = values.iter().find(|v| !(v.is_finite() && **v >= 0.0)) {
            return Err(VoronoiError::InvalidInput(format!(
                "values must be finite and non-negative (got {})",
                bad
            )));
        }
        if !data.is_empty() && !values.iter().any(|&v| v > 0.0) {
            return Err(VoronoiError::InvalidInput("all values are zero".into()));
        }

        Ok(Self {
            config,
            diagram: WeightedVoronoi::new(boundary),
            data,
            values,
            rng,
            initial_position: Box::new(RandomPosition),
            initial_weight: Box::new(HalfAverageArea),
            flickering: FlickeringMitigation::new(),
            points: Vec::new(),
            polygons: Vec::new(),
            status: SimulationStatus::Uninitialized,
            iteration_count: 0,
            total_area: 0.0,
            area_error: f64::NAN,
        })
    }

    /// Replace the initial position strategy; resets the simulation
    pub fn initial_position(mut self, strategy: impl PositionStrategy + 'static) -> Self {
        self.initial_position = Box::new(strategy);
        self.status = SimulationStatus::Uninitialized;
        self
    }

    /// Replace the initial weight strategy; resets the simulation
    pub fn initial_weight(mut self, strategy: impl WeightStrategy + 'static) -> Self {
        self.initial_weight = Box::new(strategy);
        self.status = SimulationStatus::Uninitialized;
        self
    }

    /// Configuration in use
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Region the cells tile
    pub fn boundary(&self) -> &Boundary {
        self.diagram.boundary()
    }

    /// The simulated data, in site order
    pub fn data(&self) -> &[T] {
        &self.data
    }

    /// Current per-site state (empty before initialization)
    pub fn points(&self) -> &[MapPoint] {
        &self.points
    }

    /// Current status
    pub fn status(&self) -> SimulationStatus {
        self.status
    }

    /// Snapshot of the current state
    pub fn state(&self) -> SimulationState<'_> {
        SimulationState {
            ended: self.status.is_terminal(),
            status: self.status,
            iteration_count: self.iteration_count,
            convergence_ratio: self.area_error / self.total_area,
            polygons: &self.polygons,
        }
    }

    /// Place the sites and compute the first diagram
    ///
    /// Called by the first [`tick`](Self::tick) when needed; calling it again
    /// restarts the simulation from fresh initial positions.
    pub fn initialize(&mut self) -> Result<()> {
        let boundary = self.diagram.boundary().clone();
        let count = self.data.len();
        self.total_area = boundary.area();
        self.flickering.clear().set_total_area(self.total_area);
        self.iteration_count = 0;

        let max_value = self.values.iter().copied().fold(0.0, f64::max);
        let min_value = max_value * self.config.min_weight_ratio;
        let floored: Vec<f64> = self.values.iter().map(|&v| v.max(min_value)).collect();
        let total_value: f64 = floored.iter().sum();

        let mut points = Vec::with_capacity(count);
        for (index, &value) in floored.iter().enumerate() {
            let mut position = self
                .initial_position
                .position(index, count, &boundary, &mut self.rng);
            if !boundary.contains(position) {
                position = RandomPosition.position(index, count, &boundary, &mut self.rng);
            }
            let weight = self.initial_weight.weight(index, count, &boundary);
            points.push(MapPoint {
                index,
                position,
                weight: weight.max(EPSILON),
                value,
                targeted_area: self.total_area * value / total_value,
            });
        }
        self.points = points;

        correct_overweight(&mut self.points, self.config.overweight_strategy)?;
        self.polygons = self.compute_cells()?;
        self.area_error = self.compute_area_error();
        self.status = SimulationStatus::Running;
        debug!(sites = count, total_area = self.total_area, "simulation initialized");
        Ok(())
    }

    /// Perform one iteration
    ///
    /// Does nothing once the simulation has ended.
    ///
    /// # Errors
    ///
    /// Any diagram error, `OverweightCorrection` when weights cannot be
    /// repaired, or `InvariantViolation` when a site lost its cell. The
    /// simulation should be discarded after an error.
    pub fn tick(&mut self) -> Result<()> {
        if self.status.is_terminal() {
            return Ok(());
        }
        if self.status == SimulationStatus::Uninitialized {
            self.initialize()?;
        }

        let flicker = self.flickering.ratio();
        self.adapt_positions(flicker);
        correct_overweight(&mut self.points, self.config.overweight_strategy)?;
        self.polygons = self.compute_cells()?;

        self.adapt_weights(flicker);
        correct_overweight(&mut self.points, self.config.overweight_strategy)?;
        self.polygons = self.compute_cells()?;

        self.iteration_count += 1;
        self.area_error = self.compute_area_error();
        self.flickering.add(self.area_error);

        self.status = if self.area_error < self.config.convergence_ratio * self.total_area {
            SimulationStatus::Converged
        } else if self.iteration_count >= self.config.max_iteration_count {
            SimulationStatus::Exhausted
        } else {
            SimulationStatus::Running
        };
        debug!(
            iteration = self.iteration_count,
            area_error = self.area_error,
            flicker,
            "tick"
        );
        Ok(())
    }

    /// Tick until the simulation ends
    pub fn run(&mut self) -> Result<SimulationState<'_>> {
        self.run_with_observer(&mut NoopObserver)
    }

    /// Tick until the simulation ends, reporting every step to `observer`
    pub fn run_with_observer(
        &mut self,
        observer: &mut dyn SimulationObserver,
    ) -> Result<SimulationState<'_>> {
        let span = info_span!("voronoi_map", sites = self.data.len());
        let _enter = span.enter();
        let start = Instant::now();

        while !self.status.is_terminal() {
            self.tick()?;
            observer.on_tick(&self.state());
        }
        let state = self.state();
        observer.on_end(&state);

        info!(
            iterations = state.iteration_count,
            status = ?state.status,
            convergence_ratio = state.convergence_ratio,
            elapsed = ?start.elapsed(),
            "simulation finished"
        );
        Ok(state)
    }

    /// Consume the simulation, pairing every datum with its cell
    pub fn into_cells(self) -> Vec<(T, CellPolygon)> {
        self.data.into_iter().zip(self.polygons).collect()
    }

    fn compute_cells(&self) -> Result<Vec<CellPolygon>> {
        let cells = self.diagram.compute(&self.points)?;
        if cells.len() < self.points.len() {
            return Err(VoronoiError::InvariantViolation(format!(
                "{} of {} sites have no area",
                self.points.len() - cells.len(),
                self.points.len()
            )));
        }
        Ok(cells)
    }

    fn adapt_positions(&mut self, flicker: f64) {
        let damping = 1.0 - POSITION_FLICKER_INFLUENCE * flicker;
        for (point, cell) in self.points.iter_mut().zip(&self.polygons) {
            let centroid = cell.centroid();
            point.position += (centroid - point.position) * damping;
        }
    }

    fn adapt_weights(&mut self, flicker: f64) {
        let lower = 1.0 - WEIGHT_FLICKER_INFLUENCE + WEIGHT_FLICKER_INFLUENCE * flicker;
        let upper = 1.0 + WEIGHT_FLICKER_INFLUENCE - WEIGHT_FLICKER_INFLUENCE * flicker;
        for (point, cell) in self.points.iter_mut().zip(&self.polygons) {
            let ratio = (point.targeted_area / cell.area()).max(lower).min(upper);
            point.weight = (point.weight * ratio).max(EPSILON);
        }
    }

    fn compute_area_error(&self) -> f64 {
        self.points
            .iter()
            .zip(&self.polygons)
            .map(|(point, cell)| (point.targeted_area - cell.area()).abs())
            .sum()
    }
}

struct NoopObserver;

impl SimulationObserver for NoopObserver {}
