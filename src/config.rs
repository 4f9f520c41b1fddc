//! Simulation and treemap configuration
//!
//! This module provides the tunables of the Voronoi map simulation and the
//! treemap builder, with a validating builder in the same style for both.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Result, VoronoiError};
use crate::simulation::OverweightStrategy;

/// Default fraction of the total area below which the area error counts as
/// converged
pub const DEFAULT_CONVERGENCE_RATIO: f64 = 0.01;
/// Default iteration cap of one simulation
pub const DEFAULT_MAX_ITERATION_COUNT: usize = 50;
/// Default floor of a site's value relative to the largest value
pub const DEFAULT_MIN_WEIGHT_RATIO: f64 = 0.01;
/// Default nesting limit of a treemap build
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Configuration of one Voronoi map simulation
///
/// The same configuration with the same sites and boundary always produces
/// the same map.
///
/// # Example
///
/// ```rust
/// use voronoi_treemap::*;
///
/// let config = SimulationConfigBuilder::new()
///     .seed(42)
///     .convergence_ratio(0.005)
///     .unwrap()
///     .max_iteration_count(200)
///     .unwrap()
///     .build()
///     .unwrap();
///
/// assert_eq!(config.seed, 42);
/// assert_eq!(config.max_iteration_count, 200);
/// ```
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationConfig {
    /// Stop once the area error falls below this fraction of the total area
    ///
    /// - 0.01: Default, visually exact
    /// - 0.001: Tighter, usually hits the iteration cap first
    pub convergence_ratio: f64,

    /// Hard cap on the number of ticks
    pub max_iteration_count: usize,

    /// Smallest value a site may have, as a fraction of the largest value
    ///
    /// Keeps tiny sites from collapsing to slivers the hull cannot resolve.
    pub min_weight_ratio: f64,

    /// How overlapping power circles get separated
    pub overweight_strategy: OverweightStrategy,

    /// Seed of the simulation's random generator
    pub seed: u64,
}

impl SimulationConfig {
    /// Defaults with an explicit seed
    pub fn with_seed(seed: u64) -> Self {
        Self {
            convergence_ratio: DEFAULT_CONVERGENCE_RATIO,
            max_iteration_count: DEFAULT_MAX_ITERATION_COUNT,
            min_weight_ratio: DEFAULT_MIN_WEIGHT_RATIO,
            overweight_strategy: OverweightStrategy::default(),
            seed,
        }
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self::with_seed(rand::random())
    }
}

/// Builder for creating SimulationConfig with validation
///
/// # Example
///
/// ```rust
/// use voronoi_treemap::*;
///
/// // Use defaults
/// let config = SimulationConfigBuilder::new().build().unwrap();
///
/// // Customize
/// let config = SimulationConfigBuilder::new()
///     .seed(7)
///     .min_weight_ratio(0.05)
///     .unwrap()
///     .overweight_strategy(OverweightStrategy::ReduceHeaviest)
///     .build()
///     .unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct SimulationConfigBuilder {
    seed: Option<u64>,
    convergence_ratio: f64,
    max_iteration_count: usize,
    min_weight_ratio: f64,
    overweight_strategy: OverweightStrategy,
}

impl SimulationConfigBuilder {
    /// Create a new builder with default values
    ///
    /// Defaults:
    /// - seed: Random
    /// - convergence_ratio: 0.01
    /// - max_iteration_count: 50
    /// - min_weight_ratio: 0.01
    /// - overweight_strategy: RaiseLightest
    pub fn new() -> Self {
        Self {
            seed: None,
            convergence_ratio: DEFAULT_CONVERGENCE_RATIO,
            max_iteration_count: DEFAULT_MAX_ITERATION_COUNT,
            min_weight_ratio: DEFAULT_MIN_WEIGHT_RATIO,
            overweight_strategy: OverweightStrategy::default(),
        }
    }

    /// Set the random seed
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the convergence ratio
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` unless `0 < ratio < 1`
    pub fn convergence_ratio(mut self, ratio: f64) -> Result<Self> {
        if !(ratio > 0.0 && ratio < 1.0) {
            return Err(VoronoiError::InvalidConfig(format!(
                "convergence ratio must be in (0, 1) (got {})",
                ratio
            )));
        }
        self.convergence_ratio = ratio;
        Ok(self)
    }

    /// Set the iteration cap
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if `count` is 0
    pub fn max_iteration_count(mut self, count: usize) -> Result<Self> {
        if count == 0 {
            return Err(VoronoiError::InvalidConfig(
                "max iteration count must be >= 1 (got 0)".into(),
            ));
        }
        self.max_iteration_count = count;
        Ok(self)
    }

    /// Set the minimum value ratio
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` unless `0 <= ratio <= 1`
    pub fn min_weight_ratio(mut self, ratio: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&ratio) {
            return Err(VoronoiError::InvalidConfig(format!(
                "min weight ratio must be in [0, 1] (got {})",
                ratio
            )));
        }
        self.min_weight_ratio = ratio;
        Ok(self)
    }

    /// Set the overweight correction strategy
    pub fn overweight_strategy(mut self, strategy: OverweightStrategy) -> Self {
        self.overweight_strategy = strategy;
        self
    }

    /// Build the configuration
    ///
    /// If no seed was provided, a random one is drawn.
    pub fn build(self) -> Result<SimulationConfig> {
        Ok(SimulationConfig {
            convergence_ratio: self.convergence_ratio,
            max_iteration_count: self.max_iteration_count,
            min_weight_ratio: self.min_weight_ratio,
            overweight_strategy: self.overweight_strategy,
            seed: self.seed.unwrap_or_else(rand::random),
        })
    }
}

impl Default for SimulationConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Configuration of a treemap build
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TreemapConfig {
    /// Settings shared by the simulation of every internal node
    pub simulation: SimulationConfig,
    /// Deepest node level the build descends to; deeper hierarchies fail
    pub max_depth: usize,
}

impl TreemapConfig {
    /// Treemap configuration around simulation settings
    pub fn new(simulation: SimulationConfig) -> Self {
        Self {
            simulation,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Set the depth limit
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if `depth` is 0
    pub fn max_depth(mut self, depth: usize) -> Result<Self> {
        if depth == 0 {
            return Err(VoronoiError::InvalidConfig(
                "max depth must be >= 1 (got 0)".into(),
            ));
        }
        self.max_depth = depth;
        Ok(self)
    }
}

impl Default for TreemapConfig {
    fn default() -> Self {
        Self::new(SimulationConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let config = SimulationConfigBuilder::new().seed(1).build().unwrap();
        assert_eq!(config, SimulationConfig::with_seed(1));
        assert_eq!(config.convergence_ratio, 0.01);
        assert_eq!(config.max_iteration_count, 50);
        assert_eq!(config.min_weight_ratio, 0.01);
        assert_eq!(config.overweight_strategy, OverweightStrategy::RaiseLightest);
    }

    #[test]
    fn test_builder_custom() {
        let config = SimulationConfigBuilder::new()
            .seed(42)
            .convergence_ratio(0.001)
            .unwrap()
            .max_iteration_count(10)
            .unwrap()
            .min_weight_ratio(0.0)
            .unwrap()
            .overweight_strategy(OverweightStrategy::ReduceHeaviest)
            .build()
            .unwrap();

        assert_eq!(config.seed, 42);
        assert_eq!(config.convergence_ratio, 0.001);
        assert_eq!(config.max_iteration_count, 10);
        assert_eq!(config.min_weight_ratio, 0.0);
        assert_eq!(config.overweight_strategy, OverweightStrategy::ReduceHeaviest);
    }

    #[test]
    fn test_builder_invalid_values() {
        assert!(SimulationConfigBuilder::new().convergence_ratio(0.0).is_err());
        assert!(SimulationConfigBuilder::new().convergence_ratio(1.0).is_err());
        assert!(SimulationConfigBuilder::new().convergence_ratio(f64::NAN).is_err());
        assert!(SimulationConfigBuilder::new().max_iteration_count(0).is_err());
        assert!(SimulationConfigBuilder::new().min_weight_ratio(-0.1).is_err());
        assert!(SimulationConfigBuilder::new().min_weight_ratio(1.5).is_err());
    }

    #[test]
    fn test_treemap_depth() {
        let config = TreemapConfig::new(SimulationConfig::with_seed(3));
        assert_eq!(config.max_depth, 64);
        assert_eq!(config.max_depth(4).unwrap().max_depth, 4);
        assert!(TreemapConfig::default().max_depth(0).is_err());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_config_serialization() {
        let config = TreemapConfig::new(SimulationConfig::with_seed(12345));
        let json = serde_json::to_string(&config).unwrap();
        let restored: TreemapConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, restored);
    }
}
