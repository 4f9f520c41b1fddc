//! Weighted Voronoi diagrams and Voronoi treemaps
//!
//! A standalone library computing power diagrams clipped to convex
//! boundaries, fitting cell areas to values with an iterative simulation,
//! and laying out whole value hierarchies as nested Voronoi treemaps.
//!
//! # Quick Start
//!
//! ```rust
//! use voronoi_treemap::*;
//!
//! let mut root = HierarchyNode::branch(
//!     "root",
//!     vec![
//!         HierarchyNode::leaf(10.0, "small"),
//!         HierarchyNode::leaf(30.0, "large"),
//!     ],
//! );
//!
//! let boundary = ClipShape::Hexagon.boundary(400.0, 400.0, 10.0).unwrap();
//! let config = TreemapConfig::new(SimulationConfig::with_seed(42));
//! VoronoiTreemap::new(boundary, config).build(&mut root).unwrap();
//!
//! for leaf in root.leaves() {
//!     println!("{}: {:?}", leaf.data, leaf.polygon);
//! }
//! ```
//!
//! # Features
//!
//! - `serde`: Enables serialization support for configuration, boundaries,
//!   cells and hierarchies

// Modules
pub mod error;
pub mod config;
pub mod geometry;
pub mod hull;
pub mod diagram;
pub mod simulation;
pub mod treemap;

// Re-export core types for convenience
pub use error::{VoronoiError, Result};
pub use config::{SimulationConfig, SimulationConfigBuilder, TreemapConfig};
pub use diagram::{Boundary, CellPolygon, ClipShape, Site, WeightedSite, WeightedVoronoi};
pub use simulation::{
    FlickeringMitigation, HalfAverageArea, MapPoint, OverweightStrategy, PiePosition,
    PositionStrategy, RandomPosition, SimulationObserver, SimulationState, SimulationStatus,
    VoronoiMapSimulation, WeightStrategy,
};
pub use treemap::{HierarchyNode, VoronoiTreemap};

// Re-export glam::DVec2 for convenience
pub use glam::DVec2;
