//! Weighted Voronoi (power) diagrams clipped to a convex boundary
//!
//! Sites are lifted onto the paraboloid `z = x² + y² − weight`; the lower
//! convex hull of the lifted points is dual to the power diagram. Four
//! boundary sites far outside the clip region close every real cell before
//! the cells are clipped.
//!
//! # Example
//!
//! ```
//! use glam::DVec2;
//! use voronoi_treemap::{Boundary, Site, WeightedVoronoi};
//!
//! let diagram = WeightedVoronoi::new(Boundary::from_size(1.0, 1.0).unwrap());
//! let sites = [
//!     Site::new(DVec2::new(0.25, 0.5), 0.0, ()),
//!     Site::new(DVec2::new(0.75, 0.5), 0.0, ()),
//! ];
//! let cells = diagram.compute(&sites).unwrap();
//! assert_eq!(cells.len(), 2);
//! ```

pub mod boundary;
pub mod clip;
pub mod extract;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use glam::DVec2;
use rand::RngCore;
use tracing::{trace, warn};

use crate::error::Result;
use crate::geometry::polygon;
use crate::geometry::LiftedVertex;
use crate::hull::ConvexHull;

pub use boundary::{Boundary, ClipShape};
pub use clip::clip_polygon;
pub use extract::{extract_cells, RawCell};

/// Anything that can be placed in a power diagram
pub trait WeightedSite {
    /// Planar position
    fn position(&self) -> DVec2;
    /// Power weight; larger weights grow the cell
    fn weight(&self) -> f64;
}

/// A weighted site carrying caller data
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Site<T = ()> {
    /// Planar position
    pub position: DVec2,
    /// Power weight
    pub weight: f64,
    /// Caller data, returned untouched
    pub payload: T,
}

impl<T> Site<T> {
    /// Create a site
    pub fn new(position: DVec2, weight: f64, payload: T) -> Self {
        Self {
            position,
            weight,
            payload,
        }
    }
}

impl<T> WeightedSite for Site<T> {
    fn position(&self) -> DVec2 {
        self.position
    }

    fn weight(&self) -> f64 {
        self.weight
    }
}

impl WeightedSite for (DVec2, f64) {
    fn position(&self) -> DVec2 {
        self.0
    }

    fn weight(&self) -> f64 {
        self.1
    }
}

/// A clipped cell of the power diagram
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct CellPolygon {
    /// Index of the owning site in the input slice
    pub site: usize,
    /// Counter-clockwise open ring
    pub points: Vec<DVec2>,
    /// Sites whose unclipped cells share an edge with this one
    pub neighbours: Vec<usize>,
}

impl CellPolygon {
    /// Area of the cell
    pub fn area(&self) -> f64 {
        polygon::area(&self.points)
    }

    /// Area centroid of the cell
    pub fn centroid(&self) -> DVec2 {
        polygon::centroid(&self.points)
    }

    /// Whether `point` lies inside the cell
    pub fn contains(&self, point: DVec2) -> bool {
        polygon::contains(&self.points, point)
    }

    /// Number of vertices
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the cell has no vertices
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Power diagram computer bound to one clip region
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WeightedVoronoi {
    boundary: Boundary,
}

impl WeightedVoronoi {
    /// Diagram computer clipping to `boundary`
    pub fn new(boundary: Boundary) -> Self {
        Self { boundary }
    }

    /// The clip region
    pub fn boundary(&self) -> &Boundary {
        &self.boundary
    }

    /// Compute the clipped power diagram of `sites`
    ///
    /// Returns at most one cell per site, sorted by site index. Sites whose
    /// cell is empty after clipping (or that coincide with another site) are
    /// absent from the result.
    ///
    /// # Errors
    ///
    /// * `DegenerateInput` when the lifted points are all coplanar, which
    ///   includes an empty site list
    /// * `HullInvariant` when floating point trouble breaks the hull
    pub fn compute<S: WeightedSite>(&self, sites: &[S]) -> Result<Vec<CellPolygon>> {
        self.power_diagram(sites, None)
    }

    /// Same as [`compute`](Self::compute), with the hull insertion order
    /// shuffled by `rng`
    pub fn compute_with_rng<S: WeightedSite>(
        &self,
        sites: &[S],
        rng: &mut dyn RngCore,
    ) -> Result<Vec<CellPolygon>> {
        self.power_diagram(sites, Some(rng))
    }

    /// Compute the diagram of arbitrary data through accessor closures
    ///
    /// # Arguments
    ///
    /// * `data` - Items to place, one site each
    /// * `x`, `y` - Position accessors
    /// * `weight` - Weight accessor
    pub fn compute_by<D>(
        &self,
        data: &[D],
        x: impl Fn(&D) -> f64,
        y: impl Fn(&D) -> f64,
        weight: impl Fn(&D) -> f64,
    ) -> Result<Vec<CellPolygon>> {
        let sites: Vec<(DVec2, f64)> = data
            .iter()
            .map(|d| (DVec2::new(x(d), y(d)), weight(d)))
            .collect();
        self.compute(&sites)
    }

    fn power_diagram<S: WeightedSite>(
        &self,
        sites: &[S],
        rng: Option<&mut dyn RngCore>,
    ) -> Result<Vec<CellPolygon>> {
        let mut vertices: Vec<LiftedVertex> = sites
            .iter()
            .enumerate()
            .map(|(i, s)| LiftedVertex::new(s.position(), s.weight(), i))
            .collect();
        vertices.extend(self.bounding_sites(sites).map(LiftedVertex::boundary));

        let mut hull = ConvexHull::new(vertices);
        if let Some(rng) = rng {
            hull.shuffle(rng);
        }
        hull.compute()?;

        let raw = extract_cells(&hull)?;
        let clip = self.boundary.clip();
        let mut cells: Vec<CellPolygon> = Vec::with_capacity(raw.len());
        for cell in raw {
            let points = clip_polygon(&cell.polygon, clip);
            if points.len() < 3 || polygon::area(&points) <= 0.0 {
                warn!(site = cell.site, "cell vanished after clipping");
                continue;
            }
            cells.push(CellPolygon {
                site: cell.site,
                points,
                neighbours: cell.neighbours,
            });
        }
        cells.sort_by_key(|c| c.site);

        trace!(sites = sites.len(), cells = cells.len(), "power diagram computed");
        Ok(cells)
    }

    /// Corners of the box three times the size of the clip and sites extent
    fn bounding_sites<S: WeightedSite>(&self, sites: &[S]) -> [DVec2; 4] {
        let [mut min, mut max] = self.boundary.extent();
        for site in sites {
            let p = site.position();
            if p.is_finite() {
                min = min.min(p);
                max = max.max(p);
            }
        }
        let size = max - min;
        let (x0, x1) = (min.x - size.x, max.x + size.x);
        let (y0, y1) = (min.y - size.y, max.y + size.y);
        [
            DVec2::new(x0, y0),
            DVec2::new(x1, y0),
            DVec2::new(x1, y1),
            DVec2::new(x0, y1),
        ]
    }
}
