//! Clip boundaries
//!
//! A [`Boundary`] is a pure value: the normalized (convex, counter-clockwise)
//! clip polygon together with its extent and size. Every diagram, simulation
//! and treemap level derives its own from a polygon, an extent or a size.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use glam::DVec2;
use std::f64::consts::PI;

use crate::error::{Result, VoronoiError};
use crate::geometry::polygon::{self, Winding};

/// Convex clip region of a diagram
///
/// Serializes as its clip ring. Deserializing goes through
/// [`Boundary::from_polygon`], so stored rings are normalized again.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "Vec<DVec2>", into = "Vec<DVec2>"))]
#[derive(Debug, Clone, PartialEq)]
pub struct Boundary {
    clip: Vec<DVec2>,
    extent: [DVec2; 2],
    size: DVec2,
}

impl Boundary {
    /// Boundary from an explicit polygon
    ///
    /// Clockwise rings are reversed; non-convex rings are replaced by their
    /// convex hull. A closing point (first repeated as last) is dropped.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if the polygon has fewer than 3 distinct
    /// vertices or no area.
    pub fn from_polygon(points: &[DVec2]) -> Result<Self> {
        let ring = polygon::open(points);
        if ring.len() < 3 {
            return Err(VoronoiError::InvalidInput(format!(
                "clip polygon needs at least 3 vertices (got {})",
                ring.len()
            )));
        }
        if ring.iter().any(|p| !p.is_finite()) {
            return Err(VoronoiError::InvalidInput("clip polygon has non-finite vertices".into()));
        }

        let clip = match polygon::convex_winding(ring) {
            Some(Winding::CounterClockwise) => ring.to_vec(),
            Some(Winding::Clockwise) => ring.iter().rev().copied().collect(),
            None => polygon::convex_hull(ring),
        };
        if clip.len() < 3 || polygon::signed_area(&clip) <= 0.0 {
            return Err(VoronoiError::InvalidInput("clip polygon has no area".into()));
        }

        let [min, max] = polygon::bounds(ring).unwrap_or([DVec2::ZERO, DVec2::ZERO]);
        Ok(Self {
            clip,
            extent: [min, max],
            size: max - min,
        })
    }

    /// Axis-aligned rectangle from `min` to `max`
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` unless `max` is strictly greater than `min` on
    /// both axes.
    pub fn from_extent(min: DVec2, max: DVec2) -> Result<Self> {
        if !(max.x > min.x && max.y > min.y) {
            return Err(VoronoiError::InvalidInput(format!(
                "empty extent [{}, {}]",
                min, max
            )));
        }
        Ok(Self {
            clip: vec![min, DVec2::new(max.x, min.y), max, DVec2::new(min.x, max.y)],
            extent: [min, max],
            size: max - min,
        })
    }

    /// Origin-anchored rectangle of the given size
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` unless both dimensions are positive.
    pub fn from_size(width: f64, height: f64) -> Result<Self> {
        Self::from_extent(DVec2::ZERO, DVec2::new(width, height))
    }

    /// Counter-clockwise convex clip polygon (open ring)
    pub fn clip(&self) -> &[DVec2] {
        &self.clip
    }

    /// Bounding box `[min, max]`
    pub fn extent(&self) -> [DVec2; 2] {
        self.extent
    }

    /// Width and height of the bounding box
    pub fn size(&self) -> DVec2 {
        self.size
    }

    /// Area of the clip polygon
    pub fn area(&self) -> f64 {
        polygon::area(&self.clip)
    }

    /// Area centroid of the clip polygon
    pub fn centroid(&self) -> DVec2 {
        polygon::centroid(&self.clip)
    }

    /// Whether `point` lies inside the clip polygon
    pub fn contains(&self, point: DVec2) -> bool {
        polygon::contains(&self.clip, point)
    }
}

impl Default for Boundary {
    /// The unit square
    fn default() -> Self {
        Self {
            clip: vec![
                DVec2::new(0.0, 0.0),
                DVec2::new(1.0, 0.0),
                DVec2::new(1.0, 1.0),
                DVec2::new(0.0, 1.0),
            ],
            extent: [DVec2::ZERO, DVec2::ONE],
            size: DVec2::ONE,
        }
    }
}

/// Preset outline shapes fitted into a `width × height` viewport
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ClipShape {
    /// Viewport inset by the padding
    Rectangle,
    /// Regular polygon approximating the inscribed circle
    Circle {
        /// Number of polygon vertices
        segments: usize,
    },
    /// Regular hexagon with a vertex at the top
    Hexagon,
}

impl Default for ClipShape {
    fn default() -> Self {
        ClipShape::Circle { segments: 64 }
    }
}

impl ClipShape {
    /// Outline polygon, counter-clockwise
    ///
    /// Round shapes are centered in the viewport with radius
    /// `min(width, height) / 2 − padding`.
    pub fn polygon(self, width: f64, height: f64, padding: f64) -> Vec<DVec2> {
        let center = DVec2::new(width / 2.0, height / 2.0);
        let radius = (width.min(height) / 2.0 - padding).max(0.0);
        let far = DVec2::new((width - padding).max(padding), (height - padding).max(padding));
        let regular = |count: usize| -> Vec<DVec2> {
            (0..count)
                .map(|i| {
                    let angle = (i as f64 / count as f64) * 2.0 * PI - PI / 2.0;
                    center + DVec2::new(angle.cos(), angle.sin()) * radius
                })
                .collect()
        };

        match self {
            ClipShape::Rectangle => vec![
                DVec2::new(padding, padding),
                DVec2::new(far.x, padding),
                far,
                DVec2::new(padding, far.y),
            ],
            ClipShape::Circle { segments } => regular(segments.max(3)),
            ClipShape::Hexagon => regular(6),
        }
    }

    /// Boundary of the shape for the given viewport
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` when the padding leaves no area.
    pub fn boundary(self, width: f64, height: f64, padding: f64) -> Result<Boundary> {
        Boundary::from_polygon(&self.polygon(width, height, padding))
    }
}

impl TryFrom<Vec<DVec2>> for Boundary {
    type Error = VoronoiError;

    fn try_from(points: Vec<DVec2>) -> Result<Self> {
        Self::from_polygon(&points)
    }
}

impl From<Boundary> for Vec<DVec2> {
    fn from(boundary: Boundary) -> Self {
        boundary.clip
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::assert_approx_eq;

    #[test]
    fn test_clockwise_polygon_is_reversed() {
        let cw = [
            DVec2::new(0.0, 0.0),
            DVec2::new(0.0, 1.0),
            DVec2::new(1.0, 1.0),
            DVec2::new(1.0, 0.0),
        ];
        let boundary = Boundary::from_polygon(&cw).unwrap();
        assert!(polygon::signed_area(boundary.clip()) > 0.0);
        assert_approx_eq!(f64, boundary.area(), 1.0);
        assert_eq!(boundary.extent(), [DVec2::ZERO, DVec2::ONE]);
    }

    #[test]
    fn test_non_convex_polygon_is_wrapped() {
        let notched = [
            DVec2::new(0.0, 0.0),
            DVec2::new(2.0, 0.0),
            DVec2::new(2.0, 2.0),
            DVec2::new(1.0, 1.0),
            DVec2::new(0.0, 2.0),
        ];
        let boundary = Boundary::from_polygon(&notched).unwrap();
        assert_eq!(boundary.clip().len(), 4);
        assert_approx_eq!(f64, boundary.area(), 4.0);
    }

    #[test]
    fn test_closed_ring_accepted() {
        let closed = [
            DVec2::new(0.0, 0.0),
            DVec2::new(1.0, 0.0),
            DVec2::new(0.0, 1.0),
            DVec2::new(0.0, 0.0),
        ];
        let boundary = Boundary::from_polygon(&closed).unwrap();
        assert_eq!(boundary.clip().len(), 3);
        assert_approx_eq!(f64, boundary.area(), 0.5);
    }

    #[test]
    fn test_invalid_polygons() {
        assert!(Boundary::from_polygon(&[DVec2::ZERO, DVec2::ONE]).is_err());
        let collinear = [DVec2::ZERO, DVec2::ONE, DVec2::splat(2.0)];
        assert!(Boundary::from_polygon(&collinear).is_err());
    }

    #[test]
    fn test_extent_and_size() {
        let boundary = Boundary::from_extent(DVec2::new(1.0, 2.0), DVec2::new(4.0, 6.0)).unwrap();
        assert_eq!(boundary.size(), DVec2::new(3.0, 4.0));
        assert_approx_eq!(f64, boundary.area(), 12.0);

        let boundary = Boundary::from_size(2.0, 3.0).unwrap();
        assert_eq!(boundary.extent(), [DVec2::ZERO, DVec2::new(2.0, 3.0)]);
        assert!(Boundary::from_size(0.0, 3.0).is_err());
    }

    #[test]
    fn test_clip_shapes() {
        let circle = ClipShape::default().polygon(200.0, 100.0, 10.0);
        assert_eq!(circle.len(), 64);
        for p in &circle {
            assert_approx_eq!(f64, p.distance(DVec2::new(100.0, 50.0)), 40.0, epsilon = 1e-9);
        }
        assert!(polygon::signed_area(&circle) > 0.0);

        let hexagon = ClipShape::Hexagon.boundary(100.0, 100.0, 0.0).unwrap();
        assert_eq!(hexagon.clip().len(), 6);

        let rectangle = ClipShape::Rectangle.boundary(100.0, 50.0, 5.0).unwrap();
        assert_approx_eq!(f64, rectangle.area(), 90.0 * 40.0);

        assert!(ClipShape::Hexagon.boundary(10.0, 10.0, 6.0).is_err());
        assert!(ClipShape::Rectangle.boundary(10.0, 10.0, 6.0).is_err());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_deserialize_normalizes_ring() {
        let json = "[[0.0,0.0],[0.0,1.0],[1.0,1.0],[1.0,0.0]]";
        let boundary: Boundary = serde_json::from_str(json).unwrap();
        assert_eq!(polygon::convex_winding(boundary.clip()), Some(Winding::CounterClockwise));
        assert_approx_eq!(f64, boundary.area(), 1.0);
        assert_eq!(boundary.extent(), [DVec2::ZERO, DVec2::ONE]);

        let json = serde_json::to_string(&boundary).unwrap();
        let restored: Boundary = serde_json::from_str(&json).unwrap();
        assert_eq!(boundary, restored);

        assert!(serde_json::from_str::<Boundary>("[[0.0,0.0],[1.0,0.0]]").is_err());
    }
}
