//! Geometry primitives shared by the hull, the diagram and the simulation
//!
//! Sites live in the plane (`DVec2`); the power diagram is computed on their
//! lifted images (`DVec3`) on the paraboloid `z = x² + y² − weight`.

pub mod polygon;

use glam::{DVec2, DVec3};

/// Tolerance used by every geometric predicate of the engine
pub const EPSILON: f64 = 1e-10;

/// Faces whose normal z-component is below this are downward facing
pub(crate) const DOWNWARD_NORMAL_Z: f64 = -1.425_941_439_319_091_1e-9;

/// Whether `value` is zero within [`EPSILON`]
#[inline]
pub fn epsilonesque(value: f64) -> bool {
    value.abs() <= EPSILON
}

/// Whether two vectors are parallel within [`EPSILON`]
#[inline]
pub fn linear_dependent(a: DVec3, b: DVec3) -> bool {
    let c = a.cross(b);
    epsilonesque(c.x) && epsilonesque(c.y) && epsilonesque(c.z)
}

/// Paraboloid lifting transform of a weighted site
#[inline]
pub fn lift(position: DVec2, weight: f64) -> f64 {
    position.length_squared() - weight
}

/// A weighted site lifted onto the paraboloid
///
/// `index` is the vertex's slot in the hull's point list and is what the
/// conflict graph orders by. `site` refers back to the caller's site index;
/// boundary dummies have none.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LiftedVertex {
    /// Lifted position (`z = x² + y² − weight`)
    pub position: DVec3,
    /// Power weight of the site
    pub weight: f64,
    /// Stable identity inside one hull computation
    pub index: usize,
    /// Marks the synthetic sites that bound the diagram
    pub is_boundary: bool,
    /// Index of the originating site
    pub site: Option<usize>,
}

impl LiftedVertex {
    /// Lift a user site
    pub fn new(position: DVec2, weight: f64, site: usize) -> Self {
        Self {
            position: position.extend(lift(position, weight)),
            weight,
            index: 0,
            is_boundary: false,
            site: Some(site),
        }
    }

    /// Lift a synthetic boundary site
    pub fn boundary(position: DVec2) -> Self {
        Self {
            position: position.extend(lift(position, EPSILON)),
            weight: EPSILON,
            index: 0,
            is_boundary: true,
            site: None,
        }
    }

    /// Planar position of the site
    #[inline]
    pub fn xy(&self) -> DVec2 {
        self.position.truncate()
    }
}

/// Plane `a·x + b·y + c·z + d = 0` through three lifted points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    /// Coefficient of x
    pub a: f64,
    /// Coefficient of y
    pub b: f64,
    /// Coefficient of z
    pub c: f64,
    /// Constant term
    pub d: f64,
}

impl Plane {
    /// Plane through three points
    pub fn through(p1: DVec3, p2: DVec3, p3: DVec3) -> Self {
        let n = (p2 - p1).cross(p3 - p1);
        Self {
            a: n.x,
            b: n.y,
            c: n.z,
            d: -n.dot(p1),
        }
    }

    /// The plane as `z = αx + βy + γ`, returned as `[α, β, γ]`
    pub fn z_form(&self) -> [f64; 3] {
        [-self.a / self.c, -self.b / self.c, -self.d / self.c]
    }

    /// Dual point of the plane mapped back to the site plane
    ///
    /// For a face of the lower hull this is the power diagram vertex shared
    /// by the face's three sites.
    pub fn dual_point(&self) -> DVec2 {
        let [alpha, beta, _] = self.z_form();
        DVec2::new(alpha / 2.0, beta / 2.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::assert_approx_eq;

    #[test]
    fn test_lift() {
        let v = LiftedVertex::new(DVec2::new(1.0, 2.0), 0.5, 7);
        assert_approx_eq!(f64, v.position.z, 4.5);
        assert_eq!(v.site, Some(7));
        assert!(!v.is_boundary);

        let b = LiftedVertex::boundary(DVec2::new(-1.0, 0.0));
        assert!(b.is_boundary);
        assert_eq!(b.site, None);
        assert_approx_eq!(f64, b.weight, EPSILON);
    }

    #[test]
    fn test_dual_point_is_equidistant() {
        // unweighted sites: the dual point of the lower face is the circumcenter
        let sites = [
            DVec2::new(0.0, 0.0),
            DVec2::new(2.0, 0.0),
            DVec2::new(0.0, 2.0),
        ];
        let lifted: Vec<DVec3> = sites.iter().map(|&s| s.extend(lift(s, 0.0))).collect();
        let dual = Plane::through(lifted[0], lifted[1], lifted[2]).dual_point();
        assert_approx_eq!(f64, dual.x, 1.0, epsilon = 1e-12);
        assert_approx_eq!(f64, dual.y, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_dual_point_orientation_free() {
        let p = [
            DVec3::new(0.0, 0.0, 1.0),
            DVec3::new(1.0, 0.0, 2.0),
            DVec3::new(0.0, 1.0, 3.0),
        ];
        let d1 = Plane::through(p[0], p[1], p[2]).dual_point();
        let d2 = Plane::through(p[0], p[2], p[1]).dual_point();
        assert!(d1.abs_diff_eq(d2, 1e-12));
    }

    #[test]
    fn test_linear_dependent() {
        assert!(linear_dependent(DVec3::new(1.0, 2.0, 3.0), DVec3::new(2.0, 4.0, 6.0)));
        assert!(!linear_dependent(DVec3::X, DVec3::Y));
    }
}
