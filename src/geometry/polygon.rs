//! Planar polygon predicates and measures
//!
//! Polygons are open rings of `DVec2` unless stated otherwise; a ring whose
//! last point repeats the first is "closed" and is accepted everywhere.

use glam::DVec2;

/// Orientation of a convex ring
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Winding {
    /// Positive signed area (y axis pointing up)
    CounterClockwise,
    /// Negative signed area
    Clockwise,
}

/// 2D cross product `a × b`
#[inline]
pub fn cross(a: DVec2, b: DVec2) -> f64 {
    a.x * b.y - a.y * b.x
}

/// Whether the ring's last point repeats its first
pub fn is_closed(ring: &[DVec2]) -> bool {
    match (ring.first(), ring.last()) {
        (Some(a), Some(b)) if ring.len() > 1 => a == b,
        _ => false,
    }
}

/// The ring without its closing point
pub fn open(ring: &[DVec2]) -> &[DVec2] {
    if is_closed(ring) {
        &ring[..ring.len() - 1]
    } else {
        ring
    }
}

/// Shoelace signed area, positive for counter-clockwise rings
pub fn signed_area(ring: &[DVec2]) -> f64 {
    let ring = open(ring);
    let n = ring.len();
    if n < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    let mut a = ring[n - 1];
    for &b in ring {
        sum += cross(a, b);
        a = b;
    }
    sum / 2.0
}

/// Unsigned area
pub fn area(ring: &[DVec2]) -> f64 {
    signed_area(ring).abs()
}

/// Perimeter of the ring
pub fn perimeter(ring: &[DVec2]) -> f64 {
    let ring = open(ring);
    let Some(&last) = ring.last() else {
        return 0.0;
    };
    let mut a = last;
    let mut length = 0.0;
    for &b in ring {
        length += a.distance(b);
        a = b;
    }
    length
}

/// Area centroid of the ring, independent of its orientation
///
/// Falls back to the vertex average for degenerate (zero-area) rings.
pub fn centroid(ring: &[DVec2]) -> DVec2 {
    let ring = open(ring);
    let n = ring.len();
    if n == 0 {
        return DVec2::ZERO;
    }
    let mut k = 0.0;
    let mut acc = DVec2::ZERO;
    let mut a = ring[n - 1];
    for &b in ring {
        let c = cross(a, b);
        k += c;
        acc += (a + b) * c;
        a = b;
    }
    if k == 0.0 {
        return ring.iter().copied().sum::<DVec2>() / n as f64;
    }
    acc / (3.0 * k)
}

/// Even-odd point-in-polygon test
pub fn contains(ring: &[DVec2], point: DVec2) -> bool {
    let ring = open(ring);
    let Some(&last) = ring.last() else {
        return false;
    };
    let mut inside = false;
    let mut p0 = last;
    for &p1 in ring {
        if (p1.y > point.y) != (p0.y > point.y)
            && point.x < (p0.x - p1.x) * (point.y - p1.y) / (p0.y - p1.y) + p1.x
        {
            inside = !inside;
        }
        p0 = p1;
    }
    inside
}

/// Winding of a strictly convex ring
///
/// Returns `None` when consecutive turns disagree (non-convex ring) or when
/// any three consecutive vertices are collinear.
pub fn convex_winding(ring: &[DVec2]) -> Option<Winding> {
    let ring = open(ring);
    let n = ring.len();
    if n < 3 {
        return None;
    }
    let mut sign = 0.0;
    for i in 0..n {
        let p0 = ring[i];
        let p1 = ring[(i + 1) % n];
        let p2 = ring[(i + 2) % n];
        let turn = cross(p1 - p0, p2 - p1);
        if turn == 0.0 {
            return None;
        }
        let turn = turn.signum();
        if i == 0 {
            sign = turn;
        } else if turn != sign {
            return None;
        }
    }
    if sign > 0.0 {
        Some(Winding::CounterClockwise)
    } else {
        Some(Winding::Clockwise)
    }
}

/// Convex hull of a point set (Andrew's monotone chain)
///
/// The result is counter-clockwise, open, and drops collinear points.
pub fn convex_hull(points: &[DVec2]) -> Vec<DVec2> {
    let mut sorted: Vec<DVec2> = open(points).to_vec();
    sorted.sort_by(|a, b| a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y)));
    sorted.dedup();
    if sorted.len() < 3 {
        return sorted;
    }

    let mut hull: Vec<DVec2> = Vec::with_capacity(sorted.len() + 1);
    for &p in &sorted {
        push_hull_point(&mut hull, p, 1);
    }
    let lower_len = hull.len();
    for &p in sorted.iter().rev().skip(1) {
        push_hull_point(&mut hull, p, lower_len);
    }
    hull.pop();
    hull
}

fn push_hull_point(hull: &mut Vec<DVec2>, p: DVec2, floor: usize) {
    while hull.len() > floor {
        let n = hull.len();
        if cross(hull[n - 1] - hull[n - 2], p - hull[n - 1]) > 0.0 {
            break;
        }
        hull.pop();
    }
    hull.push(p);
}

/// Intersection of segment `c→d` with the infinite line through `a→b`
///
/// Parallel inputs produce non-finite coordinates; callers check
/// `is_finite()`.
pub fn line_intersection(c: DVec2, d: DVec2, a: DVec2, b: DVec2) -> DVec2 {
    let dc = d - c;
    let ba = b - a;
    let ua = (ba.x * (c.y - a.y) - ba.y * (c.x - a.x)) / (ba.y * dc.x - ba.x * dc.y);
    c + dc * ua
}

/// Whether the closed segments `p1–p2` and `q1–q2` intersect
pub fn segments_intersect(p1: DVec2, p2: DVec2, q1: DVec2, q2: DVec2) -> bool {
    let d1 = cross(q2 - q1, p1 - q1);
    let d2 = cross(q2 - q1, p2 - q1);
    let d3 = cross(p2 - p1, q1 - p1);
    let d4 = cross(p2 - p1, q2 - p1);
    if ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
        && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
    {
        return true;
    }
    let on_segment = |a: DVec2, b: DVec2, p: DVec2| {
        p.x >= a.x.min(b.x) && p.x <= a.x.max(b.x) && p.y >= a.y.min(b.y) && p.y <= a.y.max(b.y)
    };
    (d1 == 0.0 && on_segment(q1, q2, p1))
        || (d2 == 0.0 && on_segment(q1, q2, p2))
        || (d3 == 0.0 && on_segment(p1, p2, q1))
        || (d4 == 0.0 && on_segment(p1, p2, q2))
}

/// Distance from `point` to the segment `a–b`
pub fn distance_to_segment(point: DVec2, a: DVec2, b: DVec2) -> f64 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    let t = if len_sq != 0.0 {
        ((point - a).dot(ab) / len_sq).clamp(0.0, 1.0)
    } else {
        0.0
    };
    point.distance(a + ab * t)
}

/// Smallest distance from `point` to any edge of the ring
pub fn min_distance_to_edges(ring: &[DVec2], point: DVec2) -> f64 {
    let ring = open(ring);
    let Some(&last) = ring.last() else {
        return f64::INFINITY;
    };
    let mut a = last;
    let mut min = f64::INFINITY;
    for &b in ring {
        min = min.min(distance_to_segment(point, a, b));
        a = b;
    }
    min
}

/// Axis-aligned bounds `[min, max]` of a point set
pub fn bounds(points: &[DVec2]) -> Option<[DVec2; 2]> {
    let (&first, rest) = points.split_first()?;
    Some(rest.iter().fold([first, first], |[lo, hi], &p| [lo.min(p), hi.max(p)]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::assert_approx_eq;

    fn unit_square() -> Vec<DVec2> {
        vec![
            DVec2::new(0.0, 0.0),
            DVec2::new(1.0, 0.0),
            DVec2::new(1.0, 1.0),
            DVec2::new(0.0, 1.0),
        ]
    }

    #[test]
    fn test_signed_area_orientation() {
        let mut square = unit_square();
        assert_approx_eq!(f64, signed_area(&square), 1.0);
        square.reverse();
        assert_approx_eq!(f64, signed_area(&square), -1.0);
        assert_approx_eq!(f64, area(&square), 1.0);
    }

    #[test]
    fn test_closed_ring_handling() {
        let mut square = unit_square();
        square.push(square[0]);
        assert!(is_closed(&square));
        assert_eq!(open(&square).len(), 4);
        assert_approx_eq!(f64, signed_area(&square), 1.0);
        assert_approx_eq!(f64, perimeter(&square), 4.0);
    }

    #[test]
    fn test_centroid() {
        let c = centroid(&unit_square());
        assert_approx_eq!(f64, c.x, 0.5);
        assert_approx_eq!(f64, c.y, 0.5);

        let mut reversed = unit_square();
        reversed.reverse();
        let c = centroid(&reversed);
        assert_approx_eq!(f64, c.x, 0.5);
        assert_approx_eq!(f64, c.y, 0.5);
    }

    #[test]
    fn test_contains() {
        let square = unit_square();
        assert!(contains(&square, DVec2::new(0.5, 0.5)));
        assert!(!contains(&square, DVec2::new(1.5, 0.5)));
        assert!(!contains(&square, DVec2::new(-0.1, 0.2)));
    }

    #[test]
    fn test_convex_winding() {
        let square = unit_square();
        assert_eq!(convex_winding(&square), Some(Winding::CounterClockwise));
        let mut reversed = square.clone();
        reversed.reverse();
        assert_eq!(convex_winding(&reversed), Some(Winding::Clockwise));

        let arrow = vec![
            DVec2::new(0.0, 0.0),
            DVec2::new(2.0, 1.0),
            DVec2::new(0.0, 2.0),
            DVec2::new(1.0, 1.0),
        ];
        assert_eq!(convex_winding(&arrow), None);
    }

    #[test]
    fn test_convex_hull() {
        let points = vec![
            DVec2::new(0.0, 0.0),
            DVec2::new(1.0, 1.0),
            DVec2::new(2.0, 0.0),
            DVec2::new(2.0, 2.0),
            DVec2::new(0.0, 2.0),
            DVec2::new(1.0, 0.0),
        ];
        let hull = convex_hull(&points);
        assert_eq!(hull.len(), 4);
        assert_approx_eq!(f64, signed_area(&hull), 4.0);
    }

    #[test]
    fn test_line_intersection() {
        let p = line_intersection(
            DVec2::new(0.0, -1.0),
            DVec2::new(0.0, 1.0),
            DVec2::new(-1.0, 0.0),
            DVec2::new(1.0, 0.0),
        );
        assert!(p.abs_diff_eq(DVec2::ZERO, 1e-12));

        let parallel = line_intersection(
            DVec2::new(0.0, 0.0),
            DVec2::new(1.0, 0.0),
            DVec2::new(0.0, 1.0),
            DVec2::new(1.0, 1.0),
        );
        assert!(!parallel.is_finite());
    }

    #[test]
    fn test_segments_intersect() {
        let a = DVec2::new(0.0, 0.0);
        let b = DVec2::new(1.0, 1.0);
        assert!(segments_intersect(a, b, DVec2::new(0.0, 1.0), DVec2::new(1.0, 0.0)));
        assert!(!segments_intersect(a, b, DVec2::new(2.0, 0.0), DVec2::new(3.0, 1.0)));
        // touching at an endpoint counts
        assert!(segments_intersect(a, b, b, DVec2::new(2.0, 0.0)));
    }

    #[test]
    fn test_min_distance_to_edges() {
        let d = min_distance_to_edges(&unit_square(), DVec2::new(0.5, 0.25));
        assert_approx_eq!(f64, d, 0.25);
    }
}
