//! Power diagram extraction from the lower hull
//!
//! Each non-boundary hull vertex owns one cell. Its vertices are the dual
//! points of the downward faces around it, collected by walking the
//! half-edge ring of the vertex.

use glam::DVec2;
use tracing::warn;

use crate::error::{Result, VoronoiError};
use crate::geometry::polygon;
use crate::geometry::EPSILON;
use crate::hull::{face_edges, face_of, prev_edge, ConvexHull, EdgeId};

/// Unclipped cell of one site
#[derive(Debug, Clone, PartialEq)]
pub struct RawCell {
    /// Index of the owning site
    pub site: usize,
    /// Counter-clockwise ring of power diagram vertices
    pub polygon: Vec<DVec2>,
    /// Sites whose cells share an edge with this one
    pub neighbours: Vec<usize>,
}

/// Extract one cell per non-boundary vertex of a computed hull
///
/// Cells that end up with fewer than three distinct vertices or with a
/// non-positive area are skipped.
///
/// # Errors
///
/// Returns `HullInvariant` if a vertex ring cannot be walked (missing twin
/// or a ring that does not close).
pub fn extract_cells(hull: &ConvexHull) -> Result<Vec<RawCell>> {
    let mut visited = vec![false; hull.vertices().len()];
    let mut cells = Vec::new();

    for f in hull.faces() {
        if !hull.is_downward(f) {
            continue;
        }
        for e in face_edges(f) {
            let v = hull.edge(e).destination;
            if visited[v] {
                continue;
            }
            visited[v] = true;

            let vertex = hull.vertex(v);
            let Some(site) = vertex.site.filter(|_| !vertex.is_boundary) else {
                continue;
            };

            let (polygon, neighbours) = walk_ring(hull, e)?;
            if is_degenerate(&polygon) {
                warn!(site, vertices = polygon.len(), "skipping degenerate cell");
                continue;
            }
            cells.push(RawCell {
                site,
                polygon,
                neighbours,
            });
        }
    }
    Ok(cells)
}

/// Fewer than three vertices, or a ring that is not counter-clockwise
fn is_degenerate(ring: &[DVec2]) -> bool {
    ring.len() < 3 || polygon::signed_area(ring) <= 0.0
}

/// Walk the faces around the destination of `start`
///
/// Steps through `prev(twin(e))`, which turns clockwise around the vertex;
/// the collected ring is reversed before returning.
fn walk_ring(hull: &ConvexHull, start: EdgeId) -> Result<(Vec<DVec2>, Vec<usize>)> {
    let mut ring: Vec<DVec2> = Vec::new();
    let mut neighbours = Vec::new();
    let limit = hull.face_capacity() * 3;

    let mut e = start;
    for _ in 0..=limit {
        let twin = hull.edge(e).twin.ok_or_else(|| {
            VoronoiError::HullInvariant(format!("half-edge {} has no twin", e))
        })?;
        e = prev_edge(twin);

        let neighbour = hull.vertex(hull.edge(e).origin);
        if let Some(site) = neighbour.site.filter(|_| !neighbour.is_boundary) {
            neighbours.push(site);
        }

        let f = face_of(e);
        if hull.is_downward(f) {
            let point = hull.dual_point(f);
            let duplicate = ring
                .last()
                .is_some_and(|q| (q.x - point.x).abs() <= EPSILON && (q.y - point.y).abs() <= EPSILON);
            if point.is_finite() && !duplicate {
                ring.push(point);
            }
        }

        if e == start {
            while ring.len() > 1 && ring[0].abs_diff_eq(ring[ring.len() - 1], EPSILON) {
                ring.pop();
            }
            ring.reverse();
            return Ok((ring, neighbours));
        }
    }

    Err(VoronoiError::HullInvariant(format!(
        "ring around vertex {} does not close",
        hull.edge(start).destination
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::LiftedVertex;
    use float_cmp::assert_approx_eq;

    fn hull_of(sites: &[(DVec2, f64)]) -> ConvexHull {
        let mut vertices: Vec<LiftedVertex> = sites
            .iter()
            .enumerate()
            .map(|(i, &(p, w))| LiftedVertex::new(p, w, i))
            .collect();
        for corner in [
            DVec2::new(-10.0, -10.0),
            DVec2::new(10.0, -10.0),
            DVec2::new(10.0, 10.0),
            DVec2::new(-10.0, 10.0),
        ] {
            vertices.push(LiftedVertex::boundary(corner));
        }
        let mut hull = ConvexHull::new(vertices);
        hull.compute().unwrap();
        hull
    }

    #[test]
    fn test_two_equal_sites_split_at_bisector() {
        let hull = hull_of(&[(DVec2::new(-1.0, 0.0), 0.0), (DVec2::new(1.0, 0.0), 0.0)]);
        let mut cells = extract_cells(&hull).unwrap();
        cells.sort_by_key(|c| c.site);
        assert_eq!(cells.len(), 2);

        for cell in &cells {
            assert!(polygon::signed_area(&cell.polygon) > 0.0);
        }
        assert!(cells[0].polygon.iter().all(|p| p.x <= 1e-9));
        assert!(cells[1].polygon.iter().all(|p| p.x >= -1e-9));
        assert!(cells[0]
            .polygon
            .iter()
            .any(|p| p.x.abs() < 1e-9));
        assert_eq!(cells[0].neighbours, vec![1]);
        assert_eq!(cells[1].neighbours, vec![0]);
    }

    #[test]
    fn test_weight_shifts_bisector() {
        // Power bisector of (±1, 0) with weights 1 and 0: x = w0 - w1 over 4
        let hull = hull_of(&[(DVec2::new(-1.0, 0.0), 1.0), (DVec2::new(1.0, 0.0), 0.0)]);
        let mut cells = extract_cells(&hull).unwrap();
        cells.sort_by_key(|c| c.site);
        let max_x = cells[0]
            .polygon
            .iter()
            .map(|p| p.x)
            .fold(f64::NEG_INFINITY, f64::max);
        assert_approx_eq!(f64, max_x, 0.25, epsilon = 1e-9);
    }

    #[test]
    fn test_boundary_vertices_have_no_cells() {
        let hull = hull_of(&[(DVec2::new(0.0, 0.0), 0.0)]);
        let cells = extract_cells(&hull).unwrap();
        assert_eq!(cells.len(), 1);
        assert_eq!(cells[0].site, 0);
        assert!(cells[0].neighbours.is_empty());
        assert!(polygon::contains(&cells[0].polygon, DVec2::ZERO));
    }

    #[test]
    fn test_degenerate_rings() {
        let triangle = [DVec2::ZERO, DVec2::new(1.0, 0.0), DVec2::new(0.0, 1.0)];
        assert!(!is_degenerate(&triangle));

        let inverted = [triangle[0], triangle[2], triangle[1]];
        assert!(is_degenerate(&inverted));
        assert!(is_degenerate(&triangle[..2]));
        assert!(is_degenerate(&[DVec2::ZERO, DVec2::ONE, DVec2::new(2.0, 2.0)]));
        assert!(is_degenerate(&[]));
    }
}
