//! Incremental 3D convex hull over lifted sites
//!
//! Faces, half-edges and conflicts live in arenas addressed by integer
//! handles. The three half-edges of face `f` are `3f`, `3f + 1` and `3f + 2`,
//! so `next`/`prev`/`face` are plain arithmetic; only `twin` is stored.
//! Removed faces are tombstoned and never reused within one computation.
//!
//! # Algorithm
//!
//! 1. Pick a non-degenerate tetrahedron from the first points
//! 2. Record which remaining points lie outside each of its faces
//! 3. For each pending point with conflicts: mark the faces it sees, walk the
//!    horizon, fan new faces from the point to every horizon edge, inherit
//!    conflicts from the two faces adjacent to each horizon edge, then drop
//!    the visible faces

pub mod conflict;

use glam::{DVec2, DVec3};
use rand::seq::SliceRandom;
use rand::Rng;

use crate::error::{Result, VoronoiError};
use crate::geometry::{epsilonesque, linear_dependent, LiftedVertex, Plane, DOWNWARD_NORMAL_Z, EPSILON};
use conflict::ConflictGraph;

/// Handle of a face in the hull's arena
pub type FaceId = usize;
/// Handle of a half-edge in the hull's arena
pub type EdgeId = usize;

/// Directed edge of one hull face
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HalfEdge {
    /// Vertex the edge starts from
    pub origin: usize,
    /// Vertex the edge points to
    pub destination: usize,
    /// Opposite half-edge in the adjacent face
    pub twin: Option<EdgeId>,
}

/// Triangular hull face with an outward unit normal
#[derive(Debug, Clone)]
pub struct Face {
    /// The three vertices of the face
    pub vertices: [usize; 3],
    /// Outward unit normal
    pub normal: DVec3,
    alive: bool,
    marked: bool,
}

/// Convex hull of a set of lifted vertices
#[derive(Debug, Clone)]
pub struct ConvexHull {
    vertices: Vec<LiftedVertex>,
    faces: Vec<Face>,
    edges: Vec<HalfEdge>,
    conflicts: ConflictGraph,
}

impl ConvexHull {
    /// Prepare a hull over `vertices`
    ///
    /// Vertex indices are reassigned to their slot in the list.
    pub fn new(mut vertices: Vec<LiftedVertex>) -> Self {
        for (i, v) in vertices.iter_mut().enumerate() {
            v.index = i;
        }
        let conflicts = ConflictGraph::new(vertices.len());
        Self {
            vertices,
            faces: Vec::new(),
            edges: Vec::new(),
            conflicts,
        }
    }

    /// Randomize the insertion order
    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.vertices.shuffle(rng);
        for (i, v) in self.vertices.iter_mut().enumerate() {
            v.index = i;
        }
    }

    /// Build the hull
    ///
    /// # Errors
    ///
    /// * `DegenerateInput` if there are fewer than 4 points or they are all
    ///   collinear / coplanar
    /// * `HullInvariant` if the face topology breaks during insertion
    pub fn compute(&mut self) -> Result<()> {
        self.prepare()?;
        let n = self.vertices.len();
        for next in 4..n {
            if self.conflicts.vertex_is_free(next) {
                continue;
            }
            self.insert(next)?;
        }
        tracing::trace!(
            points = n,
            faces = self.faces().count(),
            "convex hull computed"
        );
        Ok(())
    }

    fn prepare(&mut self) -> Result<()> {
        let n = self.vertices.len();
        if n < 4 {
            return Err(VoronoiError::DegenerateInput(format!(
                "fewer than 4 points ({})",
                n
            )));
        }
        let insufficient = || VoronoiError::DegenerateInput("insufficient non-planar points".into());

        let p0 = self.position(0);
        let i1 = (1..n)
            .find(|&i| !self.position(i).abs_diff_eq(p0, EPSILON))
            .ok_or_else(insufficient)?;
        self.swap_vertices(1, i1);

        let d1 = self.position(1) - p0;
        let i2 = (2..n)
            .find(|&i| !linear_dependent(d1, self.position(i) - p0))
            .ok_or_else(insufficient)?;
        self.swap_vertices(2, i2);

        let normal = d1.cross(self.position(2) - p0).normalize_or_zero();
        let i3 = (3..n)
            .find(|&i| !epsilonesque(normal.dot(p0) - normal.dot(self.position(i))))
            .ok_or_else(insufficient)?;
        self.swap_vertices(3, i3);

        let f0 = self.add_face(0, 1, 2, 3);
        let f1 = self.add_face(0, 2, 3, 1);
        let f2 = self.add_face(0, 1, 3, 2);
        let f3 = self.add_face(1, 2, 3, 0);
        self.link(f0, f1, 0, 2)?;
        self.link(f0, f2, 0, 1)?;
        self.link(f0, f3, 1, 2)?;
        self.link(f1, f2, 0, 3)?;
        self.link(f1, f3, 2, 3)?;
        self.link(f2, f3, 3, 1)?;

        for v in 4..n {
            for f in [f0, f1, f2, f3] {
                if self.conflicts_with(f, v) {
                    self.conflicts.add(f, v);
                }
            }
        }
        Ok(())
    }

    fn insert(&mut self, next: usize) -> Result<()> {
        let visible = self.conflicts.faces_of(next);
        for &f in &visible {
            self.faces[f].marked = true;
        }

        let horizon = self.find_horizon(&visible)?;
        if horizon.is_empty() {
            return Err(VoronoiError::HullInvariant(format!(
                "empty horizon while inserting vertex {}",
                next
            )));
        }

        let mut first: Option<FaceId> = None;
        let mut last: Option<FaceId> = None;
        for &h in &horizon {
            let HalfEdge { origin, destination, twin } = self.edges[h];
            let twin = twin.ok_or_else(|| missing_twin(origin, destination))?;
            let apex = self.edges[next_edge(twin)].destination;

            let f = self.add_face(next, origin, destination, apex);
            self.merge_conflicts(face_of(h), face_of(twin), f);
            self.link_edge(f, h)?;
            if let Some(previous) = last {
                self.link(f, previous, next, origin)?;
            }
            last = Some(f);
            first.get_or_insert(f);
        }
        if let (Some(first), Some(last)) = (first, last) {
            let origin = self.edges[horizon[0]].origin;
            self.link(last, first, next, origin)?;
        }

        for f in visible {
            self.conflicts.remove_face(f);
            self.faces[f].alive = false;
        }
        Ok(())
    }

    /// Horizon edges in cyclic order
    ///
    /// A horizon edge belongs to a face the new point cannot see while its
    /// twin belongs to one it can.
    fn find_horizon(&self, visible: &[FaceId]) -> Result<Vec<EdgeId>> {
        let start = visible.iter().find_map(|&f| {
            face_edges(f)
                .into_iter()
                .find(|&e| self.edges[e].twin.is_some_and(|t| self.is_horizon(t)))
        });
        let Some(start) = start else {
            return Ok(Vec::new());
        };

        let mut horizon: Vec<EdgeId> = Vec::new();
        let mut cursor = start;
        for _ in 0..=self.edges.len() {
            if self.is_horizon(cursor) {
                if horizon.first() == Some(&cursor) {
                    return Ok(horizon);
                }
                horizon.push(cursor);
                cursor = next_edge(cursor);
            } else {
                let edge = self.edges[cursor];
                let twin = edge
                    .twin
                    .ok_or_else(|| missing_twin(edge.origin, edge.destination))?;
                cursor = next_edge(twin);
            }
        }
        Err(VoronoiError::HullInvariant("horizon walk did not close".into()))
    }

    fn is_horizon(&self, e: EdgeId) -> bool {
        match self.edges[e].twin {
            Some(t) => !self.faces[face_of(e)].marked && self.faces[face_of(t)].marked,
            None => false,
        }
    }

    /// Conflicts of a new face are drawn from the union of the conflicts of
    /// the two faces it replaces along its horizon edge. Both lists are in
    /// descending vertex order; the merge keeps that order.
    fn merge_conflicts(&mut self, old1: FaceId, old2: FaceId, new: FaceId) {
        let l1 = self.conflicts.vertices_of(old1);
        let l2 = self.conflicts.vertices_of(old2);
        let mut merged = Vec::with_capacity(l1.len() + l2.len());
        let (mut i, mut j) = (0, 0);
        while i < l1.len() || j < l2.len() {
            if i < l1.len() && j < l2.len() {
                let (a, b) = (l1[i], l2[j]);
                if a == b {
                    merged.push(a);
                    i += 1;
                    j += 1;
                } else if a > b {
                    merged.push(a);
                    i += 1;
                } else {
                    merged.push(b);
                    j += 1;
                }
            } else if i < l1.len() {
                merged.push(l1[i]);
                i += 1;
            } else {
                merged.push(l2[j]);
                j += 1;
            }
        }
        for &v in merged.iter().rev() {
            if self.conflicts_with(new, v) {
                self.conflicts.add(new, v);
            }
        }
    }

    /// Add face `(a, b, c)` with its normal pointing away from `inside`
    fn add_face(&mut self, a: usize, b: usize, c: usize, inside: usize) -> FaceId {
        let pa = self.position(a);
        let mut vertices = [a, b, c];
        let mut normal = (self.position(b) - pa)
            .cross(self.position(c) - pa)
            .normalize_or_zero();
        if normal.dot(self.position(inside)) >= normal.dot(pa) {
            vertices.swap(1, 2);
            normal = -normal;
        }

        let id = self.faces.len();
        self.faces.push(Face {
            vertices,
            normal,
            alive: true,
            marked: false,
        });
        for i in 0..3 {
            self.edges.push(HalfEdge {
                origin: vertices[i],
                destination: vertices[(i + 1) % 3],
                twin: None,
            });
        }
        id
    }

    fn find_edge(&self, f: FaceId, a: usize, b: usize) -> Option<EdgeId> {
        face_edges(f).into_iter().find(|&e| {
            let edge = &self.edges[e];
            (edge.origin == a && edge.destination == b) || (edge.origin == b && edge.destination == a)
        })
    }

    fn link(&mut self, f: FaceId, g: FaceId, a: usize, b: usize) -> Result<()> {
        let e = self.find_edge(f, a, b).ok_or_else(|| missing_twin(a, b))?;
        let t = self.find_edge(g, a, b).ok_or_else(|| missing_twin(a, b))?;
        self.edges[e].twin = Some(t);
        self.edges[t].twin = Some(e);
        Ok(())
    }

    fn link_edge(&mut self, f: FaceId, other: EdgeId) -> Result<()> {
        let HalfEdge { origin, destination, .. } = self.edges[other];
        let e = self
            .find_edge(f, origin, destination)
            .ok_or_else(|| missing_twin(origin, destination))?;
        self.edges[e].twin = Some(other);
        self.edges[other].twin = Some(e);
        Ok(())
    }

    fn conflicts_with(&self, f: FaceId, v: usize) -> bool {
        let face = &self.faces[f];
        face.normal.dot(self.position(v)) > face.normal.dot(self.position(face.vertices[0])) + EPSILON
    }

    fn swap_vertices(&mut self, i: usize, j: usize) {
        self.vertices.swap(i, j);
        self.vertices[i].index = i;
        self.vertices[j].index = j;
    }

    #[inline]
    fn position(&self, v: usize) -> DVec3 {
        self.vertices[v].position
    }

    /// All vertices, in insertion order
    pub fn vertices(&self) -> &[LiftedVertex] {
        &self.vertices
    }

    /// Vertex by index
    pub fn vertex(&self, v: usize) -> &LiftedVertex {
        &self.vertices[v]
    }

    /// Face by handle
    pub fn face(&self, f: FaceId) -> &Face {
        &self.faces[f]
    }

    /// Handles of the faces currently on the hull
    pub fn faces(&self) -> impl Iterator<Item = FaceId> + '_ {
        self.faces
            .iter()
            .enumerate()
            .filter(|(_, face)| face.alive)
            .map(|(f, _)| f)
    }

    /// Number of face slots, dead faces included
    pub fn face_capacity(&self) -> usize {
        self.faces.len()
    }

    /// Half-edge by handle
    pub fn edge(&self, e: EdgeId) -> &HalfEdge {
        &self.edges[e]
    }

    /// Whether the face belongs to the lower hull
    pub fn is_downward(&self, f: FaceId) -> bool {
        self.faces[f].normal.z < DOWNWARD_NORMAL_Z
    }

    /// Power diagram vertex dual to the face
    pub fn dual_point(&self, f: FaceId) -> DVec2 {
        let [a, b, c] = self.faces[f].vertices;
        Plane::through(self.position(a), self.position(b), self.position(c)).dual_point()
    }
}

/// The three half-edges of a face
#[inline]
pub fn face_edges(f: FaceId) -> [EdgeId; 3] {
    [3 * f, 3 * f + 1, 3 * f + 2]
}

/// Face owning a half-edge
#[inline]
pub fn face_of(e: EdgeId) -> FaceId {
    e / 3
}

/// Following half-edge within the same face
#[inline]
pub fn next_edge(e: EdgeId) -> EdgeId {
    3 * (e / 3) + (e + 1) % 3
}

/// Preceding half-edge within the same face
#[inline]
pub fn prev_edge(e: EdgeId) -> EdgeId {
    3 * (e / 3) + (e + 2) % 3
}

fn missing_twin(a: usize, b: usize) -> VoronoiError {
    VoronoiError::HullInvariant(format!("twin half-edge {}-{} not found", a, b))
}
