//! Conflict graph between hull faces and pending vertices
//!
//! Every conflict edge sits in two intrusive doubly linked lists: the list of
//! its face and the list of its vertex. Unlinking an edge from both lists is
//! O(1); dropping a face unlinks all of its edges from their vertex lists.
//! Edge slots are recycled through a free list.

/// Handle of a conflict edge in the graph's arena
type EdgeId = usize;

#[derive(Debug, Clone, Copy)]
struct ConflictEdge {
    face: usize,
    vertex: usize,
    face_prev: Option<EdgeId>,
    face_next: Option<EdgeId>,
    vertex_prev: Option<EdgeId>,
    vertex_next: Option<EdgeId>,
}

/// Bipartite face ↔ vertex conflict structure
#[derive(Debug, Clone, Default)]
pub struct ConflictGraph {
    edges: Vec<ConflictEdge>,
    free: Vec<EdgeId>,
    face_heads: Vec<Option<EdgeId>>,
    vertex_heads: Vec<Option<EdgeId>>,
}

impl ConflictGraph {
    /// Create a graph able to hold conflicts for `vertex_count` vertices
    pub fn new(vertex_count: usize) -> Self {
        Self {
            edges: Vec::new(),
            free: Vec::new(),
            face_heads: Vec::new(),
            vertex_heads: vec![None; vertex_count],
        }
    }

    fn ensure_face(&mut self, face: usize) {
        if face >= self.face_heads.len() {
            self.face_heads.resize(face + 1, None);
        }
    }

    /// Record that `vertex` lies outside `face`
    ///
    /// The edge is pushed at the head of both lists.
    pub fn add(&mut self, face: usize, vertex: usize) {
        self.ensure_face(face);
        let face_head = self.face_heads[face];
        let vertex_head = self.vertex_heads[vertex];
        let edge = ConflictEdge {
            face,
            vertex,
            face_prev: None,
            face_next: face_head,
            vertex_prev: None,
            vertex_next: vertex_head,
        };
        let id = match self.free.pop() {
            Some(id) => {
                self.edges[id] = edge;
                id
            }
            None => {
                self.edges.push(edge);
                self.edges.len() - 1
            }
        };
        if let Some(head) = face_head {
            self.edges[head].face_prev = Some(id);
        }
        if let Some(head) = vertex_head {
            self.edges[head].vertex_prev = Some(id);
        }
        self.face_heads[face] = Some(id);
        self.vertex_heads[vertex] = Some(id);
    }

    /// Whether `vertex` conflicts with no face
    pub fn vertex_is_free(&self, vertex: usize) -> bool {
        self.vertex_heads[vertex].is_none()
    }

    /// Faces in conflict with `vertex`, most recently added first
    pub fn faces_of(&self, vertex: usize) -> Vec<usize> {
        let mut faces = Vec::new();
        let mut cursor = self.vertex_heads[vertex];
        while let Some(id) = cursor {
            faces.push(self.edges[id].face);
            cursor = self.edges[id].vertex_next;
        }
        faces
    }

    /// Vertices in conflict with `face`, most recently added first
    pub fn vertices_of(&self, face: usize) -> Vec<usize> {
        let mut vertices = Vec::new();
        let mut cursor = self.face_heads.get(face).copied().flatten();
        while let Some(id) = cursor {
            vertices.push(self.edges[id].vertex);
            cursor = self.edges[id].face_next;
        }
        vertices
    }

    /// Drop every conflict of `face`
    pub fn remove_face(&mut self, face: usize) {
        let mut cursor = self.face_heads.get(face).copied().flatten();
        while let Some(id) = cursor {
            let edge = self.edges[id];
            match edge.vertex_prev {
                Some(prev) => self.edges[prev].vertex_next = edge.vertex_next,
                None => self.vertex_heads[edge.vertex] = edge.vertex_next,
            }
            if let Some(next) = edge.vertex_next {
                self.edges[next].vertex_prev = edge.vertex_prev;
            }
            self.free.push(id);
            cursor = edge.face_next;
        }
        if face < self.face_heads.len() {
            self.face_heads[face] = None;
        }
    }

    /// Number of live conflict edges
    pub fn len(&self) -> usize {
        self.edges.len() - self.free.len()
    }

    /// Whether no conflict edge is live
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_and_list() {
        let mut graph = ConflictGraph::new(4);
        graph.add(0, 1);
        graph.add(0, 3);
        graph.add(1, 3);

        assert_eq!(graph.vertices_of(0), vec![3, 1]);
        assert_eq!(graph.vertices_of(1), vec![3]);
        assert_eq!(graph.faces_of(3), vec![1, 0]);
        assert!(graph.vertex_is_free(0));
        assert!(!graph.vertex_is_free(1));
        assert_eq!(graph.len(), 3);
    }

    #[test]
    fn test_remove_face_unlinks_vertices() {
        let mut graph = ConflictGraph::new(4);
        graph.add(0, 1);
        graph.add(0, 2);
        graph.add(1, 2);
        graph.add(2, 2);

        graph.remove_face(1);
        assert_eq!(graph.faces_of(2), vec![2, 0]);
        graph.remove_face(0);
        assert_eq!(graph.faces_of(2), vec![2]);
        assert!(graph.vertex_is_free(1));
        assert!(graph.vertices_of(0).is_empty());
        assert_eq!(graph.len(), 1);
    }

    #[test]
    fn test_slots_are_recycled() {
        let mut graph = ConflictGraph::new(2);
        graph.add(0, 0);
        graph.add(0, 1);
        graph.remove_face(0);
        assert!(graph.is_empty());
        graph.add(5, 1);
        assert_eq!(graph.edges.len(), 2);
        assert_eq!(graph.faces_of(1), vec![5]);
    }

    #[test]
    fn test_remove_unknown_face_is_noop() {
        let mut graph = ConflictGraph::new(1);
        graph.add(0, 0);
        graph.remove_face(7);
        assert_eq!(graph.len(), 1);
    }
}
