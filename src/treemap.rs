//! Voronoi treemaps
//!
//! Every internal node of a value hierarchy is laid out by one Voronoi map
//! simulation over its children, clipped to the node's own cell. The build
//! walks the hierarchy with an explicit work stack, so deep hierarchies do
//! not grow the call stack.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use glam::DVec2;
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::time::Instant;
use tracing::{debug, info, info_span};

use crate::config::TreemapConfig;
use crate::diagram::Boundary;
use crate::error::{Result, VoronoiError};
use crate::simulation::VoronoiMapSimulation;

/// A node of a value hierarchy
///
/// Leaves carry their own value; internal nodes usually carry the sum of
/// their children's values (see [`HierarchyNode::sum`]).
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct HierarchyNode<T> {
    /// Value the node's area is proportional to
    pub value: f64,
    /// Caller data
    pub data: T,
    /// Child nodes; empty for leaves
    pub children: Vec<HierarchyNode<T>>,
    /// Cell assigned by the last build, counter-clockwise
    pub polygon: Option<Vec<DVec2>>,
}

impl<T> HierarchyNode<T> {
    /// Leaf node
    pub fn leaf(value: f64, data: T) -> Self {
        Self {
            value,
            data,
            children: Vec::new(),
            polygon: None,
        }
    }

    /// Internal node whose value is the sum of its children's
    pub fn branch(data: T, children: Vec<HierarchyNode<T>>) -> Self {
        let value = children.iter().map(|c| c.value).sum();
        Self {
            value,
            data,
            children,
            polygon: None,
        }
    }

    /// Whether the node has no children
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Recompute every internal value as the sum of its children's values
    ///
    /// Returns the root's value.
    pub fn sum(&mut self) -> f64 {
        if !self.children.is_empty() {
            self.value = self.children.iter_mut().map(HierarchyNode::sum).sum();
        }
        self.value
    }

    /// Order every node's children by descending value
    pub fn sort_by_value(&mut self) {
        self.children.sort_by(|a, b| b.value.total_cmp(&a.value));
        for child in &mut self.children {
            child.sort_by_value();
        }
    }

    /// Visit every node in pre-order together with its depth
    pub fn visit<'a>(&'a self, mut f: impl FnMut(&'a HierarchyNode<T>, usize)) {
        let mut stack = vec![(self, 0)];
        while let Some((node, depth)) = stack.pop() {
            f(node, depth);
            stack.extend(node.children.iter().rev().map(|c| (c, depth + 1)));
        }
    }

    /// Leaves in pre-order
    pub fn leaves(&self) -> Vec<&HierarchyNode<T>> {
        let mut leaves = Vec::new();
        self.visit(|node, _| {
            if node.is_leaf() {
                leaves.push(node);
            }
        });
        leaves
    }

    /// Length of the longest path to a leaf (0 for a leaf)
    pub fn height(&self) -> usize {
        let mut height = 0;
        self.visit(|_, depth| height = height.max(depth));
        height
    }
}

/// Builds Voronoi treemaps inside one boundary
///
/// # Example
///
/// ```
/// use voronoi_treemap::*;
///
/// let mut root = HierarchyNode::branch(
///     "root",
///     vec![HierarchyNode::leaf(1.0, "a"), HierarchyNode::leaf(3.0, "b")],
/// );
/// let treemap = VoronoiTreemap::new(
///     Boundary::from_size(100.0, 100.0).unwrap(),
///     TreemapConfig::new(SimulationConfig::with_seed(7)),
/// );
/// treemap.build(&mut root).unwrap();
/// assert!(root.leaves().iter().all(|leaf| leaf.polygon.is_some()));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct VoronoiTreemap {
    boundary: Boundary,
    config: TreemapConfig,
}

impl VoronoiTreemap {
    /// Treemap builder for `boundary`
    pub fn new(boundary: Boundary, config: TreemapConfig) -> Self {
        Self { boundary, config }
    }

    /// Region the root node fills
    pub fn boundary(&self) -> &Boundary {
        &self.boundary
    }

    /// Configuration in use
    pub fn config(&self) -> &TreemapConfig {
        &self.config
    }

    /// Assign a polygon to every node of `root`, seeded from the simulation
    /// config
    ///
    /// # Errors
    ///
    /// * `InvalidInput` when the hierarchy is deeper than `max_depth` or a
    ///   node's children have unusable values
    /// * any error of the per-node simulations
    pub fn build<T>(&self, root: &mut HierarchyNode<T>) -> Result<()> {
        let mut rng = ChaCha8Rng::seed_from_u64(self.config.simulation.seed);
        self.build_with_rng(root, &mut rng)
    }

    /// Same as [`build`](Self::build), drawing every node's randomness from
    /// `rng`
    pub fn build_with_rng<T>(&self, root: &mut HierarchyNode<T>, rng: &mut dyn RngCore) -> Result<()> {
        let height = root.height();
        if height > self.config.max_depth {
            return Err(VoronoiError::InvalidInput(format!(
                "hierarchy height {} exceeds max depth {}",
                height, self.config.max_depth
            )));
        }

        let span = info_span!("voronoi_treemap", height);
        let _enter = span.enter();
        let start = Instant::now();
        let mut simulations = 0;

        let mut stack: Vec<(&mut HierarchyNode<T>, Boundary)> = vec![(root, self.boundary.clone())];
        while let Some((node, boundary)) = stack.pop() {
            node.polygon = Some(boundary.clip().to_vec());
            if node.children.is_empty() {
                continue;
            }

            let values: Vec<f64> = node.children.iter().map(|c| c.value).collect();
            let mut simulation = VoronoiMapSimulation::with_rng(
                values,
                |v: &f64| *v,
                boundary,
                self.config.simulation,
                &mut *rng,
            )?;
            let state = simulation.run()?;
            debug!(
                children = node.children.len(),
                iterations = state.iteration_count,
                status = ?state.status,
                "node laid out"
            );
            simulations += 1;

            for (child, (_, cell)) in node.children.iter_mut().zip(simulation.into_cells()) {
                stack.push((child, Boundary::from_polygon(&cell.points)?));
            }
        }

        info!(simulations, elapsed = ?start.elapsed(), "treemap built");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimulationConfig;
    use crate::geometry::polygon;
    use float_cmp::assert_approx_eq;

    fn sample() -> HierarchyNode<&'static str> {
        HierarchyNode::branch(
            "root",
            vec![
                HierarchyNode::branch(
                    "left",
                    vec![HierarchyNode::leaf(1.0, "a"), HierarchyNode::leaf(3.0, "b")],
                ),
                HierarchyNode::leaf(4.0, "c"),
            ],
        )
    }

    #[test]
    fn test_hierarchy_helpers() {
        let mut root = sample();
        assert_eq!(root.value, 8.0);
        assert_eq!(root.height(), 2);
        let names: Vec<&str> = root.leaves().iter().map(|n| n.data).collect();
        assert_eq!(names, vec!["a", "b", "c"]);

        root.children[1].value = 6.0;
        assert_eq!(root.sum(), 10.0);
        root.sort_by_value();
        assert_eq!(root.children[0].data, "c");
        assert_eq!(root.children[1].children[0].data, "b");

        let mut depths = Vec::new();
        root.visit(|node, depth| depths.push((node.data, depth)));
        assert_eq!(
            depths,
            vec![("root", 0), ("c", 1), ("left", 1), ("b", 2), ("a", 2)]
        );
    }

    #[test]
    fn test_leaf_root_gets_boundary() {
        let mut root = HierarchyNode::leaf(1.0, ());
        let treemap = VoronoiTreemap::new(Boundary::default(), TreemapConfig::new(SimulationConfig::with_seed(1)));
        treemap.build(&mut root).unwrap();
        assert_eq!(root.polygon.as_deref(), Some(Boundary::default().clip()));
    }

    #[test]
    fn test_two_level_areas() {
        let mut root = sample();
        let treemap = VoronoiTreemap::new(Boundary::default(), TreemapConfig::new(SimulationConfig::with_seed(21)));
        treemap.build(&mut root).unwrap();

        let area = |node: &HierarchyNode<&str>| polygon::area(node.polygon.as_deref().unwrap_or(&[]));
        assert_approx_eq!(f64, area(&root), 1.0);
        assert_approx_eq!(f64, area(&root.children[0]), 0.5, epsilon = 0.05);
        assert_approx_eq!(f64, area(&root.children[1]), 0.5, epsilon = 0.05);

        let left = &root.children[0];
        let left_area = area(left);
        assert_approx_eq!(f64, area(&left.children[0]) / left_area, 0.25, epsilon = 0.05);
        assert_approx_eq!(f64, area(&left.children[1]) / left_area, 0.75, epsilon = 0.05);
        assert_approx_eq!(
            f64,
            area(&left.children[0]) + area(&left.children[1]),
            left_area,
            epsilon = 1e-6
        );
    }

    #[test]
    fn test_depth_limit() {
        let mut root = sample();
        let config = TreemapConfig::new(SimulationConfig::with_seed(1)).max_depth(1).unwrap();
        let treemap = VoronoiTreemap::new(Boundary::default(), config);
        assert!(matches!(treemap.build(&mut root), Err(VoronoiError::InvalidInput(_))));
        assert!(root.polygon.is_none());
    }

    #[test]
    fn test_deep_chain_uses_work_stack() {
        let mut node = HierarchyNode::leaf(1.0, 0usize);
        for level in 1..=40 {
            node = HierarchyNode::branch(level, vec![node]);
        }
        let treemap = VoronoiTreemap::new(Boundary::default(), TreemapConfig::new(SimulationConfig::with_seed(2)));
        treemap.build(&mut node).unwrap();
        let leaf = node.leaves()[0];
        assert_approx_eq!(f64, polygon::area(leaf.polygon.as_deref().unwrap_or(&[])), 1.0, epsilon = 1e-6);
    }
}
