//! Complete workflow demonstration for voronoi_treemap

use voronoi_treemap::*;

fn main() -> Result<()> {
    println!("=== voronoi_treemap Demo ===\n");

    // Step 1: Build a hierarchy
    println!("Step 1: Building hierarchy...");
    let mut root = HierarchyNode::branch(
        "world",
        vec![
            HierarchyNode::branch(
                "europe",
                vec![
                    HierarchyNode::leaf(83.0, "germany"),
                    HierarchyNode::leaf(68.0, "france"),
                    HierarchyNode::leaf(59.0, "italy"),
                ],
            ),
            HierarchyNode::branch(
                "asia",
                vec![
                    HierarchyNode::leaf(1412.0, "china"),
                    HierarchyNode::leaf(1408.0, "india"),
                    HierarchyNode::leaf(125.0, "japan"),
                ],
            ),
            HierarchyNode::leaf(333.0, "usa"),
        ],
    );
    root.sort_by_value();
    println!("  Total value: {}", root.sum());
    println!("  Height: {}", root.height());

    // Step 2: Configure
    println!("\nStep 2: Configuring...");
    let simulation = SimulationConfigBuilder::new()
        .seed(42)
        .convergence_ratio(0.005)?
        .max_iteration_count(100)?
        .build()?;
    let config = TreemapConfig::new(simulation);
    let boundary = ClipShape::default().boundary(600.0, 600.0, 20.0)?;
    println!("  Boundary area: {:.1}", boundary.area());

    // Step 3: Build
    println!("\nStep 3: Building treemap...");
    VoronoiTreemap::new(boundary.clone(), config).build(&mut root)?;

    // Step 4: Report
    println!("\nStep 4: Cells:");
    let total = root.value;
    root.visit(|node, depth| {
        let area = node
            .polygon
            .as_deref()
            .map(geometry::polygon::area)
            .unwrap_or(0.0);
        println!(
            "  {}{:<10} value {:>7.1}  area {:>5.1}%  (target {:>5.1}%)",
            "  ".repeat(depth),
            node.data,
            node.value,
            area / boundary.area() * 100.0,
            node.value / total * 100.0
        );
    });

    println!("\n=== Demo Complete ===");
    Ok(())
}
