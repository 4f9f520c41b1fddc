//! Example: Compute a weighted Voronoi diagram
//!
//! Places random weighted sites in a square and prints every cell.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use voronoi_treemap::*;

fn main() -> Result<()> {
    println!("Power Diagram Example");
    println!("=====================\n");

    let mut rng = ChaCha8Rng::seed_from_u64(7);
    let sites: Vec<Site<char>> = ('a'..='h')
        .map(|name| {
            let position = DVec2::new(rng.gen_range(0.0..100.0), rng.gen_range(0.0..100.0));
            Site::new(position, rng.gen_range(0.0..200.0), name)
        })
        .collect();

    let diagram = WeightedVoronoi::new(Boundary::from_size(100.0, 100.0)?);
    let cells = diagram.compute(&sites)?;

    println!("{} sites, {} cells\n", sites.len(), cells.len());
    for cell in &cells {
        let site = &sites[cell.site];
        let neighbours: String = cell.neighbours.iter().map(|&n| sites[n].payload).collect();
        println!(
            "  {} at ({:>5.1}, {:>5.1}) weight {:>5.1}: {} vertices, area {:>7.1}, neighbours [{}]",
            site.payload,
            site.position.x,
            site.position.y,
            site.weight,
            cell.len(),
            cell.area(),
            neighbours
        );
    }

    let total: f64 = cells.iter().map(CellPolygon::area).sum();
    println!("\nTotal area: {:.3} (boundary {:.3})", total, diagram.boundary().area());
    Ok(())
}
