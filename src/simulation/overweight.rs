//! Overweight correction
//!
//! In a power diagram, a site whose weight exceeds another's by more than
//! their squared distance swallows the lighter site's cell. Correction scans
//! all pairs and fixes the first violation, then starts over.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use tracing::trace;

use super::MapPoint;
use crate::error::{Result, VoronoiError};
use crate::geometry::EPSILON;

/// Maximum number of pair fixes before correction gives up
pub const MAX_FIXES: usize = 1000;

/// How a violating pair of sites is repaired
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverweightStrategy {
    /// Raise the lighter weight just enough to clear the violation
    #[default]
    RaiseLightest,
    /// Lower the heavier weight to the squared distance plus half the
    /// lighter weight
    ReduceHeaviest,
}

/// Repair every overweight pair in `points`
///
/// Returns the number of fixes applied.
///
/// # Errors
///
/// Returns `OverweightCorrection` once more than [`MAX_FIXES`] fixes were
/// needed.
pub fn correct_overweight(points: &mut [MapPoint], strategy: OverweightStrategy) -> Result<usize> {
    let mut fixes = 0;
    loop {
        if fixes > MAX_FIXES {
            return Err(VoronoiError::OverweightCorrection { fixes });
        }
        match find_violation(points) {
            Some((heavy, light, distance_squared)) => {
                fix_pair(points, heavy, light, distance_squared, strategy);
                fixes += 1;
            }
            None => break,
        }
    }
    if fixes > 0 {
        trace!(fixes, ?strategy, "overweight sites corrected");
    }
    Ok(fixes)
}

/// First pair `(heaviest, lightest, squared distance)` in scan order whose
/// weight gap exceeds the squared distance
fn find_violation(points: &[MapPoint]) -> Option<(usize, usize, f64)> {
    for i in 0..points.len() {
        for j in i + 1..points.len() {
            let (heavy, light) = if points[i].weight > points[j].weight {
                (i, j)
            } else {
                (j, i)
            };
            let distance_squared = points[i].position.distance_squared(points[j].position);
            if distance_squared < points[heavy].weight - points[light].weight {
                return Some((heavy, light, distance_squared));
            }
        }
    }
    None
}

fn fix_pair(
    points: &mut [MapPoint],
    heavy: usize,
    light: usize,
    distance_squared: f64,
    strategy: OverweightStrategy,
) {
    let light_weight = points[light].weight;
    match strategy {
        OverweightStrategy::RaiseLightest => {
            let overweight = points[heavy].weight - light_weight - distance_squared;
            points[light].weight += overweight + EPSILON;
        }
        OverweightStrategy::ReduceHeaviest => {
            points[heavy].weight = (distance_squared + light_weight / 2.0).max(EPSILON);
        }
    }
}
