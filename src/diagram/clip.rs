//! Convex polygon clipping (Sutherland–Hodgman)

use glam::DVec2;

use crate::geometry::polygon::{self, cross};
use crate::geometry::EPSILON;

/// Clip `subject` against the convex, counter-clockwise ring `clip`
///
/// Points lying on a clip edge count as inside, so clipping a polygon that
/// is already contained in `clip` returns it unchanged. The result keeps the
/// subject's orientation and closure: a closed subject yields a closed
/// result. Consecutive duplicates are merged; the result may be empty.
pub fn clip_polygon(subject: &[DVec2], clip: &[DVec2]) -> Vec<DVec2> {
    let closed = polygon::is_closed(subject);
    let clip = polygon::open(clip);
    let Some(&last) = clip.last() else {
        return Vec::new();
    };

    let mut output: Vec<DVec2> = polygon::open(subject).to_vec();
    let mut a = last;
    for &b in clip {
        if output.is_empty() {
            break;
        }
        let input = std::mem::take(&mut output);
        let mut c = input[input.len() - 1];
        for &d in &input {
            if inside(d, a, b) {
                if !inside(c, a, b) {
                    push_point(&mut output, polygon::line_intersection(c, d, a, b));
                }
                push_point(&mut output, d);
            } else if inside(c, a, b) {
                push_point(&mut output, polygon::line_intersection(c, d, a, b));
            }
            c = d;
        }
        a = b;
    }

    while output.len() > 1 && approx_eq(output[0], output[output.len() - 1]) {
        output.pop();
    }
    if closed {
        if let Some(&first) = output.first() {
            output.push(first);
        }
    }
    output
}

#[inline]
fn inside(p: DVec2, a: DVec2, b: DVec2) -> bool {
    cross(b - a, p - a) >= 0.0
}

#[inline]
fn approx_eq(p: DVec2, q: DVec2) -> bool {
    (p.x - q.x).abs() <= EPSILON && (p.y - q.y).abs() <= EPSILON
}

fn push_point(output: &mut Vec<DVec2>, p: DVec2) {
    if !p.is_finite() {
        return;
    }
    if output.last().is_some_and(|&q| approx_eq(p, q)) {
        return;
    }
    output.push(p);
}
