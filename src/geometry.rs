//! Integer pixel geometry for zone containment.
//!
//! Zones are drawn in pixel coordinates, so everything here works on
//! integer points. Cross products are computed in `i64` to stay exact
//! for any realistic frame size.

use serde::{Deserialize, Serialize};

/// A 2D point in pixel coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Point { x, y }
    }
}

/// Cross product of (b - a) x (c - a).
///
/// Positive when `c` is left of the directed line a->b, zero when the
/// three points are collinear.
fn cross(a: Point, b: Point, c: Point) -> i64 {
    let abx = (b.x - a.x) as i64;
    let aby = (b.y - a.y) as i64;
    let acx = (c.x - a.x) as i64;
    let acy = (c.y - a.y) as i64;
    abx * acy - aby * acx
}

/// Convex hull of a point set (Andrew monotone chain).
///
/// Returns the hull vertices in counter-clockwise order without the
/// repeated closing vertex. Collinear points along an edge are not kept
/// as vertices. Inputs with fewer than 3 distinct non-collinear points
/// produce a hull with fewer than 3 vertices; callers that need a real
/// polygon must check the result length.
pub fn convex_hull(points: &[Point]) -> Vec<Point> {
    let mut sorted: Vec<Point> = points.to_vec();
    sorted.sort_by(|a, b| (a.x, a.y).cmp(&(b.x, b.y)));
    sorted.dedup();

    if sorted.len() < 3 {
        return sorted;
    }

    let mut lower: Vec<Point> = Vec::with_capacity(sorted.len());
    for &p in &sorted {
        while lower.len() >= 2 && cross(lower[lower.len() - 2], lower[lower.len() - 1], p) <= 0 {
            lower.pop();
        }
        lower.push(p);
    }

    let mut upper: Vec<Point> = Vec::with_capacity(sorted.len());
    for &p in sorted.iter().rev() {
        while upper.len() >= 2 && cross(upper[upper.len() - 2], upper[upper.len() - 1], p) <= 0 {
            upper.pop();
        }
        upper.push(p);
    }

    // Endpoints are shared between the two chains.
    lower.pop();
    upper.pop();
    lower.extend(upper);
    lower
}

/// Boundary-inclusive containment test against a convex hull.
///
/// `hull` must be in counter-clockwise order, as produced by
/// [`convex_hull`]. A point exactly on an edge or vertex counts as
/// inside. Hulls with fewer than 3 vertices contain nothing.
pub fn hull_contains(hull: &[Point], p: Point) -> bool {
    if hull.len() < 3 {
        return false;
    }
    for i in 0..hull.len() {
        let a = hull[i];
        let b = hull[(i + 1) % hull.len()];
        if cross(a, b, p) < 0 {
            return false;
        }
    }
    true
}

/// Twice the signed area of a CCW hull (shoelace). Exposed for the
/// zone tooling; a hull from [`convex_hull`] always yields a
/// non-negative value.
pub fn hull_area2(hull: &[Point]) -> i64 {
    if hull.len() < 3 {
        return 0;
    }
    let mut acc = 0i64;
    for i in 0..hull.len() {
        let a = hull[i];
        let b = hull[(i + 1) % hull.len()];
        acc += a.x as i64 * b.y as i64 - b.x as i64 * a.y as i64;
    }
    acc
}
