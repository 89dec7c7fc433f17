use crate::silhouette::SilhouetteMap;
use imageproc::contours::{find_contours, BorderType};
use imageproc::point::Point;
use itertools::Itertools;

/// Closed boundary in pixel coordinates; the last point connects back to the first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contour {
    pub points: Vec<Point<i32>>,
}

impl Contour {
    pub fn new(points: Vec<Point<i32>>) -> Self {
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Shoelace area, positive for counter-clockwise in a y-up frame.
    pub fn signed_area(&self) -> f64 {
        if self.points.len() < 3 {
            return 0.0;
        }
        let twice: i64 = self
            .points
            .iter()
            .circular_tuple_windows::<(_, _)>()
            .map(|(a, b)| a.x as i64 * b.y as i64 - b.x as i64 * a.y as i64)
            .sum();
        twice as f64 * 0.5
    }

    pub fn area(&self) -> f64 {
        self.signed_area().abs()
    }

    /// Douglas-Peucker reduction of the closed curve.
    pub fn simplified(&self, epsilon: f64) -> Contour {
        Contour::new(simplify_closed(&self.points, epsilon))
    }

    pub fn convex_hull(&self) -> Contour {
        if self.points.len() < 3 {
            return self.clone();
        }
        Contour::new(imageproc::geometry::convex_hull(self.points.as_slice()))
    }
}

/// Outermost borders of the map, each reduced to its direction changes.
/// Holes and borders nested inside holes are dropped.
pub fn outer_contours(map: &SilhouetteMap) -> Vec<Contour> {
    find_contours::<i32>(map.as_image())
        .into_iter()
        .filter(|c| c.border_type == BorderType::Outer && c.parent.is_none())
        .map(|c| Contour::new(compress_chain(&c.points)))
        .filter(|c| !c.is_empty())
        .collect()
}

/// Drops every point that sits on a straight run between its neighbours,
/// treating the chain as closed.
pub fn compress_chain(points: &[Point<i32>]) -> Vec<Point<i32>> {
    if points.len() < 3 {
        return points.to_vec();
    }

    let kept: Vec<Point<i32>> = points
        .iter()
        .circular_tuple_windows::<(_, _, _)>()
        .filter(|&(a, b, c)| {
            let (dx1, dy1) = (b.x - a.x, b.y - a.y);
            let (dx2, dy2) = (c.x - b.x, c.y - b.y);
            if dx1 == 0 && dy1 == 0 {
                return false;
            }
            let cross = dx1 as i64 * dy2 as i64 - dy1 as i64 * dx2 as i64;
            let dot = dx1 as i64 * dx2 as i64 + dy1 as i64 * dy2 as i64;
            !(cross == 0 && dot > 0)
        })
        .map(|(_, b, _)| *b)
        .collect();

    if kept.is_empty() {
        // All points coincide.
        return vec![points[0]];
    }
    kept
}

pub fn simplify_closed(points: &[Point<i32>], epsilon: f64) -> Vec<Point<i32>> {
    if points.len() < 4 || epsilon <= 0.0 {
        return points.to_vec();
    }

    // Split the loop at the point farthest from the first one.
    let first = points[0];
    let far = (1..points.len())
        .max_by_key(|&i| dist2(first, points[i]))
        .unwrap_or(1);

    let mut out = Vec::with_capacity(points.len());
    douglas_peucker(&points[..=far], epsilon, &mut out);
    let mut tail = points[far..].to_vec();
    tail.push(first);
    douglas_peucker(&tail, epsilon, &mut out);
    out
}

/// Pushes the kept points of an open curve, excluding its last point.
fn douglas_peucker(curve: &[Point<i32>], epsilon: f64, out: &mut Vec<Point<i32>>) {
    let n = curve.len();
    if n < 3 {
        if let Some(&p) = curve.first() {
            out.push(p);
        }
        return;
    }

    let a = curve[0];
    let b = curve[n - 1];
    let mut dmax = 0.0;
    let mut index = 0;
    for (i, &p) in curve.iter().enumerate().take(n - 1).skip(1) {
        let d = segment_distance(p, a, b);
        if d > dmax {
            dmax = d;
            index = i;
        }
    }

    if dmax > epsilon {
        douglas_peucker(&curve[..=index], epsilon, out);
        douglas_peucker(&curve[index..], epsilon, out);
    } else {
        out.push(a);
    }
}

fn segment_distance(p: Point<i32>, a: Point<i32>, b: Point<i32>) -> f64 {
    let (px, py) = (p.x as f64, p.y as f64);
    let (ax, ay) = (a.x as f64, a.y as f64);
    let (dx, dy) = (b.x as f64 - ax, b.y as f64 - ay);
    let len = (dx * dx + dy * dy).sqrt();
    if len < 1e-12 {
        return ((px - ax).powi(2) + (py - ay).powi(2)).sqrt();
    }
    ((px - ax) * dy - (py - ay) * dx).abs() / len
}

fn dist2(a: Point<i32>, b: Point<i32>) -> i64 {
    let dx = (a.x - b.x) as i64;
    let dy = (a.y - b.y) as i64;
    dx * dx + dy * dy
}
