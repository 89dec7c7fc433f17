use crate::contour::{outer_contours, Contour};
use crate::fallback;
use crate::silhouette::SilhouetteMap;
use meshgen_core::error::{Degenerate, GeometryError};
use meshgen_core::geom::Vec3;
use meshgen_core::model::Mesh;
use meshgen_core::report::Warning;
use nalgebra::{Point2, Vector2};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use tracing::{debug, warn};

const EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtrudeConfig {
    /// Prism thickness along z.
    pub depth: f64,
    /// Longest side of the footprint in model units.
    pub target_size: f64,
    /// Douglas-Peucker tolerance in pixels; 0 disables.
    pub simplify_epsilon: f64,
    /// Contours smaller than this fraction of the largest are dropped.
    pub min_area_ratio: f64,
    pub max_contours: usize,
}

impl Default for ExtrudeConfig {
    fn default() -> Self {
        Self {
            depth: 1.0,
            target_size: 2.0,
            simplify_epsilon: 1.0,
            min_area_ratio: 0.05,
            max_contours: 8,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Extrusion {
    pub mesh: Mesh,
    pub contours_used: usize,
    pub warnings: Vec<Warning>,
}

#[derive(Debug, Clone)]
pub struct SolidOutcome {
    pub mesh: Mesh,
    pub contours_used: usize,
    pub fallback_used: bool,
    pub warnings: Vec<Warning>,
}

pub struct ContourToSolid {
    cfg: ExtrudeConfig,
}

impl ContourToSolid {
    pub fn new(cfg: ExtrudeConfig) -> Self {
        Self { cfg }
    }

    /// Extrudes the silhouette, reporting why when no solid can be derived.
    pub fn build(&self, map: &SilhouetteMap) -> Result<Extrusion, Degenerate> {
        if map.is_empty() {
            return Err(Degenerate::NoEdges);
        }

        let contours = outer_contours(map);
        if contours.is_empty() {
            return Err(Degenerate::NoContours);
        }
        debug!(count = contours.len(), "outer contours found");

        let selected = self.select(contours)?;
        let frame = Frame::fit(&selected, self.cfg.target_size)?;
        let depth = positive("extrusion depth", self.cfg.depth)?;

        let mut mesh = Mesh::empty();
        let mut warnings = Vec::new();
        for contour in &selected {
            mesh.append(prism(&frame, contour, depth, &mut warnings)?);
        }
        mesh.validate().map_err(GeometryError::from)?;

        Ok(Extrusion {
            mesh,
            contours_used: selected.len(),
            warnings,
        })
    }

    /// Never fails: degenerate maps yield the flat fallback box.
    pub fn build_or_fallback(&self, map: &SilhouetteMap) -> SolidOutcome {
        let mut warnings = Vec::new();
        let mut contours_used = 0;
        let outcome = self.build(map).map(|extrusion| {
            warnings.extend(extrusion.warnings);
            contours_used = extrusion.contours_used;
            extrusion.mesh
        });
        let fallback_used = outcome.is_err();
        let mesh = fallback::recover(outcome, fallback::flat_box, &mut warnings);
        SolidOutcome {
            mesh,
            contours_used,
            fallback_used,
            warnings,
        }
    }

    /// Largest contour first, plus any others big enough to matter.
    fn select(&self, contours: Vec<Contour>) -> Result<Vec<Contour>, Degenerate> {
        let mut ranked: Vec<(f64, Contour)> = contours
            .into_iter()
            .map(|c| {
                let c = c.simplified(self.cfg.simplify_epsilon);
                (c.area(), c)
            })
            .filter(|(_, c)| c.len() >= 3)
            .collect();
        ranked.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));

        let Some(largest) = ranked.first().map(|(area, _)| *area) else {
            return Err(GeometryError::TooFewVertices(0).into());
        };
        if largest <= EPSILON {
            return Err(GeometryError::ZeroArea.into());
        }

        let min_area = largest * self.cfg.min_area_ratio.max(0.0);
        Ok(ranked
            .into_iter()
            .filter(|(area, _)| *area > EPSILON && *area >= min_area)
            .take(self.cfg.max_contours.max(1))
            .map(|(_, c)| c)
            .collect())
    }
}

impl Default for ContourToSolid {
    fn default() -> Self {
        Self::new(ExtrudeConfig::default())
    }
}

/// Pixel-to-model transform shared by every selected contour.
struct Frame {
    center: Point2<f64>,
    scale: f64,
}

impl Frame {
    fn fit(contours: &[Contour], target_size: f64) -> Result<Self, GeometryError> {
        let target_size = positive("target size", target_size)?;
        let mut min = Point2::new(f64::INFINITY, f64::INFINITY);
        let mut max = Point2::new(f64::NEG_INFINITY, f64::NEG_INFINITY);
        for p in contours.iter().flat_map(|c| c.points.iter()) {
            min.x = min.x.min(p.x as f64);
            min.y = min.y.min(p.y as f64);
            max.x = max.x.max(p.x as f64);
            max.y = max.y.max(p.y as f64);
        }
        let span = (max.x - min.x).max(max.y - min.y);
        if !span.is_finite() || span <= EPSILON {
            return Err(GeometryError::ZeroArea);
        }
        Ok(Self {
            center: nalgebra::center(&min, &max),
            scale: target_size / span,
        })
    }

    /// Centres, scales, and flips the image's y-down axis to y-up.
    fn map(&self, contour: &Contour) -> Vec<Point2<f64>> {
        contour
            .points
            .iter()
            .map(|p| {
                Point2::new(
                    (p.x as f64 - self.center.x) * self.scale,
                    (self.center.y - p.y as f64) * self.scale,
                )
            })
            .collect()
    }
}

/// Extrudes one contour, substituting its convex hull when the outline
/// touches itself and cannot be triangulated.
fn prism(
    frame: &Frame,
    contour: &Contour,
    depth: f64,
    warnings: &mut Vec<Warning>,
) -> Result<Mesh, GeometryError> {
    match extrude_polygon(&frame.map(contour), depth) {
        Err(GeometryError::Triangulation) => {
            warn!(
                points = contour.len(),
                "contour not simple, extruding its convex hull"
            );
            warnings.push(Warning::new(
                "convex_hull_substituted",
                "Contour could not be triangulated; its convex hull was extruded instead.",
            ));
            extrude_polygon(&frame.map(&contour.convex_hull()), depth)
        }
        other => other,
    }
}

/// Prism over the polygon spanning z in [-depth/2, depth/2].
pub fn extrude_polygon(polygon: &[Point2<f64>], depth: f64) -> Result<Mesh, GeometryError> {
    let mut ring = clean_polygon(polygon);
    if ring.len() < 3 {
        return Err(GeometryError::TooFewVertices(ring.len()));
    }
    let area = signed_area(&ring);
    if area.abs() <= EPSILON {
        return Err(GeometryError::ZeroArea);
    }
    if area < 0.0 {
        ring.reverse();
    }

    let caps = triangulate(&ring)?;
    let n = ring.len();
    let half = depth * 0.5;

    let mut vertices = Vec::with_capacity(2 * n);
    for z in [-half, half] {
        vertices.extend(ring.iter().map(|p| Vec3::new(p.x, p.y, z)));
    }

    let mut faces = Vec::with_capacity(2 * caps.len() + 2 * n);
    for [a, b, c] in caps {
        faces.push([c as u32, b as u32, a as u32]);
        faces.push([(n + a) as u32, (n + b) as u32, (n + c) as u32]);
    }
    for i in 0..n {
        let j = (i + 1) % n;
        faces.push([i as u32, j as u32, (n + j) as u32]);
        faces.push([i as u32, (n + j) as u32, (n + i) as u32]);
    }

    Ok(Mesh::new(vertices, faces)?)
}

/// Removes repeated and collinear vertices so every corner turns.
fn clean_polygon(polygon: &[Point2<f64>]) -> Vec<Point2<f64>> {
    let mut ring: Vec<Point2<f64>> = polygon.to_vec();
    ring.dedup_by(|a, b| (*a - *b).norm() < EPSILON);
    while ring.len() > 1 && (ring[0] - ring[ring.len() - 1]).norm() < EPSILON {
        ring.pop();
    }

    let mut changed = true;
    while changed && ring.len() >= 3 {
        changed = false;
        let n = ring.len();
        for i in 0..n {
            let prev = ring[(i + n - 1) % n];
            let next = ring[(i + 1) % n];
            if perp_dot(ring[i] - prev, next - ring[i]).abs() <= EPSILON {
                ring.remove(i);
                changed = true;
                break;
            }
        }
    }
    ring
}

/// Ear clipping over a counter-clockwise simple polygon.
pub fn triangulate(polygon: &[Point2<f64>]) -> Result<Vec<[usize; 3]>, GeometryError> {
    let n = polygon.len();
    if n < 3 {
        return Err(GeometryError::TooFewVertices(n));
    }

    let mut remaining: Vec<usize> = (0..n).collect();
    let mut triangles = Vec::with_capacity(n - 2);

    while remaining.len() > 3 {
        let m = remaining.len();
        let ear = (0..m).find(|&k| {
            let a = remaining[(k + m - 1) % m];
            let b = remaining[k];
            let c = remaining[(k + 1) % m];
            is_ear(polygon, &remaining, a, b, c)
        });
        let Some(k) = ear else {
            return Err(GeometryError::Triangulation);
        };
        let a = remaining[(k + m - 1) % m];
        let b = remaining[k];
        let c = remaining[(k + 1) % m];
        triangles.push([a, b, c]);
        remaining.remove(k);
    }

    let (a, b, c) = (remaining[0], remaining[1], remaining[2]);
    if perp_dot(polygon[b] - polygon[a], polygon[c] - polygon[a]) <= EPSILON {
        return Err(GeometryError::Triangulation);
    }
    triangles.push([a, b, c]);
    Ok(triangles)
}

fn is_ear(polygon: &[Point2<f64>], remaining: &[usize], a: usize, b: usize, c: usize) -> bool {
    let (pa, pb, pc) = (polygon[a], polygon[b], polygon[c]);
    if perp_dot(pb - pa, pc - pb) <= EPSILON {
        return false;
    }
    remaining.iter().all(|&i| {
        if i == a || i == b || i == c {
            return true;
        }
        let p = polygon[i];
        let coincident = [pa, pb, pc].iter().any(|q| (p - *q).norm() < EPSILON);
        coincident || !point_in_triangle(p, pa, pb, pc)
    })
}

fn point_in_triangle(p: Point2<f64>, a: Point2<f64>, b: Point2<f64>, c: Point2<f64>) -> bool {
    let d1 = perp_dot(b - a, p - a);
    let d2 = perp_dot(c - b, p - b);
    let d3 = perp_dot(a - c, p - c);
    d1 >= -EPSILON && d2 >= -EPSILON && d3 >= -EPSILON
}

fn signed_area(ring: &[Point2<f64>]) -> f64 {
    let n = ring.len();
    let twice: f64 = (0..n)
        .map(|i| {
            let a = ring[i];
            let b = ring[(i + 1) % n];
            a.x * b.y - b.x * a.y
        })
        .sum();
    twice * 0.5
}

fn perp_dot(v1: Vector2<f64>, v2: Vector2<f64>) -> f64 {
    v1.x * v2.y - v1.y * v2.x
}

fn positive(what: &'static str, value: f64) -> Result<f64, GeometryError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(GeometryError::InvalidDimension { what, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn poly(coords: &[(f64, f64)]) -> Vec<Point2<f64>> {
        coords.iter().map(|&(x, y)| Point2::new(x, y)).collect()
    }

    #[test]
    fn triangulates_concave_l_shape() {
        let l = poly(&[
            (0.0, 0.0),
            (2.0, 0.0),
            (2.0, 1.0),
            (1.0, 1.0),
            (1.0, 2.0),
            (0.0, 2.0),
        ]);
        let tris = triangulate(&l).expect("simple polygon");
        assert_eq!(4, tris.len());
        let area: f64 = tris
            .iter()
            .map(|&[a, b, c]| perp_dot(l[b] - l[a], l[c] - l[a]) * 0.5)
            .sum();
        assert!((area - 3.0).abs() < 1e-9);
    }

    #[test]
    fn clean_polygon_drops_collinear_and_repeated_points() {
        let square = poly(&[
            (0.0, 0.0),
            (1.0, 0.0),
            (1.0, 0.0),
            (2.0, 0.0),
            (2.0, 2.0),
            (0.0, 2.0),
            (0.0, 0.0),
        ]);
        assert_eq!(4, clean_polygon(&square).len());
    }

    fn crossed_ring() -> Contour {
        // Edges (0,0)-(40,40) and (40,0)-(0,20) cross.
        Contour::new(
            [(0, 0), (40, 40), (40, 0), (0, 20)]
                .into_iter()
                .map(|(x, y)| imageproc::point::Point::new(x, y))
                .collect(),
        )
    }

    #[test]
    fn crossed_ring_cannot_be_triangulated() {
        let contour = crossed_ring();
        let frame = Frame::fit(std::slice::from_ref(&contour), 2.0).expect("frame");
        let ring = frame.map(&contour);
        assert!(signed_area(&ring).abs() > EPSILON);
        assert_eq!(Err(GeometryError::Triangulation), triangulate(&ring));
    }

    #[test]
    fn crossed_contour_is_replaced_by_its_hull() {
        let contour = crossed_ring();
        let frame = Frame::fit(std::slice::from_ref(&contour), 2.0).expect("frame");
        let mut warnings = Vec::new();

        let mesh = prism(&frame, &contour, 1.0, &mut warnings).expect("hull prism");
        assert_eq!(1, warnings.len());
        assert_eq!("convex_hull_substituted", warnings[0].code);
        assert_eq!(8, mesh.vertex_count());
        assert_eq!(12, mesh.face_count());
        let ext = mesh.extents();
        assert!((ext.x - 2.0).abs() < 1e-9 && (ext.y - 2.0).abs() < 1e-9);
    }

    #[test]
    fn simple_contour_needs_no_hull() {
        let square = Contour::new(
            [(0, 0), (10, 0), (10, 10), (0, 10)]
                .into_iter()
                .map(|(x, y)| imageproc::point::Point::new(x, y))
                .collect(),
        );
        let frame = Frame::fit(std::slice::from_ref(&square), 2.0).expect("frame");
        let mut warnings = Vec::new();
        prism(&frame, &square, 1.0, &mut warnings).expect("prism");
        assert!(warnings.is_empty());
    }

    #[test]
    fn clockwise_input_still_extrudes_outward() {
        let cw = poly(&[(0.0, 0.0), (0.0, 1.0), (1.0, 1.0), (1.0, 0.0)]);
        let mesh = extrude_polygon(&cw, 1.0).expect("square prism");
        assert_eq!(8, mesh.vertex_count());
        assert_eq!(12, mesh.face_count());
        let top = mesh
            .faces
            .iter()
            .filter(|f| f.iter().all(|&i| mesh.vertices[i as usize].z > 0.0))
            .map(|&f| mesh.face_normal(f))
            .collect::<Vec<_>>();
        assert_eq!(2, top.len());
        assert!(top.iter().all(|n| n.z > 0.99));
    }
}
