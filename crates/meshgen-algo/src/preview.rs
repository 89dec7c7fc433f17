//! Software preview: orthographic, flat-shaded, painter's ordering.

use image::{Rgb, RgbImage};
use imageproc::drawing::draw_polygon_mut;
use imageproc::point::Point;
use meshgen_core::geom::Vec3;
use meshgen_core::model::Mesh;
use serde::{Deserialize, Serialize};

const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
const BASE_COLOR: [f64; 3] = [70.0, 130.0, 180.0];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PreviewBackend {
    #[default]
    Raster,
    Disabled,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewConfig {
    pub backend: PreviewBackend,
    pub width: u32,
    pub height: u32,
    pub elevation_deg: f64,
    pub azimuth_deg: f64,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            backend: PreviewBackend::Raster,
            width: 800,
            height: 600,
            elevation_deg: 20.0,
            azimuth_deg: 45.0,
        }
    }
}

impl PreviewConfig {
    pub fn previewer(&self) -> Box<dyn Previewer> {
        match self.backend {
            PreviewBackend::Raster => Box::new(RasterPreviewer::new(self.clone())),
            PreviewBackend::Disabled => Box::new(NoPreview),
        }
    }
}

/// Read-only consumer of a finished mesh.
pub trait Previewer {
    fn render(&self, mesh: &Mesh) -> Option<RgbImage>;
}

pub struct NoPreview;

impl Previewer for NoPreview {
    fn render(&self, _mesh: &Mesh) -> Option<RgbImage> {
        None
    }
}

pub struct RasterPreviewer {
    cfg: PreviewConfig,
}

impl RasterPreviewer {
    pub fn new(cfg: PreviewConfig) -> Self {
        Self { cfg }
    }
}

struct Camera {
    toward: Vec3,
    right: Vec3,
    up: Vec3,
}

impl Camera {
    fn new(elevation_deg: f64, azimuth_deg: f64) -> Self {
        let (el, az) = (elevation_deg.to_radians(), azimuth_deg.to_radians());
        let toward = Vec3::new(el.cos() * az.cos(), el.cos() * az.sin(), el.sin());
        let right = Vec3::new(-az.sin(), az.cos(), 0.0);
        let up = toward.cross(right);
        Self { toward, right, up }
    }

    /// Screen x, screen y, and depth (larger is nearer).
    fn project(&self, p: Vec3) -> (f64, f64, f64) {
        (p.dot(self.right), p.dot(self.up), p.dot(self.toward))
    }
}

impl Previewer for RasterPreviewer {
    fn render(&self, mesh: &Mesh) -> Option<RgbImage> {
        let (w, h) = (self.cfg.width.max(1), self.cfg.height.max(1));
        let mut img = RgbImage::from_pixel(w, h, BACKGROUND);
        if mesh.is_empty() || mesh.validate().is_err() {
            return Some(img);
        }

        let camera = Camera::new(self.cfg.elevation_deg, self.cfg.azimuth_deg);
        let projected: Vec<(f64, f64, f64)> =
            mesh.vertices.iter().map(|&v| camera.project(v)).collect();

        let (mut min_x, mut max_x) = (f64::INFINITY, f64::NEG_INFINITY);
        let (mut min_y, mut max_y) = (f64::INFINITY, f64::NEG_INFINITY);
        for &(x, y, _) in &projected {
            min_x = min_x.min(x);
            max_x = max_x.max(x);
            min_y = min_y.min(y);
            max_y = max_y.max(y);
        }
        let span = (max_x - min_x).max(max_y - min_y).max(1e-9);
        let scale = 0.9 * (w.min(h) as f64) / span;
        let (cx, cy) = ((min_x + max_x) * 0.5, (min_y + max_y) * 0.5);
        let to_pixel = |(x, y, _): (f64, f64, f64)| {
            Point::new(
                (w as f64 * 0.5 + (x - cx) * scale).round() as i32,
                (h as f64 * 0.5 - (y - cy) * scale).round() as i32,
            )
        };

        // Painter's order: back faces culled, the rest drawn far to near.
        let mut visible: Vec<(f64, Rgb<u8>, [Point<i32>; 3])> = mesh
            .faces
            .iter()
            .filter_map(|&face| {
                let facing = mesh.face_normal(face).dot(camera.toward);
                if facing < 0.0 {
                    return None;
                }
                let depth = face.iter().map(|&i| projected[i as usize].2).sum::<f64>() / 3.0;
                let shade = 0.25 + 0.75 * facing;
                let color = Rgb(BASE_COLOR.map(|c| (c * shade).round().clamp(0.0, 255.0) as u8));
                Some((depth, color, face.map(|i| to_pixel(projected[i as usize]))))
            })
            .collect();
        visible.sort_by(|a, b| a.0.total_cmp(&b.0));

        for (_, color, tri) in &visible {
            if covers_pixels(tri) {
                draw_polygon_mut(&mut img, tri, *color);
            }
        }
        Some(img)
    }
}

/// Triangles that collapse to a line or point once snapped to pixels are skipped.
fn covers_pixels([a, b, c]: &[Point<i32>; 3]) -> bool {
    let cross = (b.x - a.x) as i64 * (c.y - a.y) as i64 - (b.y - a.y) as i64 * (c.x - a.x) as i64;
    cross != 0
}
