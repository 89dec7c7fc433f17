use crate::background::{BackgroundFilter, FilterError};
use image::imageops::{self, FilterType};
use image::{GrayImage, RgbImage};
use imageproc::distance_transform::Norm;
use meshgen_core::error::InputError;
use meshgen_core::report::Warning;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Separable taps of the 5x5 Gaussian whose sigma is derived from its size.
pub const GAUSSIAN_5: [f32; 5] = [0.0625, 0.25, 0.375, 0.25, 0.0625];

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SilhouetteConfig {
    /// Smooth with the 5x5 binomial kernel before edge detection.
    pub blur: bool,
    pub low_threshold: f32,
    pub high_threshold: f32,
    /// Chebyshev radius of the dilation; 1 is a 3x3 square.
    pub dilate_radius: u8,
    /// Longest side of the working image; larger inputs are downscaled.
    pub max_dimension: Option<u32>,
}

impl Default for SilhouetteConfig {
    fn default() -> Self {
        Self {
            blur: true,
            low_threshold: 50.0,
            high_threshold: 150.0,
            dilate_radius: 1,
            max_dimension: Some(1024),
        }
    }
}

/// Binary edge map: 255 where an edge is present, 0 elsewhere.
#[derive(Debug, Clone, PartialEq)]
pub struct SilhouetteMap {
    edges: GrayImage,
}

impl SilhouetteMap {
    /// Wraps a grayscale image, treating every non-zero pixel as set.
    pub fn from_image(image: GrayImage) -> Self {
        let mut edges = image;
        for px in edges.pixels_mut() {
            px.0[0] = if px.0[0] > 0 { 255 } else { 0 };
        }
        Self { edges }
    }

    pub fn blank(width: u32, height: u32) -> Self {
        Self {
            edges: GrayImage::new(width, height),
        }
    }

    pub fn width(&self) -> u32 {
        self.edges.width()
    }

    pub fn height(&self) -> u32 {
        self.edges.height()
    }

    pub fn set_count(&self) -> usize {
        self.edges.pixels().filter(|p| p.0[0] > 0).count()
    }

    pub fn is_empty(&self) -> bool {
        !self.edges.pixels().any(|p| p.0[0] > 0)
    }

    pub fn as_image(&self) -> &GrayImage {
        &self.edges
    }
}

#[derive(Debug, Clone)]
pub struct SilhouetteExtraction {
    pub map: SilhouetteMap,
    pub background_removed: bool,
    pub warnings: Vec<Warning>,
}

pub struct SilhouetteExtractor {
    cfg: SilhouetteConfig,
}

impl SilhouetteExtractor {
    pub fn new(cfg: SilhouetteConfig) -> Self {
        Self { cfg }
    }

    pub fn extract(
        &self,
        image: &RgbImage,
        filter: &dyn BackgroundFilter,
    ) -> Result<SilhouetteExtraction, InputError> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(InputError::EmptyImage { width, height });
        }

        let mut warnings = Vec::new();
        let (foreground, background_removed) = match apply_filter(filter, image) {
            Ok(filtered) => (filtered, true),
            Err(err) => {
                warn!(error = %err, "background removal failed, using original image");
                warnings.push(Warning::new(
                    "background_filter_failed",
                    format!("Background removal failed ({err}). Using original image."),
                ));
                (image.clone(), false)
            }
        };

        let working = self.downscale(foreground);
        let gray = imageops::grayscale(&working);
        let blurred = if self.cfg.blur {
            imageproc::filter::separable_filter_equal(&gray, &GAUSSIAN_5)
        } else {
            gray
        };

        let (low, high) = ordered(self.cfg.low_threshold, self.cfg.high_threshold);
        let edges = imageproc::edges::canny(&blurred, low, high);
        let edges = if self.cfg.dilate_radius > 0 {
            imageproc::morphology::dilate(&edges, Norm::LInf, self.cfg.dilate_radius)
        } else {
            edges
        };

        let map = SilhouetteMap::from_image(edges);
        debug!(
            width = map.width(),
            height = map.height(),
            set = map.set_count(),
            "silhouette extracted"
        );

        Ok(SilhouetteExtraction {
            map,
            background_removed,
            warnings,
        })
    }

    fn downscale(&self, image: RgbImage) -> RgbImage {
        let Some(max_dim) = self.cfg.max_dimension.filter(|&d| d > 0) else {
            return image;
        };
        let (w, h) = image.dimensions();
        let longest = w.max(h);
        if longest <= max_dim {
            return image;
        }
        let scale = max_dim as f64 / longest as f64;
        let nw = ((w as f64 * scale).round() as u32).max(1);
        let nh = ((h as f64 * scale).round() as u32).max(1);
        debug!(from = ?(w, h), to = ?(nw, nh), "downscaling to working resolution");
        imageops::resize(&image, nw, nh, FilterType::Triangle)
    }
}

impl Default for SilhouetteExtractor {
    fn default() -> Self {
        Self::new(SilhouetteConfig::default())
    }
}

/// Runs the filter and rejects output whose size does not match the input.
fn apply_filter(filter: &dyn BackgroundFilter, image: &RgbImage) -> Result<RgbImage, FilterError> {
    let filtered = filter.remove_background(image)?;
    if filtered.dimensions() != image.dimensions() {
        return Err(FilterError::DimensionMismatch {
            want_w: image.width(),
            want_h: image.height(),
            got_w: filtered.width(),
            got_h: filtered.height(),
        });
    }
    Ok(filtered)
}

fn ordered(a: f32, b: f32) -> (f32, f32) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}
