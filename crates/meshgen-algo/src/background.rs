use image::{Rgb, RgbImage};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FilterError {
    #[error("background removal failed: {0}")]
    Failed(String),

    #[error("filter returned {got_w}x{got_h}, expected {want_w}x{want_h}")]
    DimensionMismatch {
        want_w: u32,
        want_h: u32,
        got_w: u32,
        got_h: u32,
    },
}

/// Isolates the foreground. Implementations may fail; callers fall back to the input.
pub trait BackgroundFilter {
    fn remove_background(&self, image: &RgbImage) -> Result<RgbImage, FilterError>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PassThrough;

impl BackgroundFilter for PassThrough {
    fn remove_background(&self, image: &RgbImage) -> Result<RgbImage, FilterError> {
        Ok(image.clone())
    }
}

/// Adapts a closure, mostly for tests and embedding callers.
pub struct FnFilter<F>(pub F);

impl<F> BackgroundFilter for FnFilter<F>
where
    F: Fn(&RgbImage) -> Result<RgbImage, FilterError>,
{
    fn remove_background(&self, image: &RgbImage) -> Result<RgbImage, FilterError> {
        (self.0)(image)
    }
}

/// Treats the median border colour as background and paints every pixel
/// within `tolerance` of it black.
#[derive(Debug, Clone, Copy)]
pub struct BorderColorFilter {
    pub tolerance: u8,
}

impl Default for BorderColorFilter {
    fn default() -> Self {
        Self { tolerance: 24 }
    }
}

impl BackgroundFilter for BorderColorFilter {
    fn remove_background(&self, image: &RgbImage) -> Result<RgbImage, FilterError> {
        let Some(bg) = border_median(image) else {
            return Err(FilterError::Failed("image has no border pixels".to_string()));
        };
        let tol = self.tolerance as i16;

        let mut out = image.clone();
        for px in out.pixels_mut() {
            let close = px
                .0
                .iter()
                .zip(bg.0.iter())
                .all(|(&a, &b)| (a as i16 - b as i16).abs() <= tol);
            if close {
                *px = Rgb([0, 0, 0]);
            }
        }
        Ok(out)
    }
}

fn border_median(image: &RgbImage) -> Option<Rgb<u8>> {
    let (w, h) = image.dimensions();
    if w == 0 || h == 0 {
        return None;
    }

    let mut channels: [Vec<u8>; 3] = [Vec::new(), Vec::new(), Vec::new()];
    let mut push = |x: u32, y: u32| {
        let px = image.get_pixel(x, y);
        for (c, v) in channels.iter_mut().zip(px.0) {
            c.push(v);
        }
    };
    for x in 0..w {
        push(x, 0);
        push(x, h - 1);
    }
    for y in 0..h {
        push(0, y);
        push(w - 1, y);
    }

    let mut median = [0u8; 3];
    for (m, c) in median.iter_mut().zip(channels.iter_mut()) {
        c.sort_unstable();
        *m = c[c.len() / 2];
    }
    Some(Rgb(median))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackgroundMode {
    #[default]
    None,
    Border,
}

impl BackgroundMode {
    pub fn filter(self) -> Box<dyn BackgroundFilter> {
        match self {
            BackgroundMode::None => Box::new(PassThrough),
            BackgroundMode::Border => Box::new(BorderColorFilter::default()),
        }
    }
}
