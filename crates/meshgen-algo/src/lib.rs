//! Image and prompt to mesh conversion.
//!
//! Two pipelines share one output type: an image is reduced to a silhouette
//! and extruded, a prompt is classified and assembled from primitives.

pub mod assembler;
pub mod background;
pub mod classifier;
pub mod contour;
pub mod extrude;
pub mod fallback;
pub mod pipeline;
pub mod preview;
pub mod primitives;
pub mod silhouette;

pub use background::{BackgroundFilter, BackgroundMode, BorderColorFilter, FnFilter, PassThrough};
pub use classifier::{classify, Classifier, ClassifierConfig, MatchMode};
pub use extrude::{ContourToSolid, ExtrudeConfig};
pub use pipeline::{load_image, Conversion, Pipeline, PipelineConfig};
pub use preview::{PreviewBackend, PreviewConfig, Previewer, RasterPreviewer};
pub use silhouette::{SilhouetteConfig, SilhouetteExtractor, SilhouetteMap};
