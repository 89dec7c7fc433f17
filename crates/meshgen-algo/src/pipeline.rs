use crate::assembler::{assemble_or_fallback, recipe};
use crate::background::{BackgroundFilter, BackgroundMode};
use crate::classifier::{Classifier, ClassifierConfig};
use crate::extrude::{ContourToSolid, ExtrudeConfig};
use crate::preview::PreviewConfig;
use crate::silhouette::{SilhouetteConfig, SilhouetteExtractor, SilhouetteMap};
use image::RgbImage;
use meshgen_core::error::InputError;
use meshgen_core::model::{Category, Mesh};
use meshgen_core::report::{ConversionReport, InputKind, MeshSummary, PartReport, Warning};
use meshgen_core::stl::StlFormat;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub silhouette: SilhouetteConfig,
    pub extrude: ExtrudeConfig,
    pub classifier: ClassifierConfig,
    pub background: BackgroundMode,
    pub preview: PreviewConfig,
    pub stl_format: StlFormat,
}

/// Result of one conversion. `edges` is only present for image input.
#[derive(Debug, Clone)]
pub struct Conversion {
    pub mesh: Mesh,
    pub edges: Option<SilhouetteMap>,
    pub category: Option<Category>,
    pub parts: Vec<PartReport>,
    pub contours_used: usize,
    pub fallback_used: bool,
    pub warnings: Vec<Warning>,
}

impl Conversion {
    pub fn report(&self, kind: InputKind, input: impl Into<String>) -> ConversionReport {
        ConversionReport {
            input_kind: kind,
            input: input.into(),
            category: self.category,
            fallback_used: self.fallback_used,
            parts: self.parts.clone(),
            contours_used: self.contours_used,
            mesh: MeshSummary::of(&self.mesh),
            warnings: self.warnings.clone(),
        }
    }
}

pub fn load_image(path: &Path) -> Result<RgbImage, InputError> {
    let decoded = image::open(path).map_err(|err| InputError::Unreadable {
        path: path.to_path_buf(),
        reason: err.to_string(),
    })?;
    Ok(decoded.to_rgb8())
}

pub struct Pipeline {
    cfg: PipelineConfig,
}

impl Pipeline {
    pub fn new(cfg: PipelineConfig) -> Self {
        Self { cfg }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.cfg
    }

    /// Image to extruded solid using the configured background mode.
    pub fn image_to_mesh(&self, image: &RgbImage) -> Result<Conversion, InputError> {
        let filter = self.cfg.background.filter();
        self.image_to_mesh_with(image, filter.as_ref())
    }

    /// Image to extruded solid. Only an empty image is a hard error; every
    /// downstream failure degrades to the fallback box.
    pub fn image_to_mesh_with(
        &self,
        image: &RgbImage,
        filter: &dyn BackgroundFilter,
    ) -> Result<Conversion, InputError> {
        let extractor = SilhouetteExtractor::new(self.cfg.silhouette.clone());
        let extraction = extractor.extract(image, filter)?;

        let solid = ContourToSolid::new(self.cfg.extrude.clone()).build_or_fallback(&extraction.map);
        let mut warnings = extraction.warnings;
        warnings.extend(solid.warnings);

        info!(
            vertices = solid.mesh.vertex_count(),
            faces = solid.mesh.face_count(),
            contours = solid.contours_used,
            fallback = solid.fallback_used,
            "image converted"
        );

        Ok(Conversion {
            mesh: solid.mesh,
            edges: Some(extraction.map),
            category: None,
            parts: Vec::new(),
            contours_used: solid.contours_used,
            fallback_used: solid.fallback_used,
            warnings,
        })
    }

    pub fn image_file_to_mesh(&self, path: &Path) -> Result<Conversion, InputError> {
        let image = load_image(path)?;
        debug!(path = ?path, width = image.width(), height = image.height(), "image loaded");
        self.image_to_mesh(&image)
    }

    /// Prompt to primitive assembly. A blank prompt is rejected; anything
    /// else classifies, unmatched text becoming the cube.
    pub fn text_to_mesh(&self, prompt: &str) -> Result<Conversion, InputError> {
        if prompt.trim().is_empty() {
            return Err(InputError::EmptyPrompt);
        }

        let classifier = Classifier::new(self.cfg.classifier.clone());
        let (category, mut warnings) = classifier.classify_with_warnings(prompt);
        let (assembly, fallback_used) =
            assemble_or_fallback(category, &recipe(category), &mut warnings);

        info!(
            category = %category,
            parts = assembly.parts.len(),
            vertices = assembly.mesh.vertex_count(),
            faces = assembly.mesh.face_count(),
            "prompt converted"
        );

        Ok(Conversion {
            mesh: assembly.mesh,
            edges: None,
            category: Some(category),
            parts: assembly.parts,
            contours_used: 0,
            fallback_used,
            warnings,
        })
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new(PipelineConfig::default())
    }
}
