use std::path::PathBuf;
use thiserror::Error;

/// Hard failures: the only errors allowed to reach the caller of a pipeline.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("cannot read image {path:?}: {reason}")]
    Unreadable { path: PathBuf, reason: String },

    #[error("image has zero size ({width}x{height})")]
    EmptyImage { width: u32, height: u32 },

    #[error("prompt is empty")]
    EmptyPrompt,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum MeshError {
    #[error("face {face} references vertex {index}, but the mesh has {vertex_count} vertices")]
    IndexOutOfRange {
        face: usize,
        index: u32,
        vertex_count: usize,
    },

    #[error("face {face} repeats a vertex index")]
    DegenerateFace { face: usize },

    #[error("vertex {index} has a non-finite coordinate")]
    NonFiniteVertex { index: usize },

    #[error("mesh has {0} vertices, more than a u32 index can address")]
    TooManyVertices(usize),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    #[error("{what} must be positive and finite, got {value}")]
    InvalidDimension { what: &'static str, value: f64 },

    #[error("polygon has {0} vertices, at least 3 are required")]
    TooFewVertices(usize),

    #[error("polygon encloses no area")]
    ZeroArea,

    #[error("polygon could not be triangulated")]
    Triangulation,

    #[error(transparent)]
    Mesh(#[from] MeshError),
}

/// Recoverable outcomes of a mesh-producing stage. Callers substitute a
/// fallback mesh and surface the condition as a warning.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Degenerate {
    #[error("No edges detected.")]
    NoEdges,

    #[error("No contours found.")]
    NoContours,

    #[error("Contour geometry failed: {0}")]
    Geometry(#[from] GeometryError),

    #[error("Primitive assembly failed: {0}")]
    Assembly(GeometryError),
}

impl Degenerate {
    pub fn code(&self) -> &'static str {
        match self {
            Degenerate::NoEdges => "no_edges",
            Degenerate::NoContours => "no_contours",
            Degenerate::Geometry(_) => "contour_geometry_failed",
            Degenerate::Assembly(_) => "assembly_failed",
        }
    }
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("mesh is not exportable: {0}")]
    InvalidMesh(#[from] MeshError),

    #[error("export I/O failed: {0}")]
    Io(#[from] std::io::Error),
}
