use crate::geom::BBox3;
use crate::model::{Category, Mesh};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Warning {
    pub code: String,
    pub message: String,
}

impl Warning {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputKind {
    Image,
    Text,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeshSummary {
    pub vertices: usize,
    pub faces: usize,
    pub bounds: Option<BBox3>,
}

impl MeshSummary {
    pub fn of(mesh: &Mesh) -> Self {
        Self {
            vertices: mesh.vertex_count(),
            faces: mesh.face_count(),
            bounds: mesh.bounds(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartReport {
    pub name: String,
    pub vertices: usize,
    pub faces: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionReport {
    pub input_kind: InputKind,
    pub input: String,
    pub category: Option<Category>,
    pub fallback_used: bool,
    pub parts: Vec<PartReport>,
    pub contours_used: usize,
    pub mesh: MeshSummary,
    pub warnings: Vec<Warning>,
}
