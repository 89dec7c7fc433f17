use crate::error::MeshError;
use crate::geom::{BBox3, Vec3};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Indexed triangle mesh. Faces are counter-clockwise when seen from outside.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Mesh {
    pub vertices: Vec<Vec3>,
    pub faces: Vec<[u32; 3]>,
}

impl Mesh {
    /// Builds a mesh and checks that every face references a valid vertex.
    pub fn new(vertices: Vec<Vec3>, faces: Vec<[u32; 3]>) -> Result<Self, MeshError> {
        let mesh = Self { vertices, faces };
        mesh.validate()?;
        Ok(mesh)
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    pub fn validate(&self) -> Result<(), MeshError> {
        if self.vertices.len() > u32::MAX as usize {
            return Err(MeshError::TooManyVertices(self.vertices.len()));
        }
        for (index, v) in self.vertices.iter().enumerate() {
            if !v.is_finite() {
                return Err(MeshError::NonFiniteVertex { index });
            }
        }
        let vertex_count = self.vertices.len();
        for (face, tri) in self.faces.iter().enumerate() {
            for &index in tri {
                if index as usize >= vertex_count {
                    return Err(MeshError::IndexOutOfRange {
                        face,
                        index,
                        vertex_count,
                    });
                }
            }
            if tri[0] == tri[1] || tri[1] == tri[2] || tri[0] == tri[2] {
                return Err(MeshError::DegenerateFace { face });
            }
        }
        Ok(())
    }

    pub fn bounds(&self) -> Option<BBox3> {
        if self.vertices.is_empty() {
            return None;
        }
        let mut bbox = BBox3::empty();
        for v in &self.vertices {
            bbox.include_point(*v);
        }
        Some(bbox)
    }

    pub fn extents(&self) -> Vec3 {
        self.bounds().map(|b| b.extents()).unwrap_or(Vec3::ZERO)
    }

    /// Unit normal of a face from its winding; zero for sliver triangles.
    pub fn face_normal(&self, face: [u32; 3]) -> Vec3 {
        let a = self.vertices[face[0] as usize];
        let b = self.vertices[face[1] as usize];
        let c = self.vertices[face[2] as usize];
        (b - a).cross(c - a).normalized()
    }

    /// Appends another mesh, shifting its face indices past our vertices.
    pub fn append(&mut self, other: Mesh) {
        let offset = self.vertices.len() as u32;
        self.vertices.extend(other.vertices);
        self.faces.extend(
            other
                .faces
                .into_iter()
                .map(|[a, b, c]| [a + offset, b + offset, c + offset]),
        );
    }

    /// Concatenation without deduplication: vertex and face counts add up.
    pub fn concatenate(meshes: impl IntoIterator<Item = Mesh>) -> Mesh {
        let mut out = Mesh::empty();
        for mesh in meshes {
            out.append(mesh);
        }
        out
    }

    /// Applies `f` to every vertex.
    pub fn map_vertices(mut self, f: impl Fn(Vec3) -> Vec3) -> Mesh {
        for v in &mut self.vertices {
            *v = f(*v);
        }
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Vehicle,
    Seating,
    Sphere,
    Cube,
    Cylinder,
    Unknown,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Vehicle,
        Category::Seating,
        Category::Sphere,
        Category::Cube,
        Category::Cylinder,
        Category::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Vehicle => "vehicle",
            Category::Seating => "seating",
            Category::Sphere => "sphere",
            Category::Cube => "cube",
            Category::Cylinder => "cylinder",
            Category::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "lowercase")]
pub enum ShapeKind {
    Box { extents: Vec3 },
    Cylinder { radius: f64, height: f64 },
    Icosphere { radius: f64 },
}

/// Rotation about an axis through the origin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rotation {
    pub axis: Vec3,
    pub angle_deg: f64,
}

impl Rotation {
    pub fn about_x(angle_deg: f64) -> Self {
        Self {
            axis: Vec3::new(1.0, 0.0, 0.0),
            angle_deg,
        }
    }
}

/// One solid before instantiation: shape, then rotation, then translation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrimitiveSpec {
    pub name: String,
    pub kind: ShapeKind,
    pub translation: Vec3,
    pub rotation: Option<Rotation>,
}

impl PrimitiveSpec {
    pub fn new(name: impl Into<String>, kind: ShapeKind) -> Self {
        Self {
            name: name.into(),
            kind,
            translation: Vec3::ZERO,
            rotation: None,
        }
    }

    pub fn at(mut self, translation: Vec3) -> Self {
        self.translation = translation;
        self
    }

    pub fn rotated(mut self, rotation: Rotation) -> Self {
        self.rotation = Some(rotation);
        self
    }
}
