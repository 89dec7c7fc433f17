pub mod error;
pub mod export;
pub mod geom;
pub mod model;
pub mod report;
pub mod stl;

pub use error::{Degenerate, ExportError, GeometryError, InputError, MeshError};
pub use geom::{BBox3, Vec3};
pub use model::{Category, Mesh, PrimitiveSpec, Rotation, ShapeKind};
pub use report::Warning;
