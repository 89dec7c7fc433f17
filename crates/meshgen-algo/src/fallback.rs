//! The single place where degenerate stage outcomes turn into fallback meshes.

use crate::primitives::cuboid;
use meshgen_core::error::Degenerate;
use meshgen_core::geom::Vec3;
use meshgen_core::model::Mesh;
use meshgen_core::report::Warning;
use tracing::warn;

pub const IMAGE_FALLBACK_EXTENTS: Vec3 = Vec3::new(2.0, 2.0, 1.0);
pub const TEXT_FALLBACK_EXTENTS: Vec3 = Vec3::new(1.0, 1.0, 1.0);

/// Flat box returned by the image path when no silhouette can be used.
pub fn flat_box() -> Mesh {
    fixed_box(IMAGE_FALLBACK_EXTENTS)
}

/// Unit cube returned by the text path.
pub fn unit_cube() -> Mesh {
    fixed_box(TEXT_FALLBACK_EXTENTS)
}

fn fixed_box(extents: Vec3) -> Mesh {
    // Constant, strictly positive extents always build.
    cuboid(extents).unwrap_or_default()
}

/// Returns the stage mesh, or the fallback with the failure recorded as a warning.
pub fn recover(
    outcome: Result<Mesh, Degenerate>,
    fallback: impl FnOnce() -> Mesh,
    warnings: &mut Vec<Warning>,
) -> Mesh {
    match outcome {
        Ok(mesh) => mesh,
        Err(reason) => {
            warn!(code = reason.code(), "{reason} Using fallback shape.");
            warnings.push(Warning::new(
                reason.code(),
                format!("{reason} Using fallback shape."),
            ));
            fallback()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recover_passes_through_success() {
        let mut warnings = Vec::new();
        let mesh = recover(Ok(unit_cube()), flat_box, &mut warnings);
        assert_eq!(unit_cube(), mesh);
        assert!(warnings.is_empty());
    }

    #[test]
    fn recover_substitutes_and_warns() {
        let mut warnings = Vec::new();
        let mesh = recover(Err(Degenerate::NoEdges), flat_box, &mut warnings);
        assert_eq!(IMAGE_FALLBACK_EXTENTS, mesh.extents());
        assert_eq!(1, warnings.len());
        assert_eq!("no_edges", warnings[0].code);
    }
}
