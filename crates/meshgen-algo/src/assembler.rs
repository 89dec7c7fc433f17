use crate::fallback;
use crate::primitives::instantiate;
use meshgen_core::error::{Degenerate, GeometryError};
use meshgen_core::geom::Vec3;
use meshgen_core::model::{Category, Mesh, PrimitiveSpec, ShapeKind};
use meshgen_core::report::{PartReport, Warning};

#[derive(Debug, Clone, PartialEq)]
pub struct Assembly {
    pub category: Category,
    pub mesh: Mesh,
    pub parts: Vec<PartReport>,
}

/// Primitive layout for a category. `Unknown` uses the cube recipe.
pub fn recipe(category: Category) -> Vec<PrimitiveSpec> {
    match category {
        Category::Vehicle => vehicle(),
        Category::Seating => seating(),
        Category::Sphere => vec![PrimitiveSpec::new(
            "sphere",
            ShapeKind::Icosphere { radius: 1.0 },
        )],
        Category::Cube | Category::Unknown => cube(),
        Category::Cylinder => vec![PrimitiveSpec::new(
            "cylinder",
            ShapeKind::Cylinder {
                radius: 0.5,
                height: 1.0,
            },
        )],
    }
}

fn vehicle() -> Vec<PrimitiveSpec> {
    let mut specs = vec![
        PrimitiveSpec::new(
            "body",
            ShapeKind::Box {
                extents: Vec3::new(2.0, 1.0, 0.5),
            },
        ),
        PrimitiveSpec::new(
            "roof",
            ShapeKind::Box {
                extents: Vec3::new(1.5, 0.8, 0.5),
            },
        )
        .at(Vec3::new(0.0, 0.0, 0.5)),
    ];
    for i in 0..4 {
        let x = if i < 2 { -0.8 } else { 0.8 };
        let y = if i % 2 == 0 { -0.6 } else { 0.6 };
        specs.push(
            PrimitiveSpec::new(
                format!("wheel_{i}"),
                ShapeKind::Cylinder {
                    radius: 0.2,
                    height: 0.2,
                },
            )
            .at(Vec3::new(x, y, -0.2)),
        );
    }
    specs
}

fn seating() -> Vec<PrimitiveSpec> {
    let mut specs = vec![PrimitiveSpec::new(
        "seat",
        ShapeKind::Box {
            extents: Vec3::new(1.0, 1.0, 0.1),
        },
    )];
    for i in 0..4 {
        let x = if i % 2 == 0 { -0.4 } else { 0.4 };
        let y = if i < 2 { -0.4 } else { 0.4 };
        specs.push(
            PrimitiveSpec::new(
                format!("leg_{i}"),
                ShapeKind::Cylinder {
                    radius: 0.05,
                    height: 0.8,
                },
            )
            .at(Vec3::new(x, y, -0.8)),
        );
    }
    specs.push(
        PrimitiveSpec::new(
            "back",
            ShapeKind::Box {
                extents: Vec3::new(0.1, 1.0, 1.0),
            },
        )
        .at(Vec3::new(0.5, 0.0, 0.0)),
    );
    specs
}

fn cube() -> Vec<PrimitiveSpec> {
    vec![PrimitiveSpec::new(
        "cube",
        ShapeKind::Box {
            extents: Vec3::splat(1.0),
        },
    )]
}

/// Instantiates every spec and concatenates the results in order.
pub fn assemble_specs(
    category: Category,
    specs: &[PrimitiveSpec],
) -> Result<Assembly, GeometryError> {
    let mut mesh = Mesh::empty();
    let mut parts = Vec::with_capacity(specs.len());
    for spec in specs {
        let part = instantiate(spec)?;
        parts.push(PartReport {
            name: spec.name.clone(),
            vertices: part.vertex_count(),
            faces: part.face_count(),
        });
        mesh.append(part);
    }
    mesh.validate()?;
    Ok(Assembly {
        category,
        mesh,
        parts,
    })
}

pub fn assemble(category: Category) -> Result<Assembly, GeometryError> {
    assemble_specs(category, &recipe(category))
}

/// Never fails: a broken recipe degrades to the unit cube plus a warning.
pub fn assemble_or_fallback(
    category: Category,
    specs: &[PrimitiveSpec],
    warnings: &mut Vec<Warning>,
) -> (Assembly, bool) {
    match assemble_specs(category, specs) {
        Ok(assembly) => (assembly, false),
        Err(err) => {
            let mesh = fallback::recover(
                Err(Degenerate::Assembly(err)),
                fallback::unit_cube,
                warnings,
            );
            let parts = vec![PartReport {
                name: "cube".to_string(),
                vertices: mesh.vertex_count(),
                faces: mesh.face_count(),
            }];
            (
                Assembly {
                    category,
                    mesh,
                    parts,
                },
                true,
            )
        }
    }
}
