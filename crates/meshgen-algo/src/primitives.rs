use meshgen_core::error::GeometryError;
use meshgen_core::geom::Vec3;
use meshgen_core::model::{Mesh, PrimitiveSpec, Rotation, ShapeKind};
use nalgebra::{Rotation3, Unit, Vector3};
use std::collections::HashMap;

pub const CYLINDER_SECTIONS: usize = 32;
pub const ICOSPHERE_SUBDIVISIONS: usize = 3;

// Corner index bits: x = 1, y = 2, z = 4.
const CUBOID_FACES: [[u32; 3]; 12] = [
    [0, 2, 1],
    [1, 2, 3],
    [4, 5, 6],
    [5, 7, 6],
    [0, 1, 4],
    [1, 5, 4],
    [2, 6, 3],
    [3, 6, 7],
    [0, 4, 2],
    [2, 4, 6],
    [1, 3, 5],
    [3, 7, 5],
];

const ICOSAHEDRON_FACES: [[u32; 3]; 20] = [
    [0, 11, 5],
    [0, 5, 1],
    [0, 1, 7],
    [0, 7, 10],
    [0, 10, 11],
    [1, 5, 9],
    [5, 11, 4],
    [11, 10, 2],
    [10, 7, 6],
    [7, 1, 8],
    [3, 9, 4],
    [3, 4, 2],
    [3, 2, 6],
    [3, 6, 8],
    [3, 8, 9],
    [4, 9, 5],
    [2, 4, 11],
    [6, 2, 10],
    [8, 6, 7],
    [9, 8, 1],
];

/// Axis-aligned box centred at the origin.
pub fn cuboid(extents: Vec3) -> Result<Mesh, GeometryError> {
    let hx = positive("box x extent", extents.x)? * 0.5;
    let hy = positive("box y extent", extents.y)? * 0.5;
    let hz = positive("box z extent", extents.z)? * 0.5;

    let vertices = (0..8u32)
        .map(|i| {
            Vec3::new(
                if i & 1 == 0 { -hx } else { hx },
                if i & 2 == 0 { -hy } else { hy },
                if i & 4 == 0 { -hz } else { hz },
            )
        })
        .collect();

    Ok(Mesh::new(vertices, CUBOID_FACES.to_vec())?)
}

pub fn cylinder(radius: f64, height: f64) -> Result<Mesh, GeometryError> {
    cylinder_with_sections(radius, height, CYLINDER_SECTIONS)
}

/// Capped cylinder along z, centred at the origin.
pub fn cylinder_with_sections(
    radius: f64,
    height: f64,
    sections: usize,
) -> Result<Mesh, GeometryError> {
    let radius = positive("cylinder radius", radius)?;
    let half = positive("cylinder height", height)? * 0.5;
    let n = sections.max(3);

    let mut vertices = Vec::with_capacity(2 * n + 2);
    vertices.push(Vec3::new(0.0, 0.0, -half));
    vertices.push(Vec3::new(0.0, 0.0, half));
    for z in [-half, half] {
        for i in 0..n {
            let a = std::f64::consts::TAU * i as f64 / n as f64;
            vertices.push(Vec3::new(radius * a.cos(), radius * a.sin(), z));
        }
    }

    let bottom = |i: usize| (2 + i % n) as u32;
    let top = |i: usize| (2 + n + i % n) as u32;

    let mut faces = Vec::with_capacity(4 * n);
    for i in 0..n {
        faces.push([0, bottom(i + 1), bottom(i)]);
        faces.push([1, top(i), top(i + 1)]);
        faces.push([bottom(i), bottom(i + 1), top(i + 1)]);
        faces.push([bottom(i), top(i + 1), top(i)]);
    }

    Ok(Mesh::new(vertices, faces)?)
}

pub fn icosphere(radius: f64) -> Result<Mesh, GeometryError> {
    icosphere_with_subdivisions(radius, ICOSPHERE_SUBDIVISIONS)
}

/// Subdivided icosahedron with every vertex on the sphere.
pub fn icosphere_with_subdivisions(
    radius: f64,
    subdivisions: usize,
) -> Result<Mesh, GeometryError> {
    let radius = positive("icosphere radius", radius)?;
    let t = (1.0 + 5.0_f64.sqrt()) / 2.0;

    let mut vertices: Vec<Vec3> = [
        (-1.0, t, 0.0),
        (1.0, t, 0.0),
        (-1.0, -t, 0.0),
        (1.0, -t, 0.0),
        (0.0, -1.0, t),
        (0.0, 1.0, t),
        (0.0, -1.0, -t),
        (0.0, 1.0, -t),
        (t, 0.0, -1.0),
        (t, 0.0, 1.0),
        (-t, 0.0, -1.0),
        (-t, 0.0, 1.0),
    ]
    .into_iter()
    .map(|(x, y, z)| Vec3::new(x, y, z).normalized())
    .collect();
    let mut faces = ICOSAHEDRON_FACES.to_vec();

    for _ in 0..subdivisions {
        let mut midpoints: HashMap<(u32, u32), u32> = HashMap::new();
        let mut next = Vec::with_capacity(faces.len() * 4);
        for [a, b, c] in faces {
            let ab = midpoint(&mut vertices, &mut midpoints, a, b);
            let bc = midpoint(&mut vertices, &mut midpoints, b, c);
            let ca = midpoint(&mut vertices, &mut midpoints, c, a);
            next.push([a, ab, ca]);
            next.push([b, bc, ab]);
            next.push([c, ca, bc]);
            next.push([ab, bc, ca]);
        }
        faces = next;
    }

    let mesh = Mesh::new(vertices, faces)?;
    Ok(mesh.map_vertices(|v| v * radius))
}

fn midpoint(
    vertices: &mut Vec<Vec3>,
    cache: &mut HashMap<(u32, u32), u32>,
    a: u32,
    b: u32,
) -> u32 {
    let key = if a < b { (a, b) } else { (b, a) };
    *cache.entry(key).or_insert_with(|| {
        let mid = (vertices[a as usize] + vertices[b as usize]) * 0.5;
        vertices.push(mid.normalized());
        (vertices.len() - 1) as u32
    })
}

pub fn translate(mesh: Mesh, offset: Vec3) -> Mesh {
    mesh.map_vertices(|v| v + offset)
}

/// Rotates about an axis through the origin.
pub fn rotate(mesh: Mesh, rotation: &Rotation) -> Result<Mesh, GeometryError> {
    let axis = Vector3::new(rotation.axis.x, rotation.axis.y, rotation.axis.z);
    let Some(axis) = Unit::try_new(axis, 1e-12) else {
        return Err(GeometryError::InvalidDimension {
            what: "rotation axis length",
            value: rotation.axis.length(),
        });
    };
    if !rotation.angle_deg.is_finite() {
        return Err(GeometryError::InvalidDimension {
            what: "rotation angle",
            value: rotation.angle_deg,
        });
    }
    let rot = Rotation3::from_axis_angle(&axis, rotation.angle_deg.to_radians());

    Ok(mesh.map_vertices(|v| {
        let r = rot * Vector3::new(v.x, v.y, v.z);
        Vec3::new(r.x, r.y, r.z)
    }))
}

/// Builds the shape, then rotates it, then moves it into place.
pub fn instantiate(spec: &PrimitiveSpec) -> Result<Mesh, GeometryError> {
    let mut mesh = match spec.kind {
        ShapeKind::Box { extents } => cuboid(extents)?,
        ShapeKind::Cylinder { radius, height } => cylinder(radius, height)?,
        ShapeKind::Icosphere { radius } => icosphere(radius)?,
    };
    if let Some(rotation) = &spec.rotation {
        mesh = rotate(mesh, rotation)?;
    }
    let t = spec.translation;
    if let Some(value) = [t.x, t.y, t.z].into_iter().find(|v| !v.is_finite()) {
        return Err(GeometryError::InvalidDimension {
            what: "translation component",
            value,
        });
    }
    Ok(translate(mesh, spec.translation))
}

fn positive(what: &'static str, value: f64) -> Result<f64, GeometryError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(GeometryError::InvalidDimension { what, value })
    }
}
