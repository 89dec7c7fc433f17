use crate::geom::Vec3;
use crate::model::Mesh;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::io::{self, Write};

pub const BINARY_HEADER_LEN: usize = 80;
pub const BINARY_TRIANGLE_LEN: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StlFormat {
    #[default]
    Binary,
    Ascii,
}

pub fn write_binary_stl<W: Write + ?Sized>(mesh: &Mesh, name: &str, out: &mut W) -> io::Result<()> {
    let count = u32::try_from(mesh.faces.len())
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "too many triangles for STL"))?;

    let mut header = [0u8; BINARY_HEADER_LEN];
    let label = format!("meshgen {}", safe_name(name));
    let label = label.as_bytes();
    let n = label.len().min(BINARY_HEADER_LEN);
    header[..n].copy_from_slice(&label[..n]);
    out.write_all(&header)?;
    out.write_all(&count.to_le_bytes())?;

    for &face in &mesh.faces {
        write_vec3_f32(out, mesh.face_normal(face))?;
        for index in face {
            write_vec3_f32(out, mesh.vertices[index as usize])?;
        }
        // Attribute byte count, unused.
        out.write_all(&0u16.to_le_bytes())?;
    }
    Ok(())
}

pub fn binary_stl(mesh: &Mesh, name: &str) -> io::Result<Vec<u8>> {
    let mut buf =
        Vec::with_capacity(BINARY_HEADER_LEN + 4 + mesh.faces.len() * BINARY_TRIANGLE_LEN);
    write_binary_stl(mesh, name, &mut buf)?;
    Ok(buf)
}

pub fn ascii_stl(mesh: &Mesh, name: &str) -> String {
    let name = safe_name(name);
    let mut out = String::new();
    let _ = writeln!(out, "solid {name}");
    for &face in &mesh.faces {
        let n = mesh.face_normal(face);
        let _ = writeln!(out, "  facet normal {} {} {}", f32_stl(n.x), f32_stl(n.y), f32_stl(n.z));
        let _ = writeln!(out, "    outer loop");
        for index in face {
            let v = mesh.vertices[index as usize];
            let _ = writeln!(out, "      vertex {} {} {}", f32_stl(v.x), f32_stl(v.y), f32_stl(v.z));
        }
        let _ = writeln!(out, "    endloop");
        let _ = writeln!(out, "  endfacet");
    }
    let _ = writeln!(out, "endsolid {name}");
    out
}

fn safe_name(name: &str) -> &str {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        "model"
    } else {
        trimmed
    }
}

fn write_vec3_f32<W: Write + ?Sized>(out: &mut W, v: Vec3) -> io::Result<()> {
    out.write_all(&(v.x as f32).to_le_bytes())?;
    out.write_all(&(v.y as f32).to_le_bytes())?;
    out.write_all(&(v.z as f32).to_le_bytes())
}

fn f32_stl(v: f64) -> String {
    let s = format!("{:e}", v as f32);
    if s == "-0e0" {
        "0e0".to_string()
    } else {
        s
    }
}
