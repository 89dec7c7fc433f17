//! Mesh handoff to export collaborators through a scoped temporary file.

use crate::error::ExportError;
use crate::model::Mesh;
use crate::stl::{ascii_stl, write_binary_stl, StlFormat};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;
use tracing::debug;

/// Serializes a mesh into some solid-surface format.
pub trait MeshSink {
    fn write_mesh(&self, mesh: &Mesh, out: &mut dyn Write) -> Result<(), ExportError>;

    fn suffix(&self) -> &str;
}

#[derive(Debug, Clone)]
pub struct StlExporter {
    pub format: StlFormat,
    pub name: String,
}

impl StlExporter {
    pub fn new(format: StlFormat, name: impl Into<String>) -> Self {
        Self {
            format,
            name: name.into(),
        }
    }
}

impl Default for StlExporter {
    fn default() -> Self {
        Self::new(StlFormat::Binary, "model")
    }
}

impl MeshSink for StlExporter {
    fn write_mesh(&self, mesh: &Mesh, out: &mut dyn Write) -> Result<(), ExportError> {
        match self.format {
            StlFormat::Binary => write_binary_stl(mesh, &self.name, out)?,
            StlFormat::Ascii => out.write_all(ascii_stl(mesh, &self.name).as_bytes())?,
        }
        Ok(())
    }

    fn suffix(&self) -> &str {
        ".stl"
    }
}

/// Writes the mesh to a temp file in the system temp dir and returns its bytes.
/// The file is removed when this returns, on success and on error.
pub fn export_via_tempfile(sink: &dyn MeshSink, mesh: &Mesh) -> Result<Vec<u8>, ExportError> {
    export_via_tempfile_in(&std::env::temp_dir(), sink, mesh)
}

pub fn export_via_tempfile_in(
    dir: &Path,
    sink: &dyn MeshSink,
    mesh: &Mesh,
) -> Result<Vec<u8>, ExportError> {
    mesh.validate()?;

    let mut tmp = tempfile::Builder::new()
        .prefix("meshgen-")
        .suffix(sink.suffix())
        .tempfile_in(dir)?;
    debug!(path = ?tmp.path(), faces = mesh.face_count(), "exporting mesh");

    sink.write_mesh(mesh, tmp.as_file_mut())?;
    tmp.as_file_mut().flush()?;

    let file = tmp.as_file_mut();
    file.seek(SeekFrom::Start(0))?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)?;

    tmp.close()?;
    Ok(bytes)
}
