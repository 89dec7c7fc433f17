use meshgen_core::export::{export_via_tempfile_in, StlExporter};
use meshgen_core::geom::Vec3;
use meshgen_core::model::Mesh;
use meshgen_core::stl::{ascii_stl, binary_stl, write_binary_stl, StlFormat};
use meshgen_core::ExportError;

fn tetrahedron() -> Mesh {
    Mesh::new(
        vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::new(0.0, 0.0, 1.0),
        ],
        vec![[0, 2, 1], [0, 1, 3], [0, 3, 2], [1, 2, 3]],
    )
    .expect("valid tetrahedron")
}

#[test]
fn binary_stl_has_header_count_and_triangles() {
    let mesh = tetrahedron();
    let bytes = binary_stl(&mesh, "tetra").expect("in-memory write");
    assert_eq!(84 + 50 * 4, bytes.len());
    assert!(bytes.starts_with(b"meshgen tetra"));
    assert_eq!(4, u32::from_le_bytes([bytes[80], bytes[81], bytes[82], bytes[83]]));

    // First facet normal of [0, 2, 1] points down.
    let nz = f32::from_le_bytes([bytes[92], bytes[93], bytes[94], bytes[95]]);
    assert_eq!(-1.0, nz);
}

#[test]
fn binary_stl_write_errors_reach_the_caller() {
    let mut storage = [0u8; 100];
    let mut sink: &mut [u8] = &mut storage;
    let err = write_binary_stl(&tetrahedron(), "tetra", &mut sink).expect_err("buffer too small");
    assert_eq!(std::io::ErrorKind::WriteZero, err.kind());
}

#[test]
fn empty_mesh_is_header_and_zero_count() {
    let bytes = binary_stl(&Mesh::empty(), "empty").expect("in-memory write");
    assert_eq!(84, bytes.len());
    assert_eq!(&[0u8, 0, 0, 0][..], &bytes[80..84]);
}

#[test]
fn ascii_stl_lists_every_facet() {
    let text = ascii_stl(&tetrahedron(), "");
    assert!(text.starts_with("solid model\n"));
    assert!(text.trim_end().ends_with("endsolid model"));
    assert_eq!(4, text.matches("facet normal").count());
    assert_eq!(12, text.matches("vertex ").count());
}

#[test]
fn tempfile_export_returns_bytes_and_cleans_up() {
    let dir = tempfile::tempdir().expect("temp dir");
    let exporter = StlExporter::new(StlFormat::Binary, "tetra");
    let mesh = tetrahedron();

    let bytes = export_via_tempfile_in(dir.path(), &exporter, &mesh).expect("export");
    assert_eq!(binary_stl(&mesh, "tetra").expect("in-memory write"), bytes);

    let leftovers = std::fs::read_dir(dir.path()).expect("read dir").count();
    assert_eq!(0, leftovers);
}

#[test]
fn tempfile_export_rejects_invalid_mesh_without_leaking() {
    let dir = tempfile::tempdir().expect("temp dir");
    let broken = Mesh {
        vertices: vec![Vec3::ZERO],
        faces: vec![[0, 1, 2]],
    };

    let err = export_via_tempfile_in(dir.path(), &StlExporter::default(), &broken)
        .expect_err("invalid mesh");
    assert!(matches!(err, ExportError::InvalidMesh(_)));

    let leftovers = std::fs::read_dir(dir.path()).expect("read dir").count();
    assert_eq!(0, leftovers);
}
