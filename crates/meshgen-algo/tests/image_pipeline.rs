use approx::assert_relative_eq;
use image::{GrayImage, Luma, Rgb, RgbImage};
use meshgen_algo::background::{FilterError, FnFilter, PassThrough};
use meshgen_algo::extrude::ContourToSolid;
use meshgen_algo::fallback;
use meshgen_algo::pipeline::{load_image, Pipeline};
use meshgen_algo::silhouette::{SilhouetteExtractor, SilhouetteMap};
use meshgen_core::report::InputKind;
use meshgen_core::InputError;

fn white_square_on_black(size: u32, lo: u32, hi: u32) -> RgbImage {
    RgbImage::from_fn(size, size, |x, y| {
        if (lo..hi).contains(&x) && (lo..hi).contains(&y) {
            Rgb([255, 255, 255])
        } else {
            Rgb([0, 0, 0])
        }
    })
}

/// Filled squares given as (left, top, side).
fn blob_map(size: u32, squares: &[(u32, u32, u32)]) -> SilhouetteMap {
    let img = GrayImage::from_fn(size, size, |x, y| {
        let inside = squares
            .iter()
            .any(|&(l, t, s)| (l..l + s).contains(&x) && (t..t + s).contains(&y));
        Luma([if inside { 255 } else { 0 }])
    });
    SilhouetteMap::from_image(img)
}

#[test]
fn square_is_extruded_to_a_prism() {
    let img = white_square_on_black(100, 30, 70);
    let conversion = Pipeline::default()
        .image_to_mesh_with(&img, &PassThrough)
        .expect("convert");

    assert!(!conversion.fallback_used, "{:?}", conversion.warnings);
    assert_eq!(1, conversion.contours_used);
    assert!(conversion.mesh.face_count() >= 1);
    conversion.mesh.validate().expect("valid mesh");

    let ext = conversion.mesh.extents();
    assert_relative_eq!(2.0, ext.x.max(ext.y), epsilon = 1e-9);
    assert_relative_eq!(ext.x, ext.y, epsilon = 0.15);
    assert_relative_eq!(1.0, ext.z, epsilon = 1e-9);

    let edges = conversion.edges.expect("image input keeps its edge map");
    assert_eq!((100, 100), (edges.width(), edges.height()));
    assert!(!edges.is_empty());
}

#[test]
fn all_black_image_yields_the_fallback_box() {
    let img = RgbImage::new(64, 48);
    let conversion = Pipeline::default()
        .image_to_mesh_with(&img, &PassThrough)
        .expect("convert");

    assert!(conversion.fallback_used);
    assert_eq!(fallback::flat_box(), conversion.mesh);
    assert_eq!("no_edges", conversion.warnings[0].code);

    let ext = conversion.mesh.extents();
    assert_relative_eq!(2.0, ext.x);
    assert_relative_eq!(2.0, ext.y);
    assert_relative_eq!(1.0, ext.z);
}

#[test]
fn empty_map_falls_back() {
    let outcome = ContourToSolid::default().build_or_fallback(&SilhouetteMap::blank(32, 32));
    assert!(outcome.fallback_used);
    assert_eq!(0, outcome.contours_used);
    assert_eq!(fallback::flat_box(), outcome.mesh);
}

#[test]
fn single_pixel_map_falls_back() {
    let mut img = GrayImage::new(16, 16);
    img.put_pixel(8, 8, Luma([255]));
    let outcome = ContourToSolid::default().build_or_fallback(&SilhouetteMap::from_image(img));
    assert!(outcome.fallback_used);
    assert_eq!(fallback::flat_box(), outcome.mesh);
    assert_eq!("contour_geometry_failed", outcome.warnings[0].code);
}

#[test]
fn specks_next_to_the_main_outline_are_ignored() {
    let map = blob_map(80, &[(10, 10, 40), (60, 60, 3)]);
    let extrusion = ContourToSolid::default().build(&map).expect("extrude");
    assert_eq!(1, extrusion.contours_used);
    assert!(extrusion.warnings.is_empty());

    let ext = extrusion.mesh.extents();
    assert_relative_eq!(2.0, ext.x, epsilon = 1e-9);
    assert_relative_eq!(2.0, ext.y, epsilon = 1e-9);
}

#[test]
fn at_most_eight_contours_are_extruded() {
    let squares: Vec<(u32, u32, u32)> = (0..9)
        .map(|i| (5 + 20 * (i % 3), 5 + 20 * (i / 3), 10))
        .collect();
    let map = blob_map(70, &squares);
    let extrusion = ContourToSolid::default().build(&map).expect("extrude");
    assert_eq!(8, extrusion.contours_used);
    assert_eq!(8 * 8, extrusion.mesh.vertex_count());
    extrusion.mesh.validate().expect("valid mesh");
}

#[test]
fn failing_filter_uses_the_original_image() {
    let img = white_square_on_black(80, 20, 60);
    let broken = FnFilter(|_: &RgbImage| -> Result<RgbImage, FilterError> {
        Err(FilterError::Failed("model unavailable".to_string()))
    });
    let conversion = Pipeline::default()
        .image_to_mesh_with(&img, &broken)
        .expect("convert");

    assert_eq!("background_filter_failed", conversion.warnings[0].code);
    assert!(!conversion.fallback_used);
}

#[test]
fn filter_returning_wrong_size_is_a_failure() {
    let img = white_square_on_black(40, 10, 30);
    let shrinking =
        FnFilter(|_: &RgbImage| -> Result<RgbImage, FilterError> { Ok(RgbImage::new(4, 4)) });
    let extraction = SilhouetteExtractor::default()
        .extract(&img, &shrinking)
        .expect("extract");
    assert!(!extraction.background_removed);
    assert_eq!((40, 40), (extraction.map.width(), extraction.map.height()));
}

#[test]
fn zero_size_image_is_rejected() {
    let err = Pipeline::default()
        .image_to_mesh_with(&RgbImage::new(0, 0), &PassThrough)
        .expect_err("empty image");
    assert!(matches!(err, InputError::EmptyImage { width: 0, height: 0 }));
}

#[test]
fn large_images_are_downscaled() {
    let img = white_square_on_black(1500, 500, 1000);
    let extraction = SilhouetteExtractor::default()
        .extract(&img, &PassThrough)
        .expect("extract");
    assert_eq!((1024, 1024), (extraction.map.width(), extraction.map.height()));
}

#[test]
fn unreadable_file_is_an_input_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("not-an-image.png");
    std::fs::write(&path, b"definitely not a png").expect("write");
    assert!(matches!(load_image(&path), Err(InputError::Unreadable { .. })));
}

#[test]
fn report_summarizes_the_conversion() {
    let img = white_square_on_black(60, 15, 45);
    let conversion = Pipeline::default()
        .image_to_mesh_with(&img, &PassThrough)
        .expect("convert");
    let report = conversion.report(InputKind::Image, "square.png");

    assert_eq!(InputKind::Image, report.input_kind);
    assert_eq!(None, report.category);
    assert_eq!(conversion.mesh.face_count(), report.mesh.faces);
    assert!(report.mesh.bounds.is_some());
}
