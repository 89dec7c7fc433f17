use approx::assert_relative_eq;
use meshgen_algo::assembler::{assemble, assemble_or_fallback, assemble_specs, recipe};
use meshgen_algo::classifier::{classify, Classifier};
use meshgen_algo::fallback;
use meshgen_algo::pipeline::{Pipeline, PipelineConfig};
use meshgen_algo::primitives::{cuboid, cylinder};
use meshgen_core::geom::Vec3;
use meshgen_core::model::{Category, PrimitiveSpec, ShapeKind};
use meshgen_core::InputError;

#[test]
fn first_matching_category_wins() {
    assert_eq!(Category::Vehicle, classify("a car with a round mirror"));
    assert_eq!(Category::Seating, classify("A comfy CHAIR"));
    assert_eq!(Category::Sphere, classify("round thing"));
    assert_eq!(Category::Cube, classify("wooden block"));
    assert_eq!(Category::Cylinder, classify("a tall cylinder"));
    assert_eq!(Category::Unknown, classify("xyz"));
    assert_eq!(Category::Unknown, classify(""));
}

#[test]
fn classifier_is_pure() {
    for text in ["a small toy car", "seat", "???", "  ", "ünïcödé ball"] {
        assert_eq!(classify(text), classify(text));
    }
}

#[test]
fn unknown_prompt_is_reported() {
    let (category, warnings) = Classifier::default().classify_with_warnings("xyz");
    assert_eq!(Category::Unknown, category);
    assert_eq!(1, warnings.len());
    assert_eq!("unknown_prompt", warnings[0].code);

    let (_, warnings) = Classifier::default().classify_with_warnings("a box");
    assert!(warnings.is_empty());
}

#[test]
fn vehicle_is_the_sum_of_its_parts() {
    let assembly = assemble(Category::Vehicle).expect("vehicle");
    let body = cuboid(Vec3::new(2.0, 1.0, 0.5)).expect("body");
    let roof = cuboid(Vec3::new(1.5, 0.8, 0.5)).expect("roof");
    let wheel = cylinder(0.2, 0.2).expect("wheel");

    assert_eq!(6, assembly.parts.len());
    assert_eq!(
        body.vertex_count() + roof.vertex_count() + 4 * wheel.vertex_count(),
        assembly.mesh.vertex_count()
    );
    assert_eq!(
        body.face_count() + roof.face_count() + 4 * wheel.face_count(),
        assembly.mesh.face_count()
    );
    assembly.mesh.validate().expect("valid vehicle");
}

#[test]
fn vehicle_wheels_stand_upright_below_the_body() {
    let assembly = assemble(Category::Vehicle).expect("vehicle");
    let bounds = assembly.mesh.bounds().expect("non-empty");
    assert_relative_eq!(-1.0, bounds.min.x, epsilon = 1e-9);
    assert_relative_eq!(1.0, bounds.max.x, epsilon = 1e-9);
    assert_relative_eq!(-0.8, bounds.min.y, epsilon = 1e-9);
    assert_relative_eq!(0.8, bounds.max.y, epsilon = 1e-9);
    assert_relative_eq!(-0.3, bounds.min.z, epsilon = 1e-9);
    assert_relative_eq!(0.75, bounds.max.z, epsilon = 1e-9);

    let wheel = cylinder(0.2, 0.2).expect("wheel");
    let first_wheel = &assembly.mesh.vertices[16..16 + wheel.vertex_count()];
    let (lo, hi) = first_wheel
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v.z), hi.max(v.z)));
    assert_relative_eq!(0.2, hi - lo, epsilon = 1e-9);
}

#[test]
fn seating_has_seat_legs_and_back() {
    let assembly = assemble(Category::Seating).expect("seating");
    let names: Vec<&str> = assembly.parts.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(
        vec!["seat", "leg_0", "leg_1", "leg_2", "leg_3", "back"],
        names
    );
    assembly.mesh.validate().expect("valid seating");
}

#[test]
fn every_recipe_assembles() {
    for category in Category::ALL {
        let assembly = assemble(category).expect("recipe builds");
        assert!(assembly.mesh.face_count() > 0, "{category} is empty");
        assembly.mesh.validate().expect("valid assembly");
    }
}

#[test]
fn assembly_is_deterministic() {
    let a = assemble(Category::Unknown).expect("unknown");
    let b = assemble(Category::Unknown).expect("unknown");
    assert_eq!(a.mesh, b.mesh);
    assert_eq!(assemble(Category::Cube).expect("cube").mesh, a.mesh);
}

#[test]
fn broken_recipe_falls_back_to_unit_cube() {
    let specs = vec![PrimitiveSpec::new(
        "bad",
        ShapeKind::Cylinder {
            radius: -1.0,
            height: 1.0,
        },
    )];
    assert!(assemble_specs(Category::Cylinder, &specs).is_err());

    let mut warnings = Vec::new();
    let (assembly, fallback_used) = assemble_or_fallback(Category::Cylinder, &specs, &mut warnings);
    assert!(fallback_used);
    assert_eq!(fallback::unit_cube(), assembly.mesh);
    assert_eq!("assembly_failed", warnings[0].code);
}

#[test]
fn toy_car_prompt_builds_a_vehicle() {
    let conversion = Pipeline::default()
        .text_to_mesh("a small toy car")
        .expect("convert");
    assert_eq!(Some(Category::Vehicle), conversion.category);
    assert_eq!(6, conversion.parts.len());
    assert!(!conversion.fallback_used);
    assert!(conversion.warnings.is_empty());
    assert_eq!(recipe(Category::Vehicle).len(), conversion.parts.len());
}

#[test]
fn unknown_prompt_yields_the_cube() {
    let conversion = Pipeline::default().text_to_mesh("xyz").expect("convert");
    assert_eq!(Some(Category::Unknown), conversion.category);
    assert_eq!(assemble(Category::Cube).expect("cube").mesh, conversion.mesh);
    assert_eq!("unknown_prompt", conversion.warnings[0].code);
}

#[test]
fn blank_prompt_is_rejected() {
    let pipeline = Pipeline::new(PipelineConfig::default());
    assert!(matches!(
        pipeline.text_to_mesh("   \t"),
        Err(InputError::EmptyPrompt)
    ));
}
