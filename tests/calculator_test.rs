//! Integration tests for frame calculation against Serafin streams.
//!
//! These tests verify:
//! - Derived arrays match hand-computed values at every frame
//! - Outputs already in the file are passed through
//! - Single precision output rounding

use std::io::Cursor;

use serafin_rs::{
    EquationResolver, FloatType, FrameCalculator, FrictionLaw, Language, OutputPrecision,
    SerafinHeader, SerafinReader, SerafinWriter, VariableCatalog,
};

const TOL: f64 = 1e-9;
const G: f64 = 9.81;

/// Four-node square with S, B, U, V, W over two frames.
fn write_hydro_file() -> Vec<u8> {
    let catalog = VariableCatalog::new();
    let points = [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)];
    let mut header = SerafinHeader::from_triangulation(
        &points,
        &[[0, 1, 2], [0, 2, 3]],
        Language::En,
        FloatType::Double,
    );
    for id in ["S", "B", "U", "V", "W"] {
        header.add_variable_from_id(&catalog, id).unwrap();
    }

    let mut writer = SerafinWriter::new(Cursor::new(Vec::new()));
    writer.write_header(&header).unwrap();
    for (t, scale) in [(0.0, 1.0), (3600.0, 2.0)] {
        let frame = vec![
            vec![2.0 * scale, 2.0 * scale, 2.0 * scale, 0.0],
            vec![0.0, 0.5, 1.0, 0.0],
            vec![0.3 * scale, 0.0, -0.6, 0.0],
            vec![0.4 * scale, 1.0, 0.8, 0.0],
            vec![40.0, 40.0, 40.0, 40.0],
        ];
        writer.write_entire_frame(&header, t, &frame).unwrap();
    }
    writer.into_inner().unwrap().into_inner()
}

fn open() -> SerafinReader<Cursor<Vec<u8>>> {
    let mut reader = SerafinReader::new(Cursor::new(write_hydro_file()), Language::En).unwrap();
    reader.read_header(&VariableCatalog::new()).unwrap();
    reader
}

#[test]
fn test_froude_over_frames() {
    let mut reader = open();
    let known = reader.header().unwrap().var_ids.clone();
    let plan = EquationResolver::new(true)
        .resolve(&known, &["H", "M", "F"])
        .unwrap();
    assert_eq!(plan.output_ids(), vec!["H", "M", "F"]);
    let calculator = FrameCalculator::new(&plan);

    let out = calculator.compute(&mut reader, 0, &["F", "H", "U"]).unwrap();
    assert_eq!(out.len(), 3);
    // Node 0: H = 2, M = 0.5
    assert!((out[1][0] - 2.0).abs() < TOL);
    assert!((out[0][0] - 0.5 / (G * 2.0).sqrt()).abs() < TOL);
    // Node 3 is dry
    assert_eq!(out[1][3], 0.0);
    assert_eq!(out[0][3], 0.0);
    // Pass-through of a stored variable
    assert!((out[2][2] + 0.6).abs() < TOL);

    let out = calculator.compute(&mut reader, 1, &["H", "M"]).unwrap();
    assert!((out[0][0] - 4.0).abs() < TOL);
    assert!((out[1][0] - 1.0).abs() < TOL);
}

#[test]
fn test_shear_stress_from_file() {
    let mut reader = open();
    let known = reader.header().unwrap().var_ids.clone();
    let plan = EquationResolver::new(true)
        .with_friction_law(FrictionLaw::Strickler)
        .resolve(&known, &["TAU", "DMAX"])
        .unwrap();
    assert_eq!(plan.output_ids(), vec!["H", "M", "US", "TAU", "DMAX"]);

    let out = FrameCalculator::new(&plan)
        .compute(&mut reader, 0, &["TAU", "DMAX"])
        .unwrap();
    // Node 2: H = 1, M = 1, K = 40
    let us = G.sqrt() / 40.0;
    let tau = 1000.0 * us * us;
    assert!((out[0][2] - tau).abs() < TOL);
    assert!((out[1][2] - 1.4593 * tau.powf(0.979)).abs() < TOL);
    assert_eq!(out[0][3], 0.0);
}

#[test]
fn test_single_precision_output() {
    let mut reader = open();
    let known = reader.header().unwrap().var_ids.clone();
    let plan = EquationResolver::new(true).resolve(&known, &["C"]).unwrap();
    let out = FrameCalculator::new(&plan)
        .with_precision(OutputPrecision::Single)
        .compute(&mut reader, 0, &["C"])
        .unwrap();
    let exact = (G * 2.0f64).sqrt();
    assert_eq!(out[0][0], exact as f32 as f64);
}

#[test]
fn test_out_of_range_frame() {
    let mut reader = open();
    let known = reader.header().unwrap().var_ids.clone();
    let plan = EquationResolver::new(true).resolve(&known, &["H"]).unwrap();
    let err = FrameCalculator::new(&plan)
        .compute(&mut reader, 2, &["H"])
        .unwrap_err();
    assert!(err.is_request());
}

#[test]
fn test_stored_rouse_spelling_is_canonical() {
    let catalog = VariableCatalog::new();
    let points = [(0.0, 0.0), (1.0, 0.0), (0.0, 1.0)];
    let mut header =
        SerafinHeader::from_triangulation(&points, &[[0, 1, 2]], Language::En, FloatType::Single);
    header.add_variable_from_id(&catalog, "H").unwrap();
    header.add_variable_raw("ROUSE 0.010", "ROUSE 0.010", "");

    let mut writer = SerafinWriter::new(Cursor::new(Vec::new()));
    writer.write_header(&header).unwrap();
    writer
        .write_entire_frame(&header, 0.0, &[vec![1.0, 2.0, 3.0], vec![0.5, 0.25, 0.125]])
        .unwrap();
    let bytes = writer.into_inner().unwrap().into_inner();

    let mut reader = SerafinReader::new(Cursor::new(bytes), Language::En).unwrap();
    let known = reader.read_header(&catalog).unwrap().var_ids.clone();
    assert_eq!(known, vec!["H", "ROUSE 0.01"]);

    let plan = EquationResolver::new(true)
        .resolve(&known, &["ROUSE 0.010"])
        .unwrap();
    assert!(plan.is_empty());
    let calculator = FrameCalculator::new(&plan);
    let out = calculator.compute(&mut reader, 0, &["ROUSE 0.010"]).unwrap();
    assert_eq!(out[0], vec![0.5, 0.25, 0.125]);
    let out = calculator.compute(&mut reader, 0, &["ROUSE 0.01"]).unwrap();
    assert_eq!(out[0], vec![0.5, 0.25, 0.125]);
}
