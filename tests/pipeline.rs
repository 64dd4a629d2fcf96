use std::fs;

use approx::assert_relative_eq;
use trajectory_plot::writer;
use trajectory_plot::{
    fonts_available, layout, load, plot_file, project, run_simulation, InputFormat, PlotError,
    RenderOptions, SimulationConfig,
};

const REFERENCE_JSON: &str =
    r#"{"start":[1,2,3],"target":[4,5,6],"curves":[[[0,0,0],[1,1,1]]]}"#;

#[test]
fn test_reference_json_projection() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("scene.json");
    fs::write(&path, REFERENCE_JSON).unwrap();

    let scene = load(&path, None).unwrap();
    let start = project(&scene.start);
    let target = project(&scene.target);
    assert_relative_eq!(start.h, 10f64.sqrt());
    assert_eq!(start.v, 2.0);
    assert_relative_eq!(target.h, 52f64.sqrt());
    assert_eq!(target.v, 5.0);

    let plot = layout(&scene, &RenderOptions::default());
    assert_eq!(plot.curves.len(), 1);
    assert_eq!(plot.curves[0].label, "Curve 1");
    assert_relative_eq!(plot.curves[0].points[1].0, 2f64.sqrt());
}

#[test]
fn test_missing_key_writes_no_image() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("scene.json");
    fs::write(&input, r#"{"start":[1,2,3],"curves":[]}"#).unwrap();
    let options = RenderOptions {
        output: dir.path().join("plot.png"),
        ..Default::default()
    };

    let err = plot_file(&input, None, &options).unwrap_err();
    assert!(matches!(err, PlotError::Schema(_)));
    assert!(!options.output.exists());
}

#[test]
fn test_non_numeric_csv_writes_no_image() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("output.txt");
    fs::write(&input, "0, 0, 0\n40, 0, 45\n1.0, 2.0, x\n").unwrap();
    let options = RenderOptions {
        output: dir.path().join("plot.png"),
        ..Default::default()
    };

    let err = plot_file(&input, None, &options).unwrap_err();
    assert!(matches!(err, PlotError::Parse { line: 3, .. }));
    assert!(!options.output.exists());
}

#[test]
fn test_simulated_scene_survives_both_formats() {
    let result = run_simulation(&SimulationConfig {
        shots: 2,
        ..Default::default()
    })
    .unwrap();
    let dir = tempfile::tempdir().unwrap();

    for (name, format) in [("output.txt", InputFormat::Csv), ("scene.json", InputFormat::Json)] {
        let path = dir.path().join(name);
        writer::save(&result.scene, &path, format).unwrap();
        let loaded = load(&path, None).unwrap();
        assert_eq!(loaded, result.scene, "{} round trip", format);
    }
}

#[test]
fn test_off_origin_start_breaks_csv_curves_only() {
    // Shots launched away from the origin never hit the h == 0 sentinel,
    // so the CSV form collapses them into one curve
    let result = run_simulation(&SimulationConfig {
        start: trajectory_plot::Point3D::new(1.0, 0.0, 1.0),
        shots: 2,
        ..Default::default()
    })
    .unwrap();
    assert_eq!(writer::sentinel_conflicts(&result.scene), 2);

    let dir = tempfile::tempdir().unwrap();
    let csv_path = dir.path().join("output.txt");
    writer::save(&result.scene, &csv_path, InputFormat::Csv).unwrap();
    assert_eq!(load(&csv_path, None).unwrap().curves.len(), 1);

    let json_path = dir.path().join("scene.json");
    writer::save(&result.scene, &json_path, InputFormat::Json).unwrap();
    assert_eq!(load(&json_path, None).unwrap().curves.len(), 2);
}

#[test]
fn test_plot_file_overwrites_image() {
    if !fonts_available() {
        eprintln!("skipping: no system font for chart text");
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("scene.json");
    fs::write(&input, REFERENCE_JSON).unwrap();
    let options = RenderOptions {
        output: dir.path().join("plot.png"),
        ..Default::default()
    };
    fs::write(&options.output, b"stale").unwrap();

    plot_file(&input, None, &options).unwrap();
    let bytes = fs::read(&options.output).unwrap();
    assert_eq!(&bytes[1..4], b"PNG");
}
