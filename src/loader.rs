//! Scene file readers.
//!
//! Two formats produce the same [`Scene`]:
//!
//! * CSV: one `x, y, z` row per point, no header. Row 0 is the start point,
//!   row 1 the target, and every following row belongs to a curve. Curves are
//!   recovered with the `h == 0` sentinel (see [`crate::segment`]).
//! * JSON: `{"start": [x, y, z], "target": [x, y, z], "curves": [[[x, y, z], ...], ...]}`.

use std::fmt;
use std::fs;
use std::path::Path;

use log::{debug, info};

use crate::error::{PlotError, PlotResult};
use crate::geometry::Point3D;
use crate::scene::{Scene, SceneDocument};
use crate::segment::segment_trajectories;

/// Supported scene file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Csv,
    Json,
}

impl InputFormat {
    /// Pick a format from the file extension. `.json` is JSON, anything else
    /// (including the historical `output.txt`) is CSV.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => InputFormat::Json,
            _ => InputFormat::Csv,
        }
    }

    pub fn loader(self) -> Box<dyn SceneLoader> {
        match self {
            InputFormat::Csv => Box::new(CsvLoader),
            InputFormat::Json => Box::new(JsonLoader),
        }
    }
}

impl fmt::Display for InputFormat {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            InputFormat::Csv => write!(f, "csv"),
            InputFormat::Json => write!(f, "json"),
        }
    }
}

/// Something that can turn a scene file into a [`Scene`]
pub trait SceneLoader {
    /// Parse the full text of a scene file
    fn parse(&self, text: &str) -> PlotResult<Scene>;

    /// Read and parse a file. The file is only open while it is being read.
    fn load(&self, path: &Path) -> PlotResult<Scene> {
        let text = fs::read_to_string(path).map_err(|e| PlotError::io(path, e))?;
        self.parse(&text)
    }
}

/// Flat `x, y, z` rows with positional start/target
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvLoader;

fn parse_row(record: &csv::StringRecord, line: u64) -> PlotResult<Point3D> {
    if record.len() != 3 {
        return Err(PlotError::parse(
            line,
            format!("expected 3 fields, found {}", record.len()),
        ));
    }

    let mut coords = [0.0f64; 3];
    for (i, field) in record.iter().enumerate() {
        coords[i] = field.parse::<f64>().map_err(|_| {
            PlotError::parse(line, format!("field {} is not a number: {:?}", i + 1, field))
        })?;
    }

    Ok(Point3D::new(coords[0], coords[1], coords[2]))
}

impl SceneLoader for CsvLoader {
    fn parse(&self, text: &str) -> PlotResult<Scene> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(text.as_bytes());

        let mut points = Vec::new();
        for result in reader.records() {
            let record = result.map_err(|e| {
                let line = e.position().map(|p| p.line()).unwrap_or(0);
                PlotError::parse(line, e.to_string())
            })?;
            let line = record.position().map(|p| p.line()).unwrap_or(0);
            points.push(parse_row(&record, line)?);
        }

        if points.len() < 2 {
            return Err(PlotError::parse(
                points.len() as u64 + 1,
                "missing start and target rows",
            ));
        }

        let curve_points = points.split_off(2);
        let (start, target) = (points[0], points[1]);

        let curves = segment_trajectories(curve_points);
        debug!("csv scene: {} curves", curves.len());
        Ok(Scene::new(start, target, curves))
    }
}

/// Explicit `start`/`target`/`curves` document
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonLoader;

impl SceneLoader for JsonLoader {
    fn parse(&self, text: &str) -> PlotResult<Scene> {
        let doc: SceneDocument = serde_json::from_str(text)?;
        let scene = Scene::from(doc);
        debug!("json scene: {} curves", scene.curves.len());
        Ok(scene)
    }
}

/// Load a scene, inferring the format from the file extension unless one is given.
pub fn load(path: &Path, format: Option<InputFormat>) -> PlotResult<Scene> {
    let format = format.unwrap_or_else(|| InputFormat::from_path(path));
    info!("Loading {} scene from {}", format, path.display());
    let scene = format.loader().load(path)?;
    info!(
        "Loaded {} curves ({} points)",
        scene.curves.len(),
        scene.point_count()
    );
    Ok(scene)
}
