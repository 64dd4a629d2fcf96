//! Scene file output, the inverse of [`crate::loader`].

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use log::{info, warn};

use crate::error::{PlotError, PlotResult};
use crate::geometry::project;
use crate::loader::InputFormat;
use crate::scene::{Scene, SceneDocument};
use crate::segment::is_curve_start;

/// Number of places where `scene` breaks the CSV curve-start convention:
/// curves that are empty or do not begin at `h == 0`, and interior points that
/// sit at `h == 0`. Zero means the CSV file reads back into the same curves.
pub fn sentinel_conflicts(scene: &Scene) -> usize {
    scene
        .curves
        .iter()
        .map(|curve| match curve.split_first() {
            None => 1,
            Some((first, rest)) => {
                let bad_start = usize::from(!is_curve_start(&project(first)));
                let bad_interior = rest
                    .iter()
                    .filter(|p| is_curve_start(&project(p)))
                    .count();
                bad_start + bad_interior
            }
        })
        .sum()
}

/// Write `scene` as headerless `x,y,z` rows: start, target, then every curve point.
pub fn write_csv<W: Write>(scene: &Scene, out: W) -> Result<(), csv::Error> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(out);

    let rows = [&scene.start, &scene.target]
        .into_iter()
        .chain(scene.curves.iter().flatten());
    for p in rows {
        writer.write_record(&[p.x.to_string(), p.y.to_string(), p.z.to_string()])?;
    }
    writer.flush()?;
    Ok(())
}

/// Write `scene` as a pretty-printed JSON document.
pub fn write_json<W: Write>(scene: &Scene, out: W) -> serde_json::Result<()> {
    serde_json::to_writer_pretty(out, &SceneDocument::from(scene))
}

fn csv_error(path: &Path, err: csv::Error) -> PlotError {
    let message = err.to_string();
    match err.into_kind() {
        csv::ErrorKind::Io(e) => PlotError::io(path, e),
        _ => PlotError::io(path, io::Error::other(message)),
    }
}

fn json_error(path: &Path, err: serde_json::Error) -> PlotError {
    if err.is_io() {
        PlotError::io(path, err.into())
    } else {
        PlotError::Schema(err.to_string())
    }
}

/// Save `scene` to `path`, replacing any existing file.
pub fn save(scene: &Scene, path: &Path, format: InputFormat) -> PlotResult<()> {
    if format == InputFormat::Csv {
        let conflicts = sentinel_conflicts(scene);
        if conflicts > 0 {
            warn!(
                "{} point(s) break the h == 0 curve-start convention; {} will not read back \
                 into the same curves (use JSON to keep them)",
                conflicts,
                path.display()
            );
        }
    }

    let file = File::create(path).map_err(|e| PlotError::io(path, e))?;
    let mut out = BufWriter::new(file);
    match format {
        InputFormat::Csv => write_csv(scene, &mut out).map_err(|e| csv_error(path, e))?,
        InputFormat::Json => {
            write_json(scene, &mut out).map_err(|e| json_error(path, e))?;
            out.write_all(b"\n").map_err(|e| PlotError::io(path, e))?;
        }
    }
    out.flush().map_err(|e| PlotError::io(path, e))?;

    info!(
        "Saved {} scene with {} curves to {}",
        format,
        scene.curves.len(),
        path.display()
    );
    Ok(())
}
