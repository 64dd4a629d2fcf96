//! PNG rendering of a scene.
//!
//! Rendering is split in two: [`layout`] computes everything that ends up on
//! the chart (axis ranges, markers, labelled series) and [`render`] hands
//! that to plotters. Only the second half needs a font stack.

use std::path::{Path, PathBuf};

use log::{debug, info};
use plotters::prelude::*;

use crate::constants::{
    DEFAULT_IMAGE_SIZE, DEFAULT_PLOT_FILE, MIN_DIVISION_THRESHOLD, PLOT_PADDING_FRACTION,
};
use crate::error::{PlotError, PlotResult};
use crate::geometry::{project, Point2D};
use crate::scene::Scene;

const MARGIN: u32 = 20;
const CAPTION_SIZE: u32 = 30;
const X_LABEL_AREA: u32 = 40;
const Y_LABEL_AREA: u32 = 60;
const MARKER_SIZE: i32 = 8;

/// How the two axes are scaled against each other
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AxisScaling {
    /// One data unit spans the same number of pixels on both axes
    #[default]
    Equal,
    /// Vertical axis runs from the lowest point to the largest coordinate on
    /// either axis; horizontal axis fits the data
    Stretched,
}

#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub output: PathBuf,
    pub width: u32,
    pub height: u32,
    pub axis_scaling: AxisScaling,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            output: PathBuf::from(DEFAULT_PLOT_FILE),
            width: DEFAULT_IMAGE_SIZE.0,
            height: DEFAULT_IMAGE_SIZE.1,
            axis_scaling: AxisScaling::default(),
        }
    }
}

/// Axis ranges in data units
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlotBounds {
    pub h_min: f64,
    pub h_max: f64,
    pub v_min: f64,
    pub v_max: f64,
}

impl PlotBounds {
    pub fn h_span(&self) -> f64 {
        self.h_max - self.h_min
    }

    pub fn v_span(&self) -> f64 {
        self.v_max - self.v_min
    }

    pub fn contains(&self, p: Point2D) -> bool {
        p.h >= self.h_min && p.h <= self.h_max && p.v >= self.v_min && p.v <= self.v_max
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CurveSeries {
    pub label: String,
    pub points: Vec<(f64, f64)>,
}

/// Everything drawn on the chart, in data coordinates
#[derive(Debug, Clone, PartialEq)]
pub struct PlotLayout {
    pub start: Point2D,
    pub target: Point2D,
    pub curves: Vec<CurveSeries>,
    pub bounds: PlotBounds,
}

fn is_finite(p: &Point2D) -> bool {
    p.h.is_finite() && p.v.is_finite()
}

/// Min/max over the finite points, or `None` if there are none
fn extents<'a>(points: impl IntoIterator<Item = &'a Point2D>) -> Option<PlotBounds> {
    points
        .into_iter()
        .filter(|p| is_finite(p))
        .fold(None, |acc: Option<PlotBounds>, p| {
            Some(match acc {
                None => PlotBounds {
                    h_min: p.h,
                    h_max: p.h,
                    v_min: p.v,
                    v_max: p.v,
                },
                Some(b) => PlotBounds {
                    h_min: b.h_min.min(p.h),
                    h_max: b.h_max.max(p.h),
                    v_min: b.v_min.min(p.v),
                    v_max: b.v_max.max(p.v),
                },
            })
        })
}

/// Give a zero-width range a unit span around its value
fn widen_degenerate(lo: f64, hi: f64) -> (f64, f64) {
    if hi - lo < MIN_DIVISION_THRESHOLD {
        (lo - 0.5, hi + 0.5)
    } else {
        (lo, hi)
    }
}

fn pad(lo: f64, hi: f64) -> (f64, f64) {
    let margin = (hi - lo) * PLOT_PADDING_FRACTION;
    (lo - margin, hi + margin)
}

/// Pixel size of the plotting area inside the chart decorations
fn plotting_area(width: u32, height: u32) -> (f64, f64) {
    let w = width.saturating_sub(Y_LABEL_AREA + 2 * MARGIN).max(1);
    let h = height
        .saturating_sub(X_LABEL_AREA + CAPTION_SIZE + 2 * MARGIN)
        .max(1);
    (w as f64, h as f64)
}

fn equal_aspect(data: PlotBounds, width: u32, height: u32) -> PlotBounds {
    let (h_min, h_max) = widen_degenerate(data.h_min, data.h_max);
    let (v_min, v_max) = widen_degenerate(data.v_min, data.v_max);
    let (h_min, h_max) = pad(h_min, h_max);
    let (v_min, v_max) = pad(v_min, v_max);

    let (area_w, area_h) = plotting_area(width, height);
    let units_per_px = ((h_max - h_min) / area_w).max((v_max - v_min) / area_h);

    let h_half = units_per_px * area_w / 2.0;
    let v_half = units_per_px * area_h / 2.0;
    let h_mid = (h_min + h_max) / 2.0;
    let v_mid = (v_min + v_max) / 2.0;

    PlotBounds {
        h_min: h_mid - h_half,
        h_max: h_mid + h_half,
        v_min: v_mid - v_half,
        v_max: v_mid + v_half,
    }
}

fn stretched(data: PlotBounds) -> PlotBounds {
    let (h_min, h_max) = pad(data.h_min, data.h_max);
    let (h_min, h_max) = widen_degenerate(h_min, h_max);
    let top = data.h_max.max(data.v_max);
    let (v_min, v_max) = widen_degenerate(data.v_min, top);
    PlotBounds {
        h_min,
        h_max,
        v_min,
        v_max,
    }
}

/// Work out what the chart for `scene` shows, without drawing anything.
pub fn layout(scene: &Scene, options: &RenderOptions) -> PlotLayout {
    let start = scene.projected_start();
    let target = scene.projected_target();

    let curves: Vec<CurveSeries> = scene
        .curves
        .iter()
        .enumerate()
        .map(|(i, curve)| CurveSeries {
            label: format!("Curve {}", i + 1),
            points: curve
                .iter()
                .map(project)
                .filter(is_finite)
                .map(Into::into)
                .collect(),
        })
        .collect();

    let curve_points: Vec<Point2D> = curves
        .iter()
        .flat_map(|c| c.points.iter().map(|&(h, v)| Point2D::new(h, v)))
        .collect();
    let data = extents([start, target].iter().chain(curve_points.iter())).unwrap_or(PlotBounds {
        h_min: 0.0,
        h_max: 0.0,
        v_min: 0.0,
        v_max: 0.0,
    });

    let bounds = match options.axis_scaling {
        AxisScaling::Equal => equal_aspect(data, options.width, options.height),
        AxisScaling::Stretched => stretched(data),
    };
    debug!("plot bounds: {:?}", bounds);

    PlotLayout {
        start,
        target,
        curves,
        bounds,
    }
}

/// Draw `scene` into a PNG at `options.output`, replacing any existing file.
/// On failure the existing file is left untouched.
pub fn render(scene: &Scene, options: &RenderOptions) -> PlotResult<()> {
    let plot = layout(scene, options);
    write_replacing(&options.output, |path| draw(&plot, path, options))?;
    info!(
        "Wrote {} curves to {}",
        plot.curves.len(),
        options.output.display()
    );
    Ok(())
}

/// Whether the chart font can be rasterized on this machine
pub fn fonts_available() -> bool {
    let mut buffer = vec![0u8; 3 * 16 * 16];
    let root = BitMapBackend::with_buffer(&mut buffer, (16, 16)).into_drawing_area();
    let loaded = root.titled("x", ("sans-serif", 10)).is_ok();
    loaded
}

/// Run `write` against a staging file next to `output` and move it into place
/// only if `write` succeeds. The staging file is removed on failure.
///
/// `BitMapBackend` saves its canvas when dropped, so drawing straight to
/// `output` would leave a partial image behind after an error.
fn write_replacing<F>(output: &Path, write: F) -> PlotResult<()>
where
    F: FnOnce(&Path) -> PlotResult<()>,
{
    let dir = match output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let suffix = output
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default();
    let staging = tempfile::Builder::new()
        .prefix(".trajectory-plot-")
        .suffix(&suffix)
        .tempfile_in(dir)
        .map_err(|e| PlotError::io(dir, e))?;

    write(staging.path())?;

    staging
        .persist(output)
        .map_err(|e| PlotError::io(output, e.error))?;
    Ok(())
}

fn draw(plot: &PlotLayout, path: &Path, options: &RenderOptions) -> PlotResult<()> {
    let root = BitMapBackend::new(path, (options.width, options.height)).into_drawing_area();
    root.fill(&WHITE)?;

    let b = plot.bounds;
    let mut chart = ChartBuilder::on(&root)
        .caption("Ballistic curve", ("sans-serif", CAPTION_SIZE))
        .margin(MARGIN)
        .x_label_area_size(X_LABEL_AREA)
        .y_label_area_size(Y_LABEL_AREA)
        .build_cartesian_2d(b.h_min..b.h_max, b.v_min..b.v_max)?;

    chart
        .configure_mesh()
        .x_desc("Horizontal position")
        .y_desc("Vertical position")
        .draw()?;

    for (i, series) in plot.curves.iter().enumerate() {
        let color = Palette99::pick(i).to_rgba();
        chart
            .draw_series(LineSeries::new(
                series.points.iter().copied(),
                color.stroke_width(2),
            ))?
            .label(series.label.as_str())
            .legend(move |(x, y)| {
                PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2))
            });
    }

    for (point, color, label) in [(plot.start, GREEN, "Start"), (plot.target, RED, "Target")] {
        if !is_finite(&point) {
            continue;
        }
        chart
            .draw_series(std::iter::once(Cross::new(
                (point.h, point.v),
                MARKER_SIZE,
                color.stroke_width(2),
            )))?
            .label(label)
            .legend(move |(x, y)| Cross::new((x + 10, y), MARKER_SIZE / 2, color.stroke_width(2)));
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    root.present()?;
    Ok(())
}
