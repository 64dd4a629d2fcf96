//! # Trajectory Plot
//!
//! Reads recorded projectile trajectories (CSV or JSON scene files) and renders
//! them as 2D ballistic curves, horizontal distance against height. Also
//! generates such scene files from a drag-and-gravity shot simulation.

use std::path::Path;

// Re-export the main types and functions
pub use error::{PlotError, PlotResult};
pub use geometry::{project, project_all, Point2D, Point3D};
pub use loader::{load, CsvLoader, InputFormat, JsonLoader, SceneLoader};
pub use render::{
    fonts_available, layout, render, AxisScaling, PlotLayout, RenderOptions,
};
pub use scene::{Scene, Trajectory};
pub use segment::{segment, segment_trajectories};
pub use simulation::{run_simulation, AimMode, SimulationConfig, SimulationResult};

// Module declarations
pub mod constants;
mod error;
pub mod geometry;
pub mod loader;
pub mod render;
mod scene;
pub mod segment;
pub mod simulation;
pub mod writer;

/// Load a scene file and render it. Nothing is written if loading fails.
pub fn plot_file(
    input: &Path,
    format: Option<InputFormat>,
    options: &RenderOptions,
) -> PlotResult<Scene> {
    let scene = load(input, format)?;
    render(&scene, options)?;
    Ok(scene)
}
