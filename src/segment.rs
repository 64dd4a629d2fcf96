//! Splitting flat point streams into curves.
//!
//! CSV scene files carry no curve markers. Every recorded shot begins at the
//! launch point, which sits at the origin of the ground plane, so a point
//! whose projected horizontal distance is exactly zero marks the start of a
//! new curve. A genuine sample directly above or below the origin is
//! indistinguishable from that marker and will split a curve in two; JSON
//! scenes list their curves explicitly and do not go through here.

use crate::geometry::{project, Point2D, Point3D};
use crate::scene::Trajectory;

/// Split `items` into runs, starting a new run at every item for which
/// `is_boundary` holds. The boundary item opens the new run. Empty runs are
/// never produced.
fn split_at<T, F>(items: impl IntoIterator<Item = T>, is_boundary: F) -> Vec<Vec<T>>
where
    F: Fn(&T) -> bool,
{
    let mut runs = Vec::new();
    let mut current: Vec<T> = Vec::new();

    for item in items {
        if is_boundary(&item) && !current.is_empty() {
            runs.push(std::mem::take(&mut current));
        }
        current.push(item);
    }

    if !current.is_empty() {
        runs.push(current);
    }

    runs
}

/// True when a projected point lies on the curve-start sentinel
pub fn is_curve_start(p: &Point2D) -> bool {
    p.h == 0.0
}

/// Split projected points into curves at every `h == 0` sentinel.
pub fn segment(points: &[Point2D]) -> Vec<Vec<Point2D>> {
    split_at(points.iter().copied(), is_curve_start)
}

/// Same split as [`segment`], keeping the original 3D positions.
pub fn segment_trajectories(points: Vec<Point3D>) -> Vec<Trajectory> {
    split_at(points, |p| is_curve_start(&project(p)))
}
