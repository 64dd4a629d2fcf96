use nalgebra::Vector3;

/// Position in 3D space: x and z span the ground plane, y is height
pub type Point3D = Vector3<f64>;

/// Projected coordinate: `h` is horizontal distance from the origin, `v` is height
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point2D {
    pub h: f64,
    pub v: f64,
}

impl Point2D {
    pub fn new(h: f64, v: f64) -> Self {
        Self { h, v }
    }
}

impl From<Point2D> for (f64, f64) {
    fn from(p: Point2D) -> Self {
        (p.h, p.v)
    }
}

/// Collapse a 3D position onto the vertical plane through the origin.
///
/// The x/z components combine into a horizontal distance, y passes through.
pub fn project(p: &Point3D) -> Point2D {
    Point2D {
        h: (p.x * p.x + p.z * p.z).sqrt(),
        v: p.y,
    }
}

pub fn project_all(points: &[Point3D]) -> Vec<Point2D> {
    points.iter().map(project).collect()
}

/// Horizontal (x/z plane) distance between two positions
pub fn horizontal_distance(a: &Point3D, b: &Point3D) -> f64 {
    let dx = b.x - a.x;
    let dz = b.z - a.z;
    (dx * dx + dz * dz).sqrt()
}

/// Straight-line distance between two positions
pub fn distance(a: &Point3D, b: &Point3D) -> f64 {
    (b - a).norm()
}
