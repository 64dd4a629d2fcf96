use serde::{Deserialize, Serialize};

use crate::geometry::{project, Point2D, Point3D};

/// One continuous curve, in flight order
pub type Trajectory = Vec<Point3D>;

/// Everything a plot shows: where the shots start, what they aim at, and the
/// recorded curves.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub start: Point3D,
    pub target: Point3D,
    pub curves: Vec<Trajectory>,
}

impl Scene {
    pub fn new(start: Point3D, target: Point3D, curves: Vec<Trajectory>) -> Self {
        Self {
            start,
            target,
            curves,
        }
    }

    pub fn projected_start(&self) -> Point2D {
        project(&self.start)
    }

    pub fn projected_target(&self) -> Point2D {
        project(&self.target)
    }

    /// Total number of recorded curve points
    pub fn point_count(&self) -> usize {
        self.curves.iter().map(Vec::len).sum()
    }
}

/// On-disk JSON shape. Points are plain 3-element arrays so a wrong arity is
/// rejected by the deserializer.
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct SceneDocument {
    pub start: [f64; 3],
    pub target: [f64; 3],
    pub curves: Vec<Vec<[f64; 3]>>,
}

fn to_point(p: [f64; 3]) -> Point3D {
    Point3D::new(p[0], p[1], p[2])
}

fn to_array(p: &Point3D) -> [f64; 3] {
    [p.x, p.y, p.z]
}

impl From<SceneDocument> for Scene {
    fn from(doc: SceneDocument) -> Self {
        Scene {
            start: to_point(doc.start),
            target: to_point(doc.target),
            curves: doc
                .curves
                .into_iter()
                .map(|curve| curve.into_iter().map(to_point).collect())
                .collect(),
        }
    }
}

impl From<&Scene> for SceneDocument {
    fn from(scene: &Scene) -> Self {
        SceneDocument {
            start: to_array(&scene.start),
            target: to_array(&scene.target),
            curves: scene
                .curves
                .iter()
                .map(|curve| curve.iter().map(to_array).collect())
                .collect(),
        }
    }
}
