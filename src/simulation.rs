/// Point-mass projectile simulation with quadratic drag and iterative aim correction
use log::{debug, info};
use nalgebra::Vector3;

use crate::constants::{
    AIR_DENSITY, DEFAULT_MASS_KG, DEFAULT_SHOTS, DEFAULT_TIME_STEP_S, DEFAULT_VELOCITY_MPS,
    GRAVITY_MPS2, MAX_ITERATIONS, MAX_SHOTS, MIN_DIVISION_THRESHOLD, MIN_VELOCITY_THRESHOLD,
    PROJECTILE_AREA_M2, RADIANS_TO_DEGREES, SPHERE_DRAG_COEFFICIENT,
};
use crate::error::{PlotError, PlotResult};
use crate::geometry::{distance, horizontal_distance, Point3D};
use crate::scene::{Scene, Trajectory};

/// How the launch velocity is chosen from the aim point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AimMode {
    /// Point the barrel straight at the aim point
    #[default]
    Straight,
    /// Use the drag-free ballistic solution through the aim point
    Gravity,
}

#[derive(Debug, Clone)]
pub struct SimulationConfig {
    pub start: Point3D,
    pub target: Point3D,
    pub velocity: f64,  // m/s
    pub mass: f64,      // kg
    pub time_step: f64, // seconds
    pub shots: usize,
    pub aim_mode: AimMode,
    pub max_iterations: usize,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            start: Point3D::new(0.0, 0.0, 0.0),
            target: Point3D::new(40.0, 0.0, 45.0),
            velocity: DEFAULT_VELOCITY_MPS,
            mass: DEFAULT_MASS_KG,
            time_step: DEFAULT_TIME_STEP_S,
            shots: DEFAULT_SHOTS,
            aim_mode: AimMode::default(),
            max_iterations: MAX_ITERATIONS,
        }
    }
}

fn require_positive(name: &str, value: f64) -> PlotResult<()> {
    if value.is_nan() || value <= 0.0 {
        return Err(PlotError::Simulation(format!(
            "{} must be positive, got {}",
            name, value
        )));
    }
    Ok(())
}

impl SimulationConfig {
    fn validate(&self) -> PlotResult<()> {
        require_positive("launch velocity", self.velocity)?;
        require_positive("mass", self.mass)?;
        require_positive("time step", self.time_step)?;
        if self.shots > MAX_SHOTS {
            return Err(PlotError::Simulation(format!(
                "at most {} shots per run, got {}",
                MAX_SHOTS, self.shots
            )));
        }
        Ok(())
    }
}

/// Kinematic state of a projectile in flight
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectileState {
    pub position: Point3D,
    pub velocity: Vector3<f64>,
    pub acceleration: Vector3<f64>,
}

impl ProjectileState {
    /// State at launch. Drag only kicks in after the first step.
    pub fn launch(position: Point3D, velocity: Vector3<f64>) -> Self {
        Self {
            position,
            velocity,
            acceleration: Vector3::new(0.0, -GRAVITY_MPS2, 0.0),
        }
    }

    /// Advance one step: velocity from the current acceleration, position
    /// from the new velocity, then acceleration for the next step.
    pub fn step(&mut self, dt: f64, mass: f64) {
        self.velocity += self.acceleration * dt;
        self.position += self.velocity * dt;
        self.acceleration = acceleration(&self.velocity, mass);
    }
}

/// Drag deceleration opposing `velocity`
pub fn drag_acceleration(velocity: &Vector3<f64>, mass: f64) -> Vector3<f64> {
    let speed = velocity.norm();
    if speed < MIN_VELOCITY_THRESHOLD {
        return Vector3::zeros();
    }
    let drag = speed * speed * AIR_DENSITY * PROJECTILE_AREA_M2 * SPHERE_DRAG_COEFFICIENT
        / (2.0 * mass);
    velocity * (-drag / speed)
}

/// Total acceleration: drag plus gravity
pub fn acceleration(velocity: &Vector3<f64>, mass: f64) -> Vector3<f64> {
    drag_acceleration(velocity, mass) + Vector3::new(0.0, -GRAVITY_MPS2, 0.0)
}

/// Launch velocity of magnitude `speed` pointing straight at `aim`
pub fn aim_straight(start: &Point3D, aim: &Point3D, speed: f64) -> PlotResult<Vector3<f64>> {
    let offset = aim - start;
    let dist = offset.norm();
    if dist < MIN_DIVISION_THRESHOLD {
        return Err(PlotError::Simulation(
            "aim point coincides with the start point".to_string(),
        ));
    }
    Ok(offset * (speed / dist))
}

/// Horizontal launch speed that puts a drag-free shot through `aim`.
///
/// With `u = vh²`, `vh² + vy² = speed²` and `vy = sv·vh/sh + g·sh/(2·vh)`
/// reduce to `a·u² + b·u + c = 0`. The larger root is the flatter shot.
pub fn optimal_horizontal_speed(start: &Point3D, aim: &Point3D, speed: f64) -> PlotResult<f64> {
    let sh = horizontal_distance(start, aim);
    if sh < MIN_DIVISION_THRESHOLD {
        return Err(PlotError::Simulation(
            "aim point has no horizontal offset from the start point".to_string(),
        ));
    }
    let sv = aim.y - start.y;
    let sh2 = sh * sh;

    let a = sv * sv + sh2;
    let b = GRAVITY_MPS2 * sv * sh2 - speed * speed * sh2;
    let c = GRAVITY_MPS2 * GRAVITY_MPS2 * sh2 * sh2 / 4.0;

    let discriminant = b * b - 4.0 * a * c;
    if discriminant < 0.0 {
        return Err(PlotError::Simulation(format!(
            "target out of range at {} m/s",
            speed
        )));
    }

    let root = discriminant.sqrt();
    let u1 = (-b + root) / (2.0 * a);
    let u2 = (-b - root) / (2.0 * a);
    debug!("horizontal speed candidates: {} {}", u1.max(0.0).sqrt(), u2.max(0.0).sqrt());

    let u = u1.max(u2);
    if u > 0.0 {
        Ok(u.sqrt())
    } else {
        Err(PlotError::Simulation(format!(
            "target out of range at {} m/s",
            speed
        )))
    }
}

/// Vertical launch speed reaching `aim` given the horizontal speed, without drag
pub fn optimal_vertical_speed(start: &Point3D, aim: &Point3D, horizontal_speed: f64) -> f64 {
    let sh = horizontal_distance(start, aim);
    let t = (sh / horizontal_speed).abs();
    let sv = aim.y - start.y;
    (sv + 0.5 * GRAVITY_MPS2 * t * t) / t
}

/// Launch velocity of magnitude `speed` whose drag-free arc passes through `aim`
pub fn aim_with_gravity(start: &Point3D, aim: &Point3D, speed: f64) -> PlotResult<Vector3<f64>> {
    let vh = optimal_horizontal_speed(start, aim, speed)?;
    let vy = optimal_vertical_speed(start, aim, vh);
    let dx = aim.x - start.x;
    let dz = aim.z - start.z;
    let dh = (dx * dx + dz * dz).sqrt();
    Ok(Vector3::new(vh * dx / dh, vy, vh * dz / dh))
}

/// True once `pos` is further from `start` than `aim` is, along x or along z
pub fn is_behind(pos: &Point3D, start: &Point3D, aim: &Point3D) -> bool {
    let behind_x = (aim.x - start.x).abs() < (pos.x - start.x).abs();
    let behind_z = (aim.z - start.z).abs() < (pos.z - start.z).abs();
    behind_x || behind_z
}

/// Elevation of the line from `start` to `target`, in radians
pub fn elevation_angle(start: &Point3D, target: &Point3D) -> f64 {
    let horizontal = horizontal_distance(start, target);
    let vertical = target.y - start.y;
    vertical.atan2(horizontal)
}

/// Elevation of a velocity vector above the ground plane, in radians
pub fn launch_angle(velocity: &Vector3<f64>) -> f64 {
    let horizontal = (velocity.x * velocity.x + velocity.z * velocity.z).sqrt();
    velocity.y.atan2(horizontal)
}

/// Flight path of one shot and the point where it came closest to the aim
#[derive(Debug, Clone)]
pub struct ShotResult {
    /// Every integrated position, starting with the launch point
    pub history: Trajectory,
    /// Position with the smallest horizontal distance to the aim point
    pub closest: Point3D,
}

/// Integrate one shot until it passes the aim point or runs out of steps.
pub fn simulate_shot(
    start: &Point3D,
    aim: &Point3D,
    velocity: Vector3<f64>,
    config: &SimulationConfig,
) -> ShotResult {
    let mut state = ProjectileState::launch(*start, velocity);
    let mut history = vec![*start];

    let mut min_distance = horizontal_distance(start, aim);
    let mut closest = *start;

    for _ in 0..config.max_iterations {
        state.step(config.time_step, config.mass);
        history.push(state.position);

        if is_behind(&state.position, start, aim) {
            break;
        }

        let current = horizontal_distance(&state.position, aim);
        if current < min_distance {
            min_distance = current;
            closest = state.position;
        }
    }

    ShotResult { history, closest }
}

#[derive(Debug, Clone)]
pub struct ShotReport {
    pub aim: Point3D,
    pub closest: Point3D,
    /// Straight-line distance from the closest approach to the target
    pub miss_distance: f64,
    pub launch_angle_deg: f64,
}

#[derive(Debug, Clone)]
pub struct SimulationResult {
    pub scene: Scene,
    pub shots: Vec<ShotReport>,
    /// Aim point after the last correction
    pub final_aim: Point3D,
}

fn launch_velocity(config: &SimulationConfig, aim: &Point3D) -> PlotResult<Vector3<f64>> {
    match config.aim_mode {
        AimMode::Straight => aim_straight(&config.start, aim, config.velocity),
        AimMode::Gravity => aim_with_gravity(&config.start, aim, config.velocity),
    }
}

/// Fire `config.shots` shots, raising or lowering the aim point after each
/// one by how far the closest approach missed the target vertically.
pub fn run_simulation(config: &SimulationConfig) -> PlotResult<SimulationResult> {
    config.validate()?;

    let mut aim = config.target;
    let mut curves = Vec::new();
    let mut shots = Vec::new();

    for i in 0..config.shots {
        let velocity = launch_velocity(config, &aim)?;
        let shot = simulate_shot(&config.start, &aim, velocity, config);

        let miss_distance = distance(&shot.closest, &config.target);
        let launch_angle_deg = launch_angle(&velocity) * RADIANS_TO_DEGREES;
        info!(
            "Shot {}: launch angle {:.3}°, min distance {:.4} m ({} points)",
            i,
            launch_angle_deg,
            miss_distance,
            shot.history.len()
        );

        shots.push(ShotReport {
            aim,
            closest: shot.closest,
            miss_distance,
            launch_angle_deg,
        });
        aim.y += config.target.y - shot.closest.y;
        curves.push(shot.history);
    }

    info!(
        "Final aim elevation: {:.3}°",
        elevation_angle(&config.start, &aim) * RADIANS_TO_DEGREES
    );

    Ok(SimulationResult {
        scene: Scene::new(config.start, config.target, curves),
        shots,
        final_aim: aim,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_resting_projectile_without_forces_stays_put() {
        let mut state = ProjectileState {
            position: Point3D::zeros(),
            velocity: Vector3::zeros(),
            acceleration: Vector3::zeros(),
        };
        state.step(0.01, 1.0);
        assert_eq!(state.position, Point3D::zeros());
    }

    #[test]
    fn test_first_step_is_gravity_only() {
        let mut state = ProjectileState::launch(Point3D::zeros(), Vector3::new(10.0, 0.0, 0.0));
        state.step(0.1, 1.0);
        assert_relative_eq!(state.velocity.x, 10.0);
        assert_relative_eq!(state.velocity.y, -GRAVITY_MPS2 * 0.1);
        assert_relative_eq!(state.position.x, 1.0);
        assert_relative_eq!(state.position.y, -GRAVITY_MPS2 * 0.01);
        // Drag now applies
        assert!(state.acceleration.x < 0.0);
    }

    #[test]
    fn test_drag_opposes_velocity() {
        let v = Vector3::new(30.0, 10.0, -5.0);
        let drag = drag_acceleration(&v, 0.05);
        assert!(drag.dot(&v) < 0.0);
        assert_relative_eq!(drag.normalize(), -v.normalize(), epsilon = 1e-12);

        let expected =
            v.norm_squared() * AIR_DENSITY * PROJECTILE_AREA_M2 * SPHERE_DRAG_COEFFICIENT / 0.1;
        assert_relative_eq!(drag.norm(), expected, max_relative = 1e-12);
    }

    #[test]
    fn test_drag_at_rest_is_zero() {
        assert_eq!(drag_acceleration(&Vector3::zeros(), 0.05), Vector3::zeros());
        assert_eq!(acceleration(&Vector3::zeros(), 0.05), Vector3::new(0.0, -GRAVITY_MPS2, 0.0));
    }

    #[test]
    fn test_aim_straight() {
        let v = aim_straight(&Point3D::zeros(), &Point3D::new(3.0, 0.0, 4.0), 10.0).unwrap();
        assert_relative_eq!(v, Vector3::new(6.0, 0.0, 8.0), epsilon = 1e-12);
        assert!(aim_straight(&Point3D::zeros(), &Point3D::zeros(), 10.0).is_err());
    }

    #[test]
    fn test_aim_with_gravity_keeps_speed() {
        let start = Point3D::zeros();
        let aim = Point3D::new(40.0, 0.0, 45.0);
        let v = aim_with_gravity(&start, &aim, 30.0).unwrap();
        assert_relative_eq!(v.norm(), 30.0, max_relative = 1e-9);
        assert!(v.y > 0.0);
        // Horizontal direction points at the aim
        assert_relative_eq!(v.z / v.x, 45.0 / 40.0, max_relative = 1e-9);
    }

    #[test]
    fn test_aim_with_gravity_flat_range_formula() {
        // Level ground: range = v² sin(2θ) / g
        let start = Point3D::zeros();
        let aim = Point3D::new(50.0, 0.0, 0.0);
        let speed = 30.0;
        let v = aim_with_gravity(&start, &aim, speed).unwrap();
        let theta = launch_angle(&v);
        let range = speed * speed * (2.0 * theta).sin() / GRAVITY_MPS2;
        assert_relative_eq!(range, 50.0, max_relative = 1e-9);
        // Flatter of the two solutions
        assert!(theta < std::f64::consts::FRAC_PI_4);
    }

    #[test]
    fn test_aim_with_gravity_out_of_range() {
        let far = Point3D::new(60.0, 0.0, 0.0);
        let err = aim_with_gravity(&Point3D::zeros(), &far, 10.0).unwrap_err();
        assert!(matches!(err, PlotError::Simulation(_)));
        assert!(err.to_string().contains("out of range"));

        let overhead = Point3D::new(0.0, 10.0, 0.0);
        let err = aim_with_gravity(&Point3D::zeros(), &overhead, 10.0).unwrap_err();
        assert!(matches!(err, PlotError::Simulation(_)));
    }

    #[test]
    fn test_is_behind() {
        let start = Point3D::zeros();
        let aim = Point3D::new(10.0, 0.0, 5.0);
        assert!(!is_behind(&Point3D::new(5.0, 3.0, 2.0), &start, &aim));
        assert!(is_behind(&Point3D::new(10.5, 0.0, 2.0), &start, &aim));
        assert!(is_behind(&Point3D::new(2.0, 0.0, -6.0), &start, &aim));
    }

    #[test]
    fn test_angles() {
        let start = Point3D::zeros();
        assert_relative_eq!(
            elevation_angle(&start, &Point3D::new(3.0, 5.0, 4.0)),
            std::f64::consts::FRAC_PI_4
        );
        assert_relative_eq!(
            launch_angle(&Vector3::new(0.0, 1.0, 1.0)),
            std::f64::consts::FRAC_PI_4
        );
        assert_relative_eq!(launch_angle(&Vector3::new(1.0, 0.0, 0.0)), 0.0);
    }

    #[test]
    fn test_simulate_shot_history_starts_at_launch() {
        let config = SimulationConfig::default();
        let velocity = aim_straight(&config.start, &config.target, config.velocity).unwrap();
        let shot = simulate_shot(&config.start, &config.target, velocity, &config);
        assert_eq!(shot.history[0], config.start);
        assert!(shot.history.len() > 1);
        assert!(shot.history.len() <= config.max_iterations + 1);
        let last = shot.history.last().unwrap();
        assert!(is_behind(last, &config.start, &config.target));
    }

    #[test]
    fn test_gravity_aim_hits_without_meaningful_drag() {
        let config = SimulationConfig {
            mass: 1.0e6,
            aim_mode: AimMode::Gravity,
            shots: 1,
            ..Default::default()
        };
        let result = run_simulation(&config).unwrap();
        assert!(result.shots[0].miss_distance < 0.5, "miss {}", result.shots[0].miss_distance);
    }

    #[test]
    fn test_aim_correction_reduces_miss() {
        let config = SimulationConfig::default();
        let result = run_simulation(&config).unwrap();
        assert_eq!(result.shots.len(), config.shots);
        assert_eq!(result.scene.curves.len(), config.shots);
        let first = result.shots.first().unwrap().miss_distance;
        let last = result.shots.last().unwrap().miss_distance;
        assert!(last < first, "first {} last {}", first, last);
        // Correction only moves the aim vertically
        assert_eq!(result.final_aim.x, config.target.x);
        assert_eq!(result.final_aim.z, config.target.z);
        assert!(result.final_aim.y > config.target.y);
    }

    #[test]
    fn test_invalid_config() {
        for config in [
            SimulationConfig {
                velocity: 0.0,
                ..Default::default()
            },
            SimulationConfig {
                mass: -1.0,
                ..Default::default()
            },
            SimulationConfig {
                time_step: f64::NAN,
                ..Default::default()
            },
        ] {
            assert!(matches!(run_simulation(&config), Err(PlotError::Simulation(_))));
        }
    }

    #[test]
    fn test_shot_count_is_bounded() {
        for shots in [MAX_SHOTS + 1, usize::MAX] {
            let config = SimulationConfig {
                shots,
                ..Default::default()
            };
            assert!(matches!(run_simulation(&config), Err(PlotError::Simulation(_))));
        }
    }

    #[test]
    fn test_zero_shots_gives_empty_scene() {
        let config = SimulationConfig {
            shots: 0,
            ..Default::default()
        };
        let result = run_simulation(&config).unwrap();
        assert!(result.scene.curves.is_empty());
        assert_eq!(result.final_aim, config.target);
    }
}
