/// Physical constants and defaults used by the simulator and the plotter

/// Gravitational acceleration in m/s²
///
/// Note: the shot generator has always used 9.8 rather than the standard
/// 9.80665. Kept so regenerated scenes match previously recorded files.
pub const GRAVITY_MPS2: f64 = 9.8;

/// Air density at 15°C and 1 atm (kg/m³)
pub const AIR_DENSITY: f64 = 1.225;

/// Drag coefficient of a sphere
pub const SPHERE_DRAG_COEFFICIENT: f64 = 0.47;

/// Cross-sectional area of a 7.62 mm projectile (m²)
pub const PROJECTILE_AREA_M2: f64 = 0.0005067;

/// Conversion factor: radians to degrees
pub const RADIANS_TO_DEGREES: f64 = 180.0 / std::f64::consts::PI;

/// Upper bound on integration steps for a single shot
///
/// At the default 1 ms step this is 10 seconds of flight.
pub const MAX_ITERATIONS: usize = 10_000;

/// Minimum threshold for velocity magnitude to avoid division by zero
pub const MIN_VELOCITY_THRESHOLD: f64 = 1e-6;

/// Minimum threshold for preventing division by zero in general calculations
pub const MIN_DIVISION_THRESHOLD: f64 = 1e-12;

// Simulation defaults

/// Integration time step (seconds)
pub const DEFAULT_TIME_STEP_S: f64 = 0.001;

/// Launch speed (m/s)
pub const DEFAULT_VELOCITY_MPS: f64 = 30.0;

/// Projectile mass (kg)
pub const DEFAULT_MASS_KG: f64 = 0.05;

/// Number of corrected shots fired per simulation run
pub const DEFAULT_SHOTS: usize = 5;

/// Upper bound on shots per simulation run
pub const MAX_SHOTS: usize = 1_000;

// File and image defaults

/// Scene file the simulator writes and the legacy CSV plotter read
pub const DEFAULT_SCENE_FILE: &str = "output.txt";

/// Image written by the plotter, overwritten on every run
pub const DEFAULT_PLOT_FILE: &str = "plot.png";

/// Default image size in pixels (width, height)
pub const DEFAULT_IMAGE_SIZE: (u32, u32) = (1024, 768);

/// Fraction of the data extent added on each side of the plot in equal-aspect mode
pub const PLOT_PADDING_FRACTION: f64 = 0.05;
