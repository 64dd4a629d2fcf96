use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use log::LevelFilter;
use trajectory_plot::constants::{
    DEFAULT_IMAGE_SIZE, DEFAULT_MASS_KG, DEFAULT_PLOT_FILE, DEFAULT_SCENE_FILE, DEFAULT_SHOTS,
    DEFAULT_TIME_STEP_S, DEFAULT_VELOCITY_MPS, MAX_ITERATIONS,
};
use trajectory_plot::{
    plot_file, run_simulation, writer, AimMode, AxisScaling, InputFormat, PlotError, PlotResult,
    Point3D, RenderOptions, SimulationConfig,
};

const PLOT_USAGE: &str = "Usage: trajectory-plot plot <INPUT> [--format csv|json] [--output PATH]";

#[derive(Parser)]
#[command(name = "trajectory-plot")]
#[command(version)]
#[command(about = "Simulate projectile shots and plot their ballistic curves", long_about = None)]
struct Cli {
    /// Log pipeline progress (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a scene file to a PNG
    Plot {
        /// Scene file (.json for JSON, anything else is read as CSV)
        input: Option<PathBuf>,

        /// Override the format inferred from the file extension
        #[arg(short, long)]
        format: Option<FormatArg>,

        /// Output image
        #[arg(short, long, default_value = DEFAULT_PLOT_FILE)]
        output: PathBuf,

        /// Axis scaling policy
        #[arg(long, default_value = "equal")]
        axis: AxisArg,

        /// Image width (pixels)
        #[arg(long, default_value_t = DEFAULT_IMAGE_SIZE.0)]
        width: u32,

        /// Image height (pixels)
        #[arg(long, default_value_t = DEFAULT_IMAGE_SIZE.1)]
        height: u32,
    },

    /// Simulate corrected shots at a target and save the scene
    Simulate {
        /// Launch point as x,y,z (meters)
        #[arg(
            long,
            default_value = "0,0,0",
            value_parser = parse_point,
            allow_hyphen_values = true
        )]
        start: Point3D,

        /// Target point as x,y,z (meters)
        #[arg(
            long,
            default_value = "40,0,45",
            value_parser = parse_point,
            allow_hyphen_values = true
        )]
        target: Point3D,

        /// Launch speed (m/s)
        #[arg(long, default_value_t = DEFAULT_VELOCITY_MPS)]
        velocity: f64,

        /// Projectile mass (kg)
        #[arg(short, long, default_value_t = DEFAULT_MASS_KG)]
        mass: f64,

        /// Integration time step (seconds)
        #[arg(long, default_value_t = DEFAULT_TIME_STEP_S)]
        time_step: f64,

        /// Number of shots, each corrected from the previous miss
        #[arg(short = 'n', long, default_value_t = DEFAULT_SHOTS)]
        shots: usize,

        /// Maximum integration steps per shot
        #[arg(long, default_value_t = MAX_ITERATIONS)]
        max_iterations: usize,

        /// How the launch velocity is aimed
        #[arg(long, default_value = "straight")]
        aim: AimArg,

        /// Scene format (inferred from the output extension if omitted)
        #[arg(short, long)]
        format: Option<FormatArg>,

        /// Scene file to write
        #[arg(short, long, default_value = DEFAULT_SCENE_FILE)]
        output: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FormatArg {
    Csv,
    Json,
}

impl From<FormatArg> for InputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Csv => InputFormat::Csv,
            FormatArg::Json => InputFormat::Json,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum AxisArg {
    Equal,
    Stretched,
}

impl From<AxisArg> for AxisScaling {
    fn from(arg: AxisArg) -> Self {
        match arg {
            AxisArg::Equal => AxisScaling::Equal,
            AxisArg::Stretched => AxisScaling::Stretched,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum AimArg {
    Straight,
    Gravity,
}

impl From<AimArg> for AimMode {
    fn from(arg: AimArg) -> Self {
        match arg {
            AimArg::Straight => AimMode::Straight,
            AimArg::Gravity => AimMode::Gravity,
        }
    }
}

fn parse_point(s: &str) -> Result<Point3D, String> {
    let coords: Vec<f64> = s
        .split(',')
        .map(|c| c.trim().parse::<f64>().map_err(|_| format!("invalid coordinate: {:?}", c)))
        .collect::<Result<_, _>>()?;
    match coords.as_slice() {
        [x, y, z] => Ok(Point3D::new(*x, *y, *z)),
        _ => Err(format!("expected x,y,z, got {} values", coords.len())),
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        LevelFilter::Info
    } else {
        LevelFilter::Warn
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(PlotError::Usage(msg)) => {
            println!("{}", msg);
            ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!("error [{}]: {}", e.stage(), e);
            ExitCode::FAILURE
        }
    }
}

fn run(command: Commands) -> PlotResult<()> {
    match command {
        Commands::Plot {
            input,
            format,
            output,
            axis,
            width,
            height,
        } => {
            let input = input.ok_or_else(|| PlotError::Usage(PLOT_USAGE.to_string()))?;
            let options = RenderOptions {
                output,
                width,
                height,
                axis_scaling: axis.into(),
            };
            plot_file(&input, format.map(Into::into), &options)?;
            println!("Saved plot to {}", options.output.display());
        }

        Commands::Simulate {
            start,
            target,
            velocity,
            mass,
            time_step,
            shots,
            max_iterations,
            aim,
            format,
            output,
        } => {
            let config = SimulationConfig {
                start,
                target,
                velocity,
                mass,
                time_step,
                shots,
                aim_mode: aim.into(),
                max_iterations,
            };
            let result = run_simulation(&config)?;

            let format = format
                .map(Into::into)
                .unwrap_or_else(|| InputFormat::from_path(&output));
            writer::save(&result.scene, &output, format)?;

            println!("┌──────┬─────────────┬───────────────┬──────────┐");
            println!("│ Shot │ Angle (deg) │ Miss dist (m) │  Aim Y   │");
            println!("├──────┼─────────────┼───────────────┼──────────┤");
            for (i, shot) in result.shots.iter().enumerate() {
                println!(
                    "│ {:>4} │ {:>11.3} │ {:>13.4} │ {:>8.3} │",
                    i, shot.launch_angle_deg, shot.miss_distance, shot.aim.y
                );
            }
            println!("└──────┴─────────────┴───────────────┴──────────┘");
            println!("Saved {} scene to {}", format, output.display());
        }
    }

    Ok(())
}
