use std::error::Error;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use plotters::drawing::DrawingAreaErrorKind;

/// Everything that can abort a plot or simulation run.
///
/// All variants are fatal; the binary reports them with the stage name and
/// exits non-zero.
#[derive(Debug)]
pub enum PlotError {
    /// Missing or invalid command-line input
    Usage(String),
    /// Input file missing or unreadable, or output file not writable
    Io { path: PathBuf, source: io::Error },
    /// Malformed CSV row (1-based line number)
    Parse { line: u64, message: String },
    /// JSON document missing a key or holding a value of the wrong shape
    Schema(String),
    /// Chart construction or image encoding failed
    Render(String),
    /// Launch parameters with no valid solution
    Simulation(String),
}

impl PlotError {
    pub fn io(path: &Path, source: io::Error) -> Self {
        PlotError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    pub fn parse(line: u64, message: impl Into<String>) -> Self {
        PlotError::Parse {
            line,
            message: message.into(),
        }
    }

    /// Short name of the pipeline stage that failed
    pub fn stage(&self) -> &'static str {
        match self {
            PlotError::Usage(_) => "usage",
            PlotError::Io { .. } => "io",
            PlotError::Parse { .. } => "parse",
            PlotError::Schema(_) => "schema",
            PlotError::Render(_) => "render",
            PlotError::Simulation(_) => "simulation",
        }
    }
}

impl fmt::Display for PlotError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PlotError::Usage(msg) => write!(f, "{}", msg),
            PlotError::Io { path, source } => write!(f, "{}: {}", path.display(), source),
            PlotError::Parse { line, message } => write!(f, "line {}: {}", line, message),
            PlotError::Schema(msg) => write!(f, "invalid scene document: {}", msg),
            PlotError::Render(msg) => write!(f, "failed to render plot: {}", msg),
            PlotError::Simulation(msg) => write!(f, "{}", msg),
        }
    }
}

impl Error for PlotError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            PlotError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for PlotError {
    fn from(err: serde_json::Error) -> Self {
        PlotError::Schema(err.to_string())
    }
}

impl<E: Error + Send + Sync> From<DrawingAreaErrorKind<E>> for PlotError {
    fn from(err: DrawingAreaErrorKind<E>) -> Self {
        PlotError::Render(err.to_string())
    }
}

pub type PlotResult<T> = Result<T, PlotError>;
