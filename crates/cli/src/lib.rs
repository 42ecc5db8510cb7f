pub mod commands;

use std::env;
use std::num::ParseIntError;
use std::path::{Path, PathBuf};

use cgscope_core::graph::ProjectPrefixes;
use serde::Serialize;
use thiserror::Error;

/// Exit code for invalid arguments (also used by clap for usage errors).
pub const EXIT_ARGS: u8 = 2;
/// Exit code for a counts entry that is not an integer.
pub const EXIT_COUNTS_PARSE: u8 = 3;
/// Exit code for a counts entry that is not positive.
pub const EXIT_COUNTS_RANGE: u8 = 4;
/// Exit code for everything else.
pub const EXIT_FAILURE: u8 = 1;

#[derive(Debug, Error)]
pub enum ArgError {
    #[error("{role} dir {path} does not exist")]
    Missing { role: &'static str, path: PathBuf },
    #[error("{role} dir {path} is not a directory")]
    NotADirectory { role: &'static str, path: PathBuf },
    #[error("Failed to resolve {role} dir {path}: {source}")]
    Resolve { role: &'static str, path: PathBuf, source: std::io::Error },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CountsError {
    #[error("Could not parse count '{value}' as an integer: {source}")]
    Parse { value: String, source: ParseIntError },
    #[error("Invalid count {0}: must be positive")]
    NotPositive(i64),
}

impl CountsError {
    pub fn exit_code(&self) -> u8 {
        match self {
            CountsError::Parse { .. } => EXIT_COUNTS_PARSE,
            CountsError::NotPositive(_) => EXIT_COUNTS_RANGE,
        }
    }
}

/// Parse a comma-separated list of recommendation counts.
///
/// Blank entries are ignored, so `""` and `" , "` yield no counts.
pub fn parse_counts(arg: &str) -> Result<Vec<usize>, CountsError> {
    let mut counts = Vec::new();
    for entry in arg.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        let value: i64 = entry
            .parse()
            .map_err(|source| CountsError::Parse { value: entry.to_string(), source })?;
        let count = usize::try_from(value)
            .ok()
            .filter(|c| *c > 0)
            .ok_or(CountsError::NotPositive(value))?;
        counts.push(count);
    }
    Ok(counts)
}

/// Resolve `path` to an absolute, existing directory.
pub fn resolve_dir(path: &str, role: &'static str) -> Result<PathBuf, ArgError> {
    let raw = Path::new(path);
    if !raw.exists() {
        return Err(ArgError::Missing { role, path: raw.to_path_buf() });
    }
    if !raw.is_dir() {
        return Err(ArgError::NotADirectory { role, path: raw.to_path_buf() });
    }
    match raw.canonicalize() {
        Ok(p) => Ok(p),
        Err(_) if raw.is_absolute() => Ok(raw.to_path_buf()),
        Err(_) => env::current_dir()
            .map(|cwd| cwd.join(raw))
            .map_err(|source| ArgError::Resolve { role, path: raw.to_path_buf(), source }),
    }
}

/// Infer the scenario name from the system dir.
///
/// If the path has no final component (e.g., `/`), fallback to `unnamed-scenario`.
pub fn infer_scenario_name(system_dir: &Path) -> String {
    system_dir
        .file_name()
        .and_then(|os_str| os_str.to_str())
        .unwrap_or("unnamed-scenario")
        .to_string()
}

/// Validated inputs shared by every analysis command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalysisConfig {
    pub projects: ProjectPrefixes,
    pub system_dir: PathBuf,
    pub micro_dir: PathBuf,
    pub out_dir: PathBuf,
    pub scenario: String,
}

impl AnalysisConfig {
    pub fn from_args(
        projects: &str,
        system_dir: &str,
        micro_dir: &str,
        out_dir: &str,
    ) -> Result<Self, ArgError> {
        let system_dir = resolve_dir(system_dir, "system")?;
        let micro_dir = resolve_dir(micro_dir, "micro")?;
        let out_dir = resolve_dir(out_dir, "out")?;
        let scenario = infer_scenario_name(&system_dir);

        Ok(Self {
            projects: ProjectPrefixes::parse(projects),
            system_dir,
            micro_dir,
            out_dir,
            scenario,
        })
    }
}

/// What a command did, printed at the end of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub command: String,
    pub config: AnalysisConfig,
    /// Number of rendering configurations found in the system dir.
    pub configs: usize,
    pub files: Vec<PathBuf>,
}

impl RunSummary {
    pub fn new(command: &str, config: &AnalysisConfig, configs: usize) -> Self {
        Self { command: command.to_string(), config: config.clone(), configs, files: Vec::new() }
    }

    /// Record a written file once, keeping first-write order.
    pub fn add_file(&mut self, path: &Path) {
        if !self.files.iter().any(|p| p == path) {
            self.files.push(path.to_path_buf());
        }
    }
}

/// Map a command error onto the process exit code.
pub fn exit_code(err: &anyhow::Error) -> u8 {
    if let Some(counts) = err.downcast_ref::<CountsError>() {
        counts.exit_code()
    } else if err.downcast_ref::<ArgError>().is_some() {
        EXIT_ARGS
    } else {
        EXIT_FAILURE
    }
}
