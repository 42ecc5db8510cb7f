//! Directory loader: one [`CgResult`] per rendering configuration.
//!
//! The system directory defines the analysis grid: every `*.dot` file in it
//! names one configuration. For each configuration the system graph and all
//! micro graphs rendered with the same configuration are parsed into a single
//! shared [`Ider`].

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, warn};

use crate::dot::{parse_dot_file, DotError};
use crate::graph::CallGraph;
use crate::model::Ider;
use crate::profile::{parse_file_name_config, ConfigError, OutConfig};

const DOT_EXTENSION: &str = ".dot";

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Failed to read directory {path}: {source}")]
    ReadDir { path: PathBuf, source: io::Error },
    #[error("Could not parse config of {path}: {source}")]
    Config { path: PathBuf, source: ConfigError },
    #[error("Config of {path} is {found}, expected {expected}")]
    ConfigMismatch { path: PathBuf, expected: OutConfig, found: OutConfig },
    #[error(transparent)]
    Dot(#[from] DotError),
}

/// Call graphs of one system benchmark and its micros under one configuration.
///
/// `Clone` is a deep copy: graphs and the id registry are duplicated, so a
/// clone can be mutated without affecting the original.
#[derive(Debug, Clone)]
pub struct CgResult {
    pub config: OutConfig,
    /// System benchmark name (file name without the config suffix).
    pub system: String,
    pub system_cg: CallGraph,
    /// Micro graphs keyed by file name.
    pub micro_cgs: BTreeMap<String, CallGraph>,
    pub ider: Ider,
}

impl CgResult {
    pub fn new(
        config: OutConfig,
        system: impl Into<String>,
        system_cg: CallGraph,
        ider: Ider,
    ) -> Self {
        Self { config, system: system.into(), system_cg, micro_cgs: BTreeMap::new(), ider }
    }

    /// A deep copy of this result with the given micro graphs instead of the
    /// current ones.
    pub fn with_micros(&self, micro_cgs: BTreeMap<String, CallGraph>) -> Self {
        Self {
            config: self.config,
            system: self.system.clone(),
            system_cg: self.system_cg.clone(),
            micro_cgs,
            ider: self.ider.clone(),
        }
    }
}

/// Load every configuration found in `system_dir`, in file-name order.
///
/// System files with an unparseable name, and configurations whose system
/// graph fails to load, are skipped with a warning. Unreadable
/// directories are an error.
pub fn load_system_micro(system_dir: &Path, micro_dir: &Path) -> Result<Vec<CgResult>, LoadError> {
    let mut results = Vec::new();

    for (name, path) in dot_files(system_dir)? {
        let config = match parse_file_name_config(&name) {
            Ok((_, config)) => config,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "skipping system file");
                continue;
            }
        };

        match load_config(&path, micro_dir, config) {
            Ok(res) => results.push(res),
            Err(err @ LoadError::ReadDir { .. }) => return Err(err),
            Err(err) => {
                warn!(path = %path.display(), %config, error = %err, "skipping configuration");
            }
        }
    }

    Ok(results)
}

/// Load the system graph at `system_file` plus all micros of `config`.
pub fn load_config(
    system_file: &Path,
    micro_dir: &Path,
    config: OutConfig,
) -> Result<CgResult, LoadError> {
    let file_name =
        system_file.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
    let (system, found) = parse_file_name_config(&file_name)
        .map_err(|source| LoadError::Config { path: system_file.to_path_buf(), source })?;
    if found != config {
        return Err(LoadError::ConfigMismatch {
            path: system_file.to_path_buf(),
            expected: config,
            found,
        });
    }

    let ider = Ider::new();
    let system_cg = parse_dot_file(system_file, &ider)?;
    let micro_cgs = load_micros(micro_dir, config, &ider)?;
    debug!(
        %system,
        %config,
        micros = micro_cgs.len(),
        functions = system_cg.function_count(),
        "loaded configuration"
    );

    let mut res = CgResult::new(config, system, system_cg, ider);
    res.micro_cgs = micro_cgs;
    Ok(res)
}

/// Parse every micro DOT file in `micro_dir` rendered with `config`.
///
/// Micros with malformed content are skipped with a warning; an unreadable
/// micro file fails the whole configuration.
pub fn load_micros(
    micro_dir: &Path,
    config: OutConfig,
    ider: &Ider,
) -> Result<BTreeMap<String, CallGraph>, LoadError> {
    let mut micros = BTreeMap::new();

    for (name, path) in dot_files(micro_dir)? {
        match parse_file_name_config(&name) {
            Ok((_, micro_config)) if micro_config == config => {}
            Ok(_) => continue,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "skipping micro file");
                continue;
            }
        }

        match parse_dot_file(&path, ider) {
            Ok(cg) => {
                micros.insert(name, cg);
            }
            Err(err @ DotError::Io { .. }) => return Err(err.into()),
            Err(err) => warn!(path = %path.display(), error = %err, "skipping micro file"),
        }
    }

    Ok(micros)
}

/// Regular `*.dot` files directly inside `dir`, sorted by name.
fn dot_files(dir: &Path) -> Result<Vec<(String, PathBuf)>, LoadError> {
    let read_err = |source| LoadError::ReadDir { path: dir.to_path_buf(), source };

    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(read_err)? {
        let entry = entry.map_err(read_err)?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.ends_with(DOT_EXTENSION) {
            files.push((name, path));
        }
    }

    files.sort();
    Ok(files)
}
