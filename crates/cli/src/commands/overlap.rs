use std::time::Instant;

use anyhow::{Context, Result};
use cgscope_core::overlap::write_structurals;
use tracing::info;

use crate::commands::{load_results, open_output};
use crate::{AnalysisConfig, RunSummary};

pub const OVERLAP_FILE: &str = "struct_node_overlap.csv";

/// Write the structural overlaps of all configurations to
/// `struct_node_overlap.csv`: all nodes first, then project nodes only.
pub fn overlap_command(config: &AnalysisConfig) -> Result<RunSummary> {
    info!(projects = %config.projects, "computing structural overlaps");
    let start = Instant::now();

    let results = load_results(config)?;
    let mut summary = RunSummary::new("overlap", config, results.len());

    let path = config.out_dir.join(OVERLAP_FILE);
    let file = open_output(&path, true)?;
    write_structurals(&config.projects, &results, false, &file, true)
        .with_context(|| format!("Failed to write overlaps of all nodes to {}", path.display()))?;
    write_structurals(&config.projects, &results, true, &file, false).with_context(|| {
        format!("Failed to write overlaps of project nodes to {}", path.display())
    })?;
    summary.add_file(&path);

    info!(elapsed = ?start.elapsed(), "finished overlaps");
    Ok(summary)
}
