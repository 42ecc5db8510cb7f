use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use cgscope_core::graph::Exclusion;
use cgscope_core::loader::CgResult;
use cgscope_core::minimize::{self, Strategy};
use cgscope_core::overlap::{structurals, write_structurals};
use tracing::{info, warn};

use crate::commands::{load_results, open_output};
use crate::{AnalysisConfig, RunSummary};

/// `<scenario>_minFile_<strategy>.csv`
pub fn min_file_path(config: &AnalysisConfig, strategy: Strategy) -> PathBuf {
    config.out_dir.join(format!("{}_minFile_{}.csv", config.scenario, strategy.name()))
}

/// `<scenario>_struct_node_overlap_mins-<strategy>.csv`
pub fn min_overlap_file_path(config: &AnalysisConfig, strategy: Strategy) -> PathBuf {
    config
        .out_dir
        .join(format!("{}_struct_node_overlap_mins-{}.csv", config.scenario, strategy.name()))
}

/// Minimize the micro suite of every configuration with each strategy.
///
/// Every strategy runs twice into the same pair of files: project nodes only
/// (with headers), then all nodes (appended). A pass that fails is logged and
/// the remaining passes still run.
pub fn minimization_command(config: &AnalysisConfig) -> Result<RunSummary> {
    info!(projects = %config.projects, "minimizing microbenchmarks");
    let start = Instant::now();

    let results = load_results(config)?;
    let mut summary = RunSummary::new("minimization", config, results.len());

    for strategy in Strategy::ALL {
        for project_only in [true, false] {
            if let Err(err) = run_strategy(config, &results, strategy, project_only, &mut summary)
            {
                warn!(
                    %strategy,
                    project_only,
                    error = %format!("{err:#}"),
                    "minimization pass failed"
                );
            }
        }
    }

    info!(elapsed = ?start.elapsed(), "finished minimization");
    Ok(summary)
}

fn run_strategy(
    config: &AnalysisConfig,
    results: &[CgResult],
    strategy: Strategy,
    project_only: bool,
    summary: &mut RunSummary,
) -> Result<()> {
    let write_header = project_only;
    let overlaps = structurals(&config.projects, results, project_only);
    let excl = !Exclusion::is_projects(&config.projects);

    let minimized = minimize::apply_all(results, &overlaps, strategy, &excl)
        .with_context(|| format!("strategy={strategy}: could not apply minimization"))?;

    let min_path = min_file_path(config, strategy);
    minimize::write_all(
        &config.projects,
        &minimized,
        open_output(&min_path, write_header)?,
        project_only,
        write_header,
    )
    .with_context(|| format!("strategy={strategy}: could not write {}", min_path.display()))?;
    summary.add_file(&min_path);

    let overlap_path = min_overlap_file_path(config, strategy);
    let minimized_cgs: Vec<CgResult> = minimized.into_iter().map(|m| m.cg).collect();
    write_structurals(
        &config.projects,
        &minimized_cgs,
        project_only,
        open_output(&overlap_path, write_header)?,
        write_header,
    )
    .with_context(|| format!("strategy={strategy}: could not write {}", overlap_path.display()))?;
    summary.add_file(&overlap_path);

    Ok(())
}
