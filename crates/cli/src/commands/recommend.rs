use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use cgscope_core::loader::CgResult;
use cgscope_core::overlap::{structurals, write_structurals, SystemOverlap};
use cgscope_core::recommend::{self, GreedyAdditional};
use tracing::{info, warn};

use crate::commands::{load_results, open_output};
use crate::{AnalysisConfig, RunSummary};

/// `<scenario>_recFile_recs-<count>.csv`
pub fn rec_file_path(config: &AnalysisConfig, count: usize) -> PathBuf {
    config.out_dir.join(format!("{}_recFile_recs-{}.csv", config.scenario, count))
}

/// `<scenario>_struct_node_overlap_recs-<count>.csv`
pub fn rec_overlap_file_path(config: &AnalysisConfig, count: usize) -> PathBuf {
    config.out_dir.join(format!("{}_struct_node_overlap_recs-{}.csv", config.scenario, count))
}

/// Recommend up to `count` new functions per configuration, for each count.
///
/// Overlaps are computed once on project nodes. Per count, the
/// recommendations and the overlaps of the extended suites are written. A
/// count whose reports fail is logged and skipped.
pub fn recommendation_command(config: &AnalysisConfig, counts: &[usize]) -> Result<RunSummary> {
    info!(projects = %config.projects, ?counts, "recommending microbenchmarks");
    let start = Instant::now();

    let results = load_results(config)?;
    let mut summary = RunSummary::new("recommendation", config, results.len());
    let overlaps = structurals(&config.projects, &results, true);

    for &count in counts {
        if let Err(err) = run_count(config, &results, &overlaps, count, &mut summary) {
            warn!(count, error = %format!("{err:#}"), "recommendation failed");
        }
    }

    info!(elapsed = ?start.elapsed(), "finished recommendation");
    Ok(summary)
}

fn run_count(
    config: &AnalysisConfig,
    results: &[CgResult],
    overlaps: &[SystemOverlap],
    count: usize,
    summary: &mut RunSummary,
) -> Result<()> {
    let recs = recommend::apply_all(&config.projects, results, overlaps, &GreedyAdditional, count)
        .with_context(|| format!("count={count}: could not apply recommendations"))?;

    let rec_path = rec_file_path(config, count);
    recommend::write_all(&config.projects, &recs, open_output(&rec_path, true)?)
        .with_context(|| format!("count={count}: could not write {}", rec_path.display()))?;
    summary.add_file(&rec_path);

    let overlap_path = rec_overlap_file_path(config, count);
    let extended: Vec<CgResult> = recs.into_iter().map(|r| r.cg).collect();
    let out = open_output(&overlap_path, true)?;
    write_structurals(&config.projects, &extended, true, out, true)
        .with_context(|| format!("count={count}: could not write {}", overlap_path.display()))?;
    summary.add_file(&overlap_path);

    Ok(())
}
