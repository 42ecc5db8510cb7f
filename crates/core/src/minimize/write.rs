use std::io::Write;

use crate::graph::ProjectPrefixes;
use crate::minimize::MinimizationResult;
use crate::report::{self, ReportError};

pub const MINIMIZATION_HEADER: [&str; 10] = [
    "project",
    "system",
    "config_node_count",
    "config_node_fraction",
    "project_only",
    "total",
    "rank",
    "name",
    "additional_nodes",
    "appBenchTime(ms)",
];

/// One row per selected micro, ranked from 1 in selection order.
pub fn write_all<W: Write>(
    projects: &ProjectPrefixes,
    results: &[MinimizationResult],
    out: W,
    project_only: bool,
    write_header: bool,
) -> Result<(), ReportError> {
    let mut w = report::writer(out);
    if write_header {
        report::write_row(&mut w, MINIMIZATION_HEADER)?;
    }

    for res in results {
        let total = res.selected.len();
        for (i, sel) in res.selected.iter().enumerate() {
            report::write_row(
                &mut w,
                [
                    projects.joined(),
                    res.cg.system.clone(),
                    res.cg.config.node_count.to_string(),
                    report::fraction(res.cg.config.node_fraction),
                    project_only.to_string(),
                    total.to_string(),
                    (i + 1).to_string(),
                    sel.benchmark.clone(),
                    sel.additional_nodes.to_string(),
                    sel.app_bench_time.as_millis().to_string(),
                ],
            )?;
        }
    }

    Ok(())
}
