use std::io::Write;

use crate::graph::ProjectPrefixes;
use crate::recommend::RecommendationResult;
use crate::report::{self, ReportError};

pub const RECOMMENDATION_HEADER: [&str; 10] = [
    "project",
    "system",
    "config_node_count",
    "config_node_fraction",
    "requested_recs",
    "actual_recs",
    "func_name",
    "func_time",
    "func_total_time",
    "additional_nodes",
];

/// Header plus one row per recommended function. Times are in nanoseconds.
pub fn write_all<W: Write>(
    projects: &ProjectPrefixes,
    results: &[RecommendationResult],
    out: W,
) -> Result<(), ReportError> {
    let mut w = report::writer(out);
    report::write_row(&mut w, RECOMMENDATION_HEADER)?;

    for res in results {
        let actual = res.recommended.len();
        for rec in &res.recommended {
            let f = &rec.function;
            report::write_row(
                &mut w,
                [
                    projects.joined(),
                    res.cg.system.clone(),
                    res.cg.config.node_count.to_string(),
                    report::fraction(res.cg.config.node_fraction),
                    res.requested.to_string(),
                    actual.to_string(),
                    f.name.clone(),
                    f.self_time.as_nanos().to_string(),
                    f.total_time.as_nanos().to_string(),
                    rec.additional_nodes.to_string(),
                ],
            )?;
        }
    }

    Ok(())
}
