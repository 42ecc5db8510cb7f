use std::io::Write;

use csv::Writer;

use crate::graph::ProjectPrefixes;
use crate::loader::CgResult;
use crate::overlap::{structurals, NodeResult, SystemOverlap};
use crate::profile::{parse_file_name_config, OutConfig};
use crate::report::{self, ReportError};

pub const OVERLAP_HEADER: [&str; 11] = [
    "project",
    "system",
    "micro",
    "config_node_count",
    "config_node_fraction",
    "project_only",
    "system_nodes",
    "micro_nodes",
    "overlap_type",
    "overlap_nodes",
    "overlap_perc",
];

const OVERLAP_TYPE_NODE: &str = "node";

/// Compute the overlaps of every result and write one row per micro plus an
/// `ALL` row per result. The header is written once, before the first row,
/// when `write_header` is set.
pub fn write_structurals<W: Write>(
    projects: &ProjectPrefixes,
    cg_res: &[CgResult],
    project_only: bool,
    out: W,
    write_header: bool,
) -> Result<(), ReportError> {
    let overlaps = structurals(projects, cg_res, project_only);

    let mut w = report::writer(out);
    if write_header {
        report::write_row(&mut w, OVERLAP_HEADER)?;
    }

    for (res, overlap) in cg_res.iter().zip(&overlaps) {
        write_system(&mut w, projects, res, overlap, project_only)?;
    }

    Ok(())
}

fn write_system<W: Write>(
    w: &mut Writer<W>,
    projects: &ProjectPrefixes,
    res: &CgResult,
    overlap: &SystemOverlap,
    project_only: bool,
) -> Result<(), ReportError> {
    for (key, micro) in &overlap.micros {
        let (micro_name, config) = parse_file_name_config(key)
            .map_err(|source| ReportError::MicroName { key: key.clone(), source })?;
        write_result(w, projects, &micro_name, &config, project_only, micro)?;
    }

    let total = &overlap.total;
    write_result(w, projects, &total.micro_name, &res.config, project_only, total)
}

fn write_result<W: Write>(
    w: &mut Writer<W>,
    projects: &ProjectPrefixes,
    micro: &str,
    config: &OutConfig,
    project_only: bool,
    result: &NodeResult,
) -> Result<(), ReportError> {
    report::write_row(
        w,
        [
            projects.joined(),
            result.system_name.clone(),
            micro.to_string(),
            config.node_count.to_string(),
            report::fraction(config.node_fraction),
            project_only.to_string(),
            result.system_nodes.len().to_string(),
            result.micro_nodes.len().to_string(),
            OVERLAP_TYPE_NODE.to_string(),
            result.overlapping_nodes.len().to_string(),
            report::fraction(result.overlapping_perc),
        ],
    )
}
