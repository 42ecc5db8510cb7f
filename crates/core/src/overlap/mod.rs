//! Structural overlap between a system call graph and its micro graphs.
//!
//! For every (system, micro) pair the nodes of both graphs are collected,
//! optionally restricted to project functions, and intersected. A `total`
//! result per system sums the per-node counts over all micros.

mod write;

use std::collections::BTreeMap;

use serde::Serialize;

use crate::graph::{CallGraph, Exclusion, ProjectPrefixes};
use crate::loader::CgResult;
use crate::model::FunctionId;

pub use write::{write_structurals, OVERLAP_HEADER};

/// Micro name of the aggregate row.
pub const ALL_MICROS: &str = "ALL";

/// Node id to the number of results it occurs in.
pub type NodeCounts = BTreeMap<FunctionId, usize>;

/// Which of the three node sets of a [`NodeResult`] to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodesSelector {
    System,
    Micro,
    Overlapping,
}

/// Overlap of one micro (or the aggregate of all micros) with a system.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NodeResult {
    pub system_name: String,
    /// Micro graph key, or [`ALL_MICROS`] for the aggregate.
    pub micro_name: String,
    pub system_nodes: NodeCounts,
    pub micro_nodes: NodeCounts,
    pub overlapping_nodes: NodeCounts,
    /// `|overlapping| / |system|`, 0 for an empty system set.
    pub overlapping_perc: f64,
}

impl NodeResult {
    pub fn new(system_name: impl Into<String>, micro_name: impl Into<String>) -> Self {
        Self { system_name: system_name.into(), micro_name: micro_name.into(), ..Self::default() }
    }

    pub fn calc_perc(&mut self) {
        self.overlapping_perc = if self.system_nodes.is_empty() {
            0.0
        } else {
            self.overlapping_nodes.len() as f64 / self.system_nodes.len() as f64
        };
    }

    /// Add the per-node counts of `other` to this result.
    pub fn add_result(&mut self, other: &NodeResult) {
        merge_counts(&mut self.system_nodes, &other.system_nodes);
        merge_counts(&mut self.micro_nodes, &other.micro_nodes);
        merge_counts(&mut self.overlapping_nodes, &other.overlapping_nodes);
    }

    pub fn nodes(&self, sel: NodesSelector) -> &NodeCounts {
        match sel {
            NodesSelector::System => &self.system_nodes,
            NodesSelector::Micro => &self.micro_nodes,
            NodesSelector::Overlapping => &self.overlapping_nodes,
        }
    }
}

fn merge_counts(into: &mut NodeCounts, from: &NodeCounts) {
    for (id, count) in from {
        *into.entry(*id).or_insert(0) += count;
    }
}

/// Overlaps of one system benchmark with each of its micros.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SystemOverlap {
    pub name: String,
    /// Keyed like [`CgResult::micro_cgs`].
    pub micros: BTreeMap<String, NodeResult>,
    pub total: NodeResult,
}

/// Nodes of `graph` with count 1, restricted to project functions when
/// `project_only` is set.
pub fn valid_nodes(
    graph: &CallGraph,
    projects: &ProjectPrefixes,
    project_only: bool,
) -> NodeCounts {
    graph
        .functions()
        .filter(|f| !project_only || projects.matches(&f.name))
        .map(|f| (f.id, 1))
        .collect()
}

/// Overlap of a single micro graph with the system graph.
pub fn micro_overlap(
    projects: &ProjectPrefixes,
    system: &str,
    micro: &str,
    system_cg: &CallGraph,
    micro_cg: &CallGraph,
    project_only: bool,
) -> NodeResult {
    let system_nodes = valid_nodes(system_cg, projects, project_only);
    let micro_nodes = valid_nodes(micro_cg, projects, project_only);
    let overlapping_nodes =
        system_nodes.keys().filter(|id| micro_nodes.contains_key(id)).map(|id| (*id, 1)).collect();

    let mut res = NodeResult {
        system_name: system.to_string(),
        micro_name: micro.to_string(),
        system_nodes,
        micro_nodes,
        overlapping_nodes,
        overlapping_perc: 0.0,
    };
    res.calc_perc();
    res
}

/// Overlap of the system graph of `cg_res` with each of its micros.
pub fn structural(
    projects: &ProjectPrefixes,
    cg_res: &CgResult,
    project_only: bool,
) -> SystemOverlap {
    let mut total = NodeResult::new(&cg_res.system, ALL_MICROS);
    let mut micros = BTreeMap::new();

    for (key, micro_cg) in &cg_res.micro_cgs {
        let res =
            micro_overlap(projects, &cg_res.system, key, &cg_res.system_cg, micro_cg, project_only);
        total.add_result(&res);
        micros.insert(key.clone(), res);
    }
    total.calc_perc();

    SystemOverlap { name: cg_res.system.clone(), micros, total }
}

/// [`structural`] for every result; index `i` of the output belongs to
/// `cg_res[i]`.
pub fn structurals(
    projects: &ProjectPrefixes,
    cg_res: &[CgResult],
    project_only: bool,
) -> Vec<SystemOverlap> {
    cg_res.iter().map(|res| structural(projects, res, project_only)).collect()
}

/// Excludes functions covered by at least one micro of `overlaps`.
pub fn is_overlapping(overlaps: &SystemOverlap) -> Exclusion<'_> {
    Exclusion::new(move |f, _| overlaps.total.overlapping_nodes.contains_key(&f.id))
}
