//! Micro-benchmark suite minimization as greedy set cover.
//!
//! Each micro contributes the node set picked by a [`NodesSelector`] from its
//! overlap result, minus excluded functions. The micro with the largest set
//! is selected, its nodes are removed from every other set, and the loop
//! repeats until all sets are empty. Ties on set size go to the smaller micro
//! key, so the outcome is reproducible.

mod write;

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::graph::Exclusion;
use crate::loader::CgResult;
use crate::model::FunctionId;
use crate::overlap::{NodesSelector, SystemOverlap};
use crate::sets::{self, IdSet};

pub use write::{write_all, MINIMIZATION_HEADER};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MinimizeError {
    #[error("Got {results} call graph results but {overlaps} overlaps")]
    LengthMismatch { results: usize, overlaps: usize },
    #[error("No call graph for selected micro '{0}'")]
    MissingMicro(String),
}

/// One micro picked by a strategy, in selection order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Selected {
    /// Micro graph key.
    pub benchmark: String,
    /// Nodes this micro covered that no earlier selection did.
    pub additional_nodes: usize,
    /// Summed system self time of the micro's candidate nodes.
    pub app_bench_time: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Strategy {
    /// Cover the micros' own project footprint.
    GreedyMicro,
    /// Cover only what the system benchmark exercises.
    GreedySystem,
}

impl Strategy {
    pub const ALL: [Strategy; 2] = [Strategy::GreedyMicro, Strategy::GreedySystem];

    pub fn name(self) -> &'static str {
        match self {
            Strategy::GreedyMicro => "GreedyMicro",
            Strategy::GreedySystem => "GreedySystem",
        }
    }

    pub fn selector(self) -> NodesSelector {
        match self {
            Strategy::GreedyMicro => NodesSelector::Micro,
            Strategy::GreedySystem => NodesSelector::Overlapping,
        }
    }

    pub fn select(
        self,
        cg_res: &CgResult,
        overlaps: &SystemOverlap,
        excl: &Exclusion<'_>,
    ) -> Vec<Selected> {
        greedy(cg_res, overlaps, self.selector(), excl)
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

pub fn greedy_micro(
    cg_res: &CgResult,
    overlaps: &SystemOverlap,
    excl: &Exclusion<'_>,
) -> Vec<Selected> {
    Strategy::GreedyMicro.select(cg_res, overlaps, excl)
}

pub fn greedy_system(
    cg_res: &CgResult,
    overlaps: &SystemOverlap,
    excl: &Exclusion<'_>,
) -> Vec<Selected> {
    Strategy::GreedySystem.select(cg_res, overlaps, excl)
}

struct Candidate {
    key: String,
    nodes: IdSet,
    app_bench_time: Duration,
}

fn greedy(
    cg_res: &CgResult,
    overlaps: &SystemOverlap,
    sel: NodesSelector,
    excl: &Exclusion<'_>,
) -> Vec<Selected> {
    let mut remaining: Vec<Candidate> = overlaps
        .micros
        .iter()
        .map(|(key, res)| candidate(cg_res, key, res.nodes(sel).keys().copied(), excl))
        .collect();
    let mut selected = Vec::with_capacity(remaining.len());
    let mut covered = IdSet::new();

    loop {
        remaining
            .sort_by(|a, b| b.nodes.len().cmp(&a.nodes.len()).then_with(|| a.key.cmp(&b.key)));
        if remaining.first().map_or(true, |c| c.nodes.is_empty()) {
            break;
        }
        let next = remaining.remove(0);
        debug!(micro = %next.key, additional = next.nodes.len(), "selected micro");

        for other in &mut remaining {
            other.nodes = sets::complement(&other.nodes, &next.nodes);
        }
        covered = sets::union(&covered, &next.nodes);
        selected.push(Selected {
            benchmark: next.key,
            additional_nodes: next.nodes.len(),
            app_bench_time: next.app_bench_time,
        });
    }

    debug!(micros = selected.len(), covered = covered.len(), "minimized micro suite");
    selected
}

fn candidate(
    cg_res: &CgResult,
    key: &str,
    ids: impl Iterator<Item = FunctionId>,
    excl: &Exclusion<'_>,
) -> Candidate {
    let micro_cg = cg_res.micro_cgs.get(key);
    let mut nodes = IdSet::new();
    let mut app_bench_time = Duration::ZERO;

    for id in ids {
        // System-only nodes are not part of the micro graph.
        let function = micro_cg
            .and_then(|g| g.function(id))
            .or_else(|| cg_res.system_cg.function(id));
        let Some(function) = function else {
            continue;
        };
        if excl.excludes(function, None) {
            continue;
        }
        nodes.insert(id);
        if let Some(system_fn) = cg_res.system_cg.function(id) {
            app_bench_time += system_fn.self_time;
        }
    }

    Candidate { key: key.to_string(), nodes, app_bench_time }
}

/// Outcome of minimizing one configuration.
#[derive(Debug, Clone)]
pub struct MinimizationResult {
    /// Copy of the input keeping only the selected micros.
    pub cg: CgResult,
    pub selected: Vec<Selected>,
}

/// Run `strategy` and build the minimized copy of `cg_res`.
pub fn apply(
    cg_res: &CgResult,
    overlaps: &SystemOverlap,
    strategy: Strategy,
    excl: &Exclusion<'_>,
) -> Result<MinimizationResult, MinimizeError> {
    let selected = strategy.select(cg_res, overlaps, excl);

    let mut micros = BTreeMap::new();
    for sel in &selected {
        let cg = cg_res
            .micro_cgs
            .get(&sel.benchmark)
            .ok_or_else(|| MinimizeError::MissingMicro(sel.benchmark.clone()))?;
        micros.insert(sel.benchmark.clone(), cg.clone());
    }

    Ok(MinimizationResult { cg: cg_res.with_micros(micros), selected })
}

/// [`apply`] pairwise over `cg_res` and `overlaps`.
pub fn apply_all(
    cg_res: &[CgResult],
    overlaps: &[SystemOverlap],
    strategy: Strategy,
    excl: &Exclusion<'_>,
) -> Result<Vec<MinimizationResult>, MinimizeError> {
    if cg_res.len() != overlaps.len() {
        return Err(MinimizeError::LengthMismatch {
            results: cg_res.len(),
            overlaps: overlaps.len(),
        });
    }

    cg_res.iter().zip(overlaps).map(|(res, ovl)| apply(res, ovl, strategy, excl)).collect()
}
