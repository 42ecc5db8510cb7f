//! Recommendation of new functions to benchmark.
//!
//! Candidates are project functions of the system graph that no micro covers
//! yet. Each candidate is scored by what it reaches: uncovered project
//! functions first, then its distance from the graph roots, then the number of
//! reachable non-project functions, then its name. The greedy loop picks the
//! best candidate and removes everything it reaches from the others.

mod write;

use std::cmp::Ordering;
use std::ops::ControlFlow;

use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::graph::{
    bfs_walk, levels, reachable_subgraph, root_nodes, CallGraph, Exclusion, ProjectPrefixes,
};
use crate::loader::CgResult;
use crate::model::Function;
use crate::overlap::{is_overlapping, SystemOverlap};
use crate::profile::FILE_NAME_SEPARATOR;
use crate::sets::{self, IdSet};

pub use write::{write_all, RECOMMENDATION_HEADER};

/// Key prefix of the micro graphs synthesized for recommendations.
pub const REC_BENCH_PREFIX: &str = "rec-bench";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RecommendError {
    #[error("Got {results} call graph results but {overlaps} overlaps")]
    LengthMismatch { results: usize, overlaps: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecommendedFunction {
    pub function: Function,
    /// Project functions this recommendation covers that earlier ones did not.
    pub additional_nodes: usize,
}

/// Picks up to `count` functions of the system graph worth benchmarking.
pub trait RecommendationStrategy {
    fn recommend(
        &self,
        projects: &ProjectPrefixes,
        cg_res: &CgResult,
        overlaps: &SystemOverlap,
        count: usize,
    ) -> Vec<RecommendedFunction>;
}

impl<F> RecommendationStrategy for F
where
    F: Fn(&ProjectPrefixes, &CgResult, &SystemOverlap, usize) -> Vec<RecommendedFunction>,
{
    fn recommend(
        &self,
        projects: &ProjectPrefixes,
        cg_res: &CgResult,
        overlaps: &SystemOverlap,
        count: usize,
    ) -> Vec<RecommendedFunction> {
        self(projects, cg_res, overlaps, count)
    }
}

/// The reachability greedy-additional strategy; see [`greedy_additional`].
#[derive(Debug, Clone, Copy, Default)]
pub struct GreedyAdditional;

impl RecommendationStrategy for GreedyAdditional {
    fn recommend(
        &self,
        projects: &ProjectPrefixes,
        cg_res: &CgResult,
        overlaps: &SystemOverlap,
        count: usize,
    ) -> Vec<RecommendedFunction> {
        greedy_additional(projects, cg_res, overlaps, count)
    }
}

#[derive(Debug, Clone)]
struct Reachability {
    function: Function,
    level: usize,
    reachable_project: IdSet,
    reachable_other: IdSet,
}

impl Reachability {
    /// Best candidate first.
    fn rank(&self, other: &Self) -> Ordering {
        other
            .reachable_project
            .len()
            .cmp(&self.reachable_project.len())
            .then_with(|| self.level.cmp(&other.level))
            .then_with(|| other.reachable_other.len().cmp(&self.reachable_other.len()))
            .then_with(|| self.function.name.cmp(&other.function.name))
    }

    /// Remove what `chosen` already covers.
    fn subtract(mut self, chosen: &Reachability) -> Self {
        let covered = sets::union(&chosen.reachable_project, &IdSet::from([chosen.function.id]));
        self.reachable_project = sets::complement(&self.reachable_project, &covered);
        self.reachable_other = sets::complement(&self.reachable_other, &chosen.reachable_other);
        self
    }
}

/// Greedy recommendation by additional reachable project functions.
pub fn greedy_additional(
    projects: &ProjectPrefixes,
    cg_res: &CgResult,
    overlaps: &SystemOverlap,
    count: usize,
) -> Vec<RecommendedFunction> {
    let graph = &cg_res.system_cg;
    let is_project = Exclusion::is_projects(projects);
    let is_ovl = is_overlapping(overlaps);

    let mut remaining: Vec<Reachability> = graph
        .functions()
        .filter(|f| is_project.excludes(f, None) && !is_ovl.excludes(f, None))
        .map(|f| reachability(graph, f, &is_project, &is_ovl))
        .collect();

    let outside = (!Exclusion::is_projects(projects)).or(is_overlapping(overlaps));
    let node_levels = levels(graph, &root_nodes(graph), &outside);
    for r in &mut remaining {
        r.level = node_levels.level(r.function.id).unwrap_or(usize::MAX);
    }

    let mut recommended = Vec::with_capacity(count.min(remaining.len()));
    while recommended.len() < count && !remaining.is_empty() {
        remaining.sort_by(Reachability::rank);
        let chosen = remaining.remove(0);
        if chosen.reachable_project.is_empty() {
            break;
        }
        debug!(
            function = %chosen.function.name,
            additional = chosen.reachable_project.len(),
            level = chosen.level,
            "recommended function"
        );

        remaining = remaining
            .into_iter()
            .filter(|r| !chosen.reachable_project.contains(&r.function.id))
            .map(|r| r.subtract(&chosen))
            .collect();
        recommended.push(RecommendedFunction {
            additional_nodes: chosen.reachable_project.len(),
            function: chosen.function,
        });
    }

    recommended
}

fn reachability(
    graph: &CallGraph,
    start: &Function,
    is_project: &Exclusion<'_>,
    excluded: &Exclusion<'_>,
) -> Reachability {
    let mut reachable_project = IdSet::new();
    let mut reachable_other = IdSet::new();

    bfs_walk(graph, start.id, |f, depth| {
        if !excluded.excludes(f, Some(depth)) {
            if is_project.excludes(f, Some(depth)) {
                reachable_project.insert(f.id);
            } else {
                reachable_other.insert(f.id);
            }
        }
        ControlFlow::Continue(())
    });

    Reachability { function: start.clone(), level: 0, reachable_project, reachable_other }
}

/// Outcome of recommending for one configuration.
#[derive(Debug, Clone)]
pub struct RecommendationResult {
    /// Copy of the input with one synthesized micro per recommendation.
    pub cg: CgResult,
    pub recommended: Vec<RecommendedFunction>,
    /// The count that was asked for; `recommended` may be shorter.
    pub requested: usize,
}

/// Micro key of the graph synthesized for `function` under `cg_res`'s config.
pub fn rec_bench_key(cg_res: &CgResult, function: &Function) -> String {
    format!(
        "{REC_BENCH_PREFIX}_{}_{}{FILE_NAME_SEPARATOR}{}",
        function.id,
        function.name,
        cg_res.config.file_suffix()
    )
}

/// Run `strategy` and add the reachable subgraph of every recommended
/// function to a copy of `cg_res` as a micro graph.
pub fn apply(
    projects: &ProjectPrefixes,
    cg_res: &CgResult,
    overlaps: &SystemOverlap,
    strategy: &dyn RecommendationStrategy,
    count: usize,
) -> RecommendationResult {
    let recommended = strategy.recommend(projects, cg_res, overlaps, count);

    let mut cg = cg_res.clone();
    for rec in &recommended {
        let sub = reachable_subgraph(&cg_res.system_cg, rec.function.id);
        cg.micro_cgs.insert(rec_bench_key(cg_res, &rec.function), sub);
    }

    RecommendationResult { cg, recommended, requested: count }
}

/// [`apply`] pairwise over `cg_res` and `overlaps`.
pub fn apply_all(
    projects: &ProjectPrefixes,
    cg_res: &[CgResult],
    overlaps: &[SystemOverlap],
    strategy: &dyn RecommendationStrategy,
    count: usize,
) -> Result<Vec<RecommendationResult>, RecommendError> {
    if cg_res.len() != overlaps.len() {
        return Err(RecommendError::LengthMismatch {
            results: cg_res.len(),
            overlaps: overlaps.len(),
        });
    }

    Ok(cg_res
        .iter()
        .zip(overlaps)
        .map(|(res, ovl)| apply(projects, res, ovl, strategy, count))
        .collect())
}
