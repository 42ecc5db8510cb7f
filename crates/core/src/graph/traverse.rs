//! Root enumeration, breadth-first walks, and per-node BFS levels.

use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use std::ops::ControlFlow;

use crate::graph::{CallGraph, Exclusion};
use crate::model::{Function, FunctionId};

/// Functions without callers, in graph insertion order.
pub fn root_nodes(graph: &CallGraph) -> Vec<FunctionId> {
    graph.functions().filter(|f| graph.callers(f.id).next().is_none()).map(|f| f.id).collect()
}

/// Breadth-first walk from `start`, calling `visit` once per reachable
/// function with its depth (0 for `start`).
///
/// The walk stops early when `visit` breaks; the function it broke on is
/// returned. Returns `None` when the walk ran to completion or `start` is not
/// in the graph.
pub fn bfs_walk<F>(graph: &CallGraph, start: FunctionId, mut visit: F) -> Option<FunctionId>
where
    F: FnMut(&Function, usize) -> ControlFlow<()>,
{
    graph.function(start)?;

    let mut seen = HashSet::from([start]);
    let mut queue = VecDeque::from([(start, 0usize)]);

    while let Some((id, depth)) = queue.pop_front() {
        let Some(function) = graph.function(id) else {
            continue;
        };
        if visit(function, depth).is_break() {
            return Some(id);
        }
        for callee in graph.callees(id) {
            if seen.insert(callee) {
                queue.push_back((callee, depth + 1));
            }
        }
    }

    None
}

/// Shortest BFS distance of every non-excluded function from a set of roots.
///
/// The three fields are views of the same data. Excluded functions are walked
/// through but never recorded. Each function appears once, at its minimum
/// level over all roots.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeLevels {
    /// `slice[level]` holds the functions at that level, sorted by id.
    pub slice: Vec<Vec<FunctionId>>,
    pub level_to_nodes: BTreeMap<usize, Vec<FunctionId>>,
    pub node_to_level: HashMap<FunctionId, usize>,
}

impl NodeLevels {
    pub fn level(&self, id: FunctionId) -> Option<usize> {
        self.node_to_level.get(&id).copied()
    }

    pub fn depth(&self) -> usize {
        self.slice.len()
    }
}

/// Multi-source BFS from `roots`; see [`NodeLevels`].
pub fn levels(graph: &CallGraph, roots: &[FunctionId], exclude: &Exclusion<'_>) -> NodeLevels {
    let mut node_to_level: HashMap<FunctionId, usize> = HashMap::new();
    let mut max_depth: Option<usize> = None;

    for root in roots {
        bfs_walk(graph, *root, |f, depth| {
            max_depth = Some(max_depth.map_or(depth, |m| m.max(depth)));
            if !exclude.excludes(f, Some(depth)) {
                node_to_level
                    .entry(f.id)
                    .and_modify(|level| *level = (*level).min(depth))
                    .or_insert(depth);
            }
            ControlFlow::Continue(())
        });
    }

    let Some(max_depth) = max_depth else {
        return NodeLevels::default();
    };

    let mut slice = vec![Vec::new(); max_depth + 1];
    for (id, level) in &node_to_level {
        slice[*level].push(*id);
    }
    for nodes in &mut slice {
        nodes.sort();
    }
    let level_to_nodes = slice.iter().cloned().enumerate().collect();

    NodeLevels { slice, level_to_nodes, node_to_level }
}

/// Subgraph of everything reachable from `start`, including every call
/// between reachable functions. Empty when `start` is not in the graph.
pub fn reachable_subgraph(graph: &CallGraph, start: FunctionId) -> CallGraph {
    let mut sub = CallGraph::new();
    let mut order = Vec::new();

    bfs_walk(graph, start, |f, _| {
        sub.add_function(f.clone());
        order.push(f.id);
        ControlFlow::Continue(())
    });

    for id in order {
        for call in graph.calls_from(id) {
            // Every callee of a reachable function is itself reachable.
            let _ = sub.set_call(*call);
        }
    }

    sub
}
