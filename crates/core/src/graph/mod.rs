//! Weighted directed call graphs and the traversals built on them.
//!
//! A [`CallGraph`] stores [`Function`] nodes and [`Call`] edges in a petgraph
//! `DiGraph`, plus a constant-time map from [`FunctionId`] to node index.
//! Nodes are homogeneous, so no downcasting is ever needed.

pub mod exclusion;
pub mod traverse;

use std::collections::HashMap;
use std::time::Duration;

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use thiserror::Error;

use crate::model::{Call, Function, FunctionId};

pub use exclusion::{Exclusion, ProjectPrefixes};
pub use traverse::{bfs_walk, levels, reachable_subgraph, root_nodes, NodeLevels};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GraphError {
    #[error("Call endpoint {role} (id {id}) is not a node of the graph")]
    MissingEndpoint { role: &'static str, id: FunctionId },
}

/// Weighted-simple directed call graph: at most one edge per ordered pair.
/// Self-loops and cycles are allowed.
#[derive(Debug, Clone, Default)]
pub struct CallGraph {
    graph: DiGraph<Function, Call>,
    index: HashMap<FunctionId, NodeIndex>,
}

impl CallGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `function` unless a node with the same id exists.
    ///
    /// Returns `false` (and keeps the existing node) on an id collision.
    pub fn add_function(&mut self, function: Function) -> bool {
        if self.index.contains_key(&function.id) {
            return false;
        }
        let id = function.id;
        let idx = self.graph.add_node(function);
        self.index.insert(id, idx);
        true
    }

    /// Set the edge `from -> to`, replacing the weight of an existing edge.
    pub fn set_call(&mut self, call: Call) -> Result<(), GraphError> {
        let from = self.node_index(call.from, "from")?;
        let to = self.node_index(call.to, "to")?;
        self.graph.update_edge(from, to, call);
        Ok(())
    }

    pub fn add_call(
        &mut self,
        from: FunctionId,
        to: FunctionId,
        call_time: Duration,
    ) -> Result<(), GraphError> {
        self.set_call(Call::new(from, to, call_time))
    }

    pub fn function(&self, id: FunctionId) -> Option<&Function> {
        self.index.get(&id).map(|idx| &self.graph[*idx])
    }

    pub fn contains(&self, id: FunctionId) -> bool {
        self.index.contains_key(&id)
    }

    /// All functions, in insertion order.
    pub fn functions(&self) -> impl Iterator<Item = &Function> + '_ {
        self.graph.node_weights()
    }

    pub fn calls(&self) -> impl Iterator<Item = &Call> + '_ {
        self.graph.edge_weights()
    }

    pub fn call(&self, from: FunctionId, to: FunctionId) -> Option<&Call> {
        let from = *self.index.get(&from)?;
        let to = *self.index.get(&to)?;
        self.graph.find_edge(from, to).map(|e| &self.graph[e])
    }

    /// Functions called by `id`.
    pub fn callees(&self, id: FunctionId) -> impl Iterator<Item = FunctionId> + '_ {
        self.neighbors(id, Direction::Outgoing)
    }

    /// Functions calling `id`.
    pub fn callers(&self, id: FunctionId) -> impl Iterator<Item = FunctionId> + '_ {
        self.neighbors(id, Direction::Incoming)
    }

    /// Outgoing calls of `id`.
    pub fn calls_from(&self, id: FunctionId) -> impl Iterator<Item = &Call> + '_ {
        self.index
            .get(&id)
            .into_iter()
            .flat_map(move |idx| self.graph.edges_directed(*idx, Direction::Outgoing))
            .map(|e| e.weight())
    }

    pub fn function_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn call_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    fn neighbors(&self, id: FunctionId, dir: Direction) -> impl Iterator<Item = FunctionId> + '_ {
        self.index
            .get(&id)
            .into_iter()
            .flat_map(move |idx| self.graph.neighbors_directed(*idx, dir))
            .map(move |n| self.graph[n].id)
    }

    fn node_index(&self, id: FunctionId, role: &'static str) -> Result<NodeIndex, GraphError> {
        self.index.get(&id).copied().ok_or(GraphError::MissingEndpoint { role, id })
    }
}
