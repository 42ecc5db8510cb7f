//! Core data model for call-graph analysis.
//!
//! This module contains:
//! - `FunctionId`: dense integer identity handed out by an [`Ider`].
//! - `Function`: a call-graph node with self and cumulative time.
//! - `Call`: a weighted, directed call edge.
//! - `Ider`: the name registry shared by every graph built in one run.

mod ider;

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

pub use ider::{Ider, IderError};

/// Stable identity of a function within one analysis run.
///
/// Two functions with the same (trimmed) name always share the same id as long
/// as they were registered with the same [`Ider`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FunctionId(pub i64);

impl fmt::Display for FunctionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A call-graph node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Function {
    pub id: FunctionId,
    pub name: String,
    /// Time spent in the function itself (pprof "flat").
    pub self_time: Duration,
    /// Time spent in the function and everything it calls (pprof "cum").
    pub total_time: Duration,
}

impl Function {
    /// Register `name` with `ider` and build a function without timing data.
    pub fn new(ider: &Ider, name: &str) -> Self {
        let name = name.trim();
        Self {
            id: ider.id(name),
            name: name.to_string(),
            self_time: Duration::ZERO,
            total_time: Duration::ZERO,
        }
    }

    pub fn with_times(mut self, self_time: Duration, total_time: Duration) -> Self {
        self.self_time = self_time;
        self.total_time = total_time;
        self
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Function(id={},name={},self={:?},total={:?})",
            self.id, self.name, self.self_time, self.total_time
        )
    }
}

/// A directed call edge weighted by the observed call time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Call {
    pub from: FunctionId,
    pub to: FunctionId,
    pub call_time: Duration,
}

impl Call {
    pub fn new(from: FunctionId, to: FunctionId, call_time: Duration) -> Self {
        Self { from, to, call_time }
    }

    /// Edge weight in nanoseconds.
    pub fn weight(&self) -> f64 {
        self.call_time.as_nanos() as f64
    }
}
