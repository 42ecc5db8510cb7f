//! Set helpers over function ids.
//!
//! `BTreeSet` keeps iteration ordered, which keeps every greedy loop built on
//! top of these sets reproducible.

use std::collections::BTreeSet;

use crate::model::FunctionId;

pub type IdSet = BTreeSet<FunctionId>;

pub fn union(a: &IdSet, b: &IdSet) -> IdSet {
    a.union(b).copied().collect()
}

/// Elements of `a` that are not in `b`.
pub fn complement(a: &IdSet, b: &IdSet) -> IdSet {
    a.difference(b).copied().collect()
}
