//! Node predicates used to filter traversals and candidate sets.

use std::fmt;
use std::ops::Not;

use serde::{Deserialize, Serialize};

use crate::model::Function;

/// Comma-separated list of function-name prefixes identifying the project
/// under study (as opposed to third-party or runtime code).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProjectPrefixes(Vec<String>);

impl ProjectPrefixes {
    pub fn new<I, S>(prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(prefixes.into_iter().map(Into::into).collect())
    }

    /// Split a comma-separated argument. Entries are kept verbatim, so an
    /// empty entry matches every function.
    pub fn parse(arg: &str) -> Self {
        Self::new(arg.split(','))
    }

    pub fn matches(&self, name: &str) -> bool {
        self.0.iter().any(|p| name.starts_with(p.as_str()))
    }

    /// The prefixes joined back with `,` (the `project` CSV column).
    pub fn joined(&self) -> String {
        self.0.join(",")
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for ProjectPrefixes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.joined())
    }
}

type Predicate<'a> = dyn Fn(&Function, Option<usize>) -> bool + 'a;

/// Predicate over `(function, level)`; `true` means "exclude".
///
/// The level is the BFS depth when evaluated inside a traversal and `None`
/// everywhere else.
pub struct Exclusion<'a> {
    predicate: Box<Predicate<'a>>,
}

impl<'a> Exclusion<'a> {
    pub fn new(predicate: impl Fn(&Function, Option<usize>) -> bool + 'a) -> Self {
        Self { predicate: Box::new(predicate) }
    }

    /// Excludes nothing.
    pub fn nothing() -> Self {
        Self::new(|_, _| false)
    }

    /// True for functions whose name starts with any of `prefixes`.
    pub fn is_projects(prefixes: &'a ProjectPrefixes) -> Self {
        Self::new(move |f, _| prefixes.matches(&f.name))
    }

    pub fn excludes(&self, function: &Function, level: Option<usize>) -> bool {
        (self.predicate)(function, level)
    }

    pub fn and(self, other: Exclusion<'a>) -> Self {
        Self::new(move |f, l| self.excludes(f, l) && other.excludes(f, l))
    }

    pub fn or(self, other: Exclusion<'a>) -> Self {
        Self::new(move |f, l| self.excludes(f, l) || other.excludes(f, l))
    }
}

impl<'a> Not for Exclusion<'a> {
    type Output = Exclusion<'a>;

    fn not(self) -> Self::Output {
        Exclusion::new(move |f, l| !self.excludes(f, l))
    }
}

impl fmt::Debug for Exclusion<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Exclusion(..)")
    }
}
