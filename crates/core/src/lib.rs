//! cgscope-core
//!
//! Call-graph analysis of benchmark suites. System and micro benchmark
//! profiles, rendered by pprof into DOT files, are parsed into weighted call
//! graphs that share one function-id space per rendering configuration.
//!
//! On top of those graphs the crate computes:
//! - structural overlap between the system graph and each micro graph,
//! - a minimized micro suite covering the same project functions,
//! - recommendations of new functions worth benchmarking.
//!
//! All logic lives here so the CLI stays a thin argument-and-file layer.

pub mod dot;
pub mod graph;
pub mod loader;
pub mod minimize;
pub mod model;
pub mod overlap;
pub mod profile;
pub mod recommend;
pub mod report;
pub mod sets;

/// Returns the library version as encoded at compile time.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
