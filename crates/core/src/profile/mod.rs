//! Profile rendering configurations and their filename encoding.
//!
//! DOT files produced from pprof profiles carry the configuration they were
//! rendered with in their name:
//!
//! ```text
//! <name>__<node-count>__<node-fraction>__<edge-fraction>.<type>
//! benchX__100000__0_00500__0_00100.dot
//! ```
//!
//! Fractions use `_` instead of `.` so the name keeps a single extension dot.

mod duration;

use std::fmt;
use std::num::{ParseFloatError, ParseIntError};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use duration::{parse_duration, DurationError};

/// Separator between the name and each configuration component.
pub const FILE_NAME_SEPARATOR: &str = "__";

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Could not parse '{file_name}': expected at least 4 '__'-separated parts, got {found}")]
    TooFewParts { file_name: String, found: usize },
    #[error("Could not parse node count in '{file_name}': {source}")]
    NodeCount { file_name: String, source: ParseIntError },
    #[error("Could not parse node fraction in '{file_name}': {source}")]
    NodeFraction { file_name: String, source: ParseFloatError },
    #[error("Could not parse edge fraction in '{file_name}': {source}")]
    EdgeFraction { file_name: String, source: ParseFloatError },
    #[error("Missing output type extension in '{0}'")]
    MissingExtension(String),
    #[error("Invalid output type '{0}'")]
    UnknownOutType(String),
}

/// Output format pprof rendered the profile into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutType {
    Dot,
    Svg,
    Text,
    Gv,
    Ps,
    Gif,
}

impl OutType {
    pub fn name(self) -> &'static str {
        match self {
            OutType::Dot => "dot",
            OutType::Svg => "svg",
            OutType::Text => "text",
            OutType::Gv => "gv",
            OutType::Ps => "ps",
            OutType::Gif => "gif",
        }
    }
}

impl FromStr for OutType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dot" => Ok(OutType::Dot),
            "svg" => Ok(OutType::Svg),
            "text" => Ok(OutType::Text),
            "gv" => Ok(OutType::Gv),
            "ps" => Ok(OutType::Ps),
            "gif" => Ok(OutType::Gif),
            other => Err(ConfigError::UnknownOutType(other.to_string())),
        }
    }
}

impl fmt::Display for OutType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Configuration a profile was rendered with. Equal iff all four fields are.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OutConfig {
    pub out_type: OutType,
    /// Keep the `node_count` most important nodes.
    pub node_count: usize,
    /// Drop nodes below this fraction of the total.
    pub node_fraction: f64,
    /// Drop edges below this fraction of the total.
    pub edge_fraction: f64,
}

impl OutConfig {
    /// The `<nc>__<nf>__<ef>.<type>` tail shared by every file of this config.
    pub fn file_suffix(&self) -> String {
        let body = format!(
            "{}{sep}{:.5}{sep}{:.5}",
            self.node_count,
            self.node_fraction,
            self.edge_fraction,
            sep = FILE_NAME_SEPARATOR
        )
        .replace('.', "_");
        format!("{}.{}", body, self.out_type.name())
    }
}

impl fmt::Display for OutConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "type={} node_count={} node_fraction={:.5} edge_fraction={:.5}",
            self.out_type, self.node_count, self.node_fraction, self.edge_fraction
        )
    }
}

/// Split a file name into its base name and rendering configuration.
pub fn parse_file_name_config(file_name: &str) -> Result<(String, OutConfig), ConfigError> {
    let parts: Vec<&str> = file_name.split(FILE_NAME_SEPARATOR).collect();
    let n = parts.len();
    if n < 4 {
        return Err(ConfigError::TooFewParts { file_name: file_name.to_string(), found: n });
    }

    let node_count = parts[n - 3]
        .parse::<usize>()
        .map_err(|source| ConfigError::NodeCount { file_name: file_name.to_string(), source })?;

    let node_fraction = parts[n - 2]
        .replace('_', ".")
        .parse::<f64>()
        .map_err(|source| ConfigError::NodeFraction { file_name: file_name.to_string(), source })?;

    let last = parts[n - 1];
    let (edge_text, ext) =
        last.rsplit_once('.').ok_or_else(|| ConfigError::MissingExtension(file_name.to_string()))?;
    let edge_fraction = edge_text
        .replace('_', ".")
        .parse::<f64>()
        .map_err(|source| ConfigError::EdgeFraction { file_name: file_name.to_string(), source })?;

    let out_type = ext.parse::<OutType>()?;

    Ok((
        parts[..n - 3].join(FILE_NAME_SEPARATOR),
        OutConfig { out_type, node_count, node_fraction, edge_fraction },
    ))
}
