//! Parser for pprof-generated DOT call graphs.
//!
//! Only lines starting with `N` matter; everything else (graph header,
//! legend, subgraphs) is skipped. Two line shapes are understood:
//!
//! ```text
//! N1 [label="pkg\nFunc\n0.05s (1%)\nof 0.20s (4%)" tooltip="pkg.Func (0.20s)"]
//! N1 -> N2 [label=" 0.15s" weight=75 tooltip="pkg.Func -> pkg.Leaf (0.15s)"]
//! ```
//!
//! Dot node ids (`N1`) are local to one file; function identity comes from
//! the shared [`Ider`].

use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, warn};

use crate::graph::{CallGraph, GraphError};
use crate::model::{Call, Function, FunctionId, Ider};
use crate::profile::{parse_duration, DurationError};

#[derive(Debug, Error)]
pub enum DotError {
    #[error("Failed to read dot file {path}: {source}")]
    Io { path: PathBuf, source: io::Error },
    #[error("Invalid dot file {path}, line {line}: {source}")]
    Line { path: PathBuf, line: usize, source: DotLineError },
}

/// Why a single `N...` line could not be turned into a node or an edge.
#[derive(Debug, Error, PartialEq)]
pub enum DotLineError {
    #[error("no attribute list in '{0}'")]
    MissingAttributes(String),
    #[error("no '{0}' attribute")]
    MissingAttribute(&'static str),
    #[error("empty function name in tooltip")]
    EmptyName,
    #[error("label '{label}' of function '{name}' has no timing")]
    MissingTimes { name: String, label: String },
    #[error("could not parse {which} time '{token}' of function '{name}': {source}")]
    FunctionTime { name: String, which: &'static str, token: String, source: DurationError },
    #[error("could not split '{0}' into two endpoints")]
    EdgeEndpoints(String),
    #[error("{role} dot id '{dot_id}' unknown")]
    UnknownEndpoint { role: &'static str, dot_id: String },
    #[error("could not parse call time: {0}")]
    CallTime(#[source] DurationError),
    #[error(transparent)]
    Graph(#[from] GraphError),
}

/// Parse the DOT file at `path`, registering function names with `ider`.
pub fn parse_dot_file(path: &Path, ider: &Ider) -> Result<CallGraph, DotError> {
    let file =
        File::open(path).map_err(|source| DotError::Io { path: path.to_path_buf(), source })?;
    parse_dot(BufReader::new(file), path, ider)
}

/// Parse DOT text held in memory. Errors report the source as `<memory>`.
pub fn parse_dot_str(content: &str, ider: &Ider) -> Result<CallGraph, DotError> {
    parse_dot(content.as_bytes(), Path::new("<memory>"), ider)
}

/// Parse DOT from any buffered reader; `source` is only used in errors and logs.
pub fn parse_dot<R: BufRead>(reader: R, source: &Path, ider: &Ider) -> Result<CallGraph, DotError> {
    let mut graph = CallGraph::new();
    let mut dot_ids: HashMap<String, FunctionId> = HashMap::new();

    for (idx, line) in reader.lines().enumerate() {
        let line_no = idx + 1;
        let line = line
            .map_err(|source_err| DotError::Io { path: source.to_path_buf(), source: source_err })?;
        parse_line(&line, &mut graph, &mut dot_ids, ider, source, line_no).map_err(|err| {
            DotError::Line { path: source.to_path_buf(), line: line_no, source: err }
        })?;
    }

    Ok(graph)
}

fn parse_line(
    line: &str,
    graph: &mut CallGraph,
    dot_ids: &mut HashMap<String, FunctionId>,
    ider: &Ider,
    source: &Path,
    line_no: usize,
) -> Result<(), DotLineError> {
    if !line.starts_with('N') {
        return Ok(());
    }

    // Generic instantiations are abbreviated as `[…]`/`[...]` in names.
    let line = line.replace("[\u{2026}]", "").replace("[...]", "");
    let (head, args) = line
        .split_once('[')
        .ok_or_else(|| DotLineError::MissingAttributes(line.trim().to_string()))?;
    let head = head.trim();
    let args = args.trim();

    if head.contains("->") {
        let call = call_from(head, args, dot_ids)?;
        graph.set_call(call)?;
        return Ok(());
    }

    if !args.contains("tooltip") {
        warn!(file = %source.display(), line = line_no, "dot node without tooltip; skipped");
        return Ok(());
    }

    let function = function_from(args, ider)?;
    let id = function.id;
    if !graph.add_function(function) {
        debug!(file = %source.display(), line = line_no, %id, "duplicate function; keeping first");
    }
    dot_ids.insert(head.to_string(), id);
    Ok(())
}

fn function_from(args: &str, ider: &Ider) -> Result<Function, DotLineError> {
    let tooltip = attribute(args, "tooltip").ok_or(DotLineError::MissingAttribute("tooltip"))?;
    // pprof appends the cumulative time to the tooltip: `pkg.Func (0.20s)`.
    let name = tooltip.split(' ').next().unwrap_or_default().trim();
    if name.is_empty() {
        return Err(DotLineError::EmptyName);
    }

    let label = attribute(args, "label").ok_or(DotLineError::MissingAttribute("label"))?;
    let (self_time, total_time) = function_times(name, label)?;

    Ok(Function::new(ider, name).with_times(self_time, total_time))
}

/// Self and total time from a node label.
///
/// Internal nodes read `... <self> (<pct>) of <total> (<pct>)`, leaves read
/// `... <time> (<pct>)`.
fn function_times(name: &str, label: &str) -> Result<(Duration, Duration), DotLineError> {
    let text = label.replace("\\n", " ");
    let tokens: Vec<&str> = text.split(' ').collect();
    let n = tokens.len();
    let missing =
        || DotLineError::MissingTimes { name: name.to_string(), label: label.to_string() };

    let parse = |which: &'static str, token: &str| {
        parse_duration(token).map_err(|source| DotLineError::FunctionTime {
            name: name.to_string(),
            which,
            token: token.to_string(),
            source,
        })
    };

    if n >= 4 && tokens[n - 3] == "of" {
        let total = parse("total", tokens[n - 2])?;
        let mut self_token = tokens[n - 4];
        if self_token.starts_with('(') {
            if n < 5 {
                return Err(missing());
            }
            self_token = tokens[n - 5];
        }
        let self_time = parse("self", self_token)?;
        return Ok((self_time, total));
    }

    if n < 2 {
        return Err(missing());
    }
    let time = parse("leaf", tokens[n - 2])?;
    Ok((time, time))
}

fn call_from(
    head: &str,
    args: &str,
    dot_ids: &HashMap<String, FunctionId>,
) -> Result<Call, DotLineError> {
    let endpoints: Vec<&str> = head.split("->").map(str::trim).collect();
    let [from, to] = endpoints[..] else {
        return Err(DotLineError::EdgeEndpoints(head.to_string()));
    };

    let resolve = |role: &'static str, dot_id: &str| {
        dot_ids
            .get(dot_id)
            .copied()
            .ok_or_else(|| DotLineError::UnknownEndpoint { role, dot_id: dot_id.to_string() })
    };
    let from = resolve("from", from)?;
    let to = resolve("to", to)?;

    // label=" 25.55s" or label=" 0.20s\n (inline)"
    let label = attribute(args, "label").ok_or(DotLineError::MissingAttribute("label"))?;
    let text = label.trim().replace("\\n", " ");
    let token = text.split(' ').next().unwrap_or_default();
    let call_time = parse_duration(token).map_err(DotLineError::CallTime)?;

    Ok(Call::new(from, to, call_time))
}

/// Raw value of `name=` in a DOT attribute list.
///
/// Quoted values run to the next unescaped quote; bare values run to the next
/// whitespace, `,` or `]`. Attribute names must match as whole words, so
/// `label` does not match inside `xlabel`.
fn attribute<'a>(args: &'a str, name: &str) -> Option<&'a str> {
    let key = format!("{name}=");
    let start = args.match_indices(&key).find_map(|(pos, _)| {
        let boundary = args[..pos]
            .chars()
            .next_back()
            .map_or(true, |c| c.is_whitespace() || c == ',' || c == '[');
        boundary.then_some(pos + key.len())
    })?;

    let value = &args[start..];
    if let Some(quoted) = value.strip_prefix('"') {
        let mut escaped = false;
        for (i, c) in quoted.char_indices() {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => return Some(&quoted[..i]),
                _ => {}
            }
        }
        Some(quoted)
    } else {
        let end = value
            .find(|c: char| c.is_whitespace() || c == ',' || c == ']')
            .unwrap_or(value.len());
        Some(&value[..end])
    }
}
