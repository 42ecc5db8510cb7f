use std::fs::{File, OpenOptions};
use std::path::Path;

use anyhow::{Context, Result};
use cgscope_core::loader::{load_system_micro, CgResult};
use tracing::info;

use crate::{AnalysisConfig, RunSummary};

/// Load one call-graph result per rendering configuration of `config`.
pub fn load_results(config: &AnalysisConfig) -> Result<Vec<CgResult>> {
    let results = load_system_micro(&config.system_dir, &config.micro_dir).with_context(|| {
        format!(
            "Failed to load call graphs from {} and {}",
            config.system_dir.display(),
            config.micro_dir.display()
        )
    })?;
    info!(configs = results.len(), "loaded call graphs");
    Ok(results)
}

/// Open a CSV output file. A fresh file (truncating any previous one) when
/// `fresh` is set, otherwise append to it.
pub fn open_output(path: &Path, fresh: bool) -> Result<File> {
    let mut options = OpenOptions::new();
    options.create(true);
    if fresh {
        options.write(true).truncate(true);
    } else {
        options.append(true);
    }
    options.open(path).with_context(|| format!("Failed to open output file {}", path.display()))
}

/// Print the run summary as text or, with `json`, as pretty JSON.
pub fn print_summary(summary: &RunSummary, json: bool) -> Result<()> {
    if json {
        let serialized = serde_json::to_string_pretty(summary)
            .context("Failed to serialize run summary to JSON")?;
        println!("{}", serialized);
        return Ok(());
    }

    println!("Finished {} for scenario '{}'", summary.command, summary.config.scenario);
    println!("  Projects: {}", summary.config.projects);
    println!("  Configs: {}", summary.configs);
    println!("Files ({}):", summary.files.len());
    if summary.files.is_empty() {
        println!("  (none)");
    }
    for file in &summary.files {
        println!("  - {}", file.display());
    }

    Ok(())
}
