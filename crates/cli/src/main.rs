use std::process::ExitCode;

use anyhow::Result;
use cgscope::commands::{
    minimization_command, overlap_command, print_summary, recommendation_command,
};
use cgscope::{exit_code, parse_counts, AnalysisConfig};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// Call-graph analysis of benchmark suites.
///
/// Reads pprof-rendered DOT files of a system benchmark and its
/// microbenchmarks and writes `;`-separated CSV reports. All analysis lives
/// in `cgscope_core`.
#[derive(Parser, Debug)]
#[command(
    name = "cgscope",
    version,
    about = "Call-graph overlap, minimization and recommendation for benchmark suites",
    long_about = None
)]
struct Cli {
    /// Print a JSON run summary instead of human-readable text.
    #[arg(long, global = true, default_value_t = false)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct DirArgs {
    /// Project function-name prefixes, comma-separated (e.g. `github.com/org/proj`).
    projects: String,

    /// Directory with the system benchmark DOT files.
    system_dir: String,

    /// Directory with the microbenchmark DOT files.
    micro_dir: String,

    /// Directory the CSV reports are written to.
    out_dir: String,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Structural node overlap between the system benchmark and each microbenchmark.
    ///
    /// Writes `struct_node_overlap.csv`.
    Overlap(DirArgs),

    /// Minimize the microbenchmark suite with the greedy strategies.
    ///
    /// Writes `<scenario>_minFile_<strategy>.csv` and
    /// `<scenario>_struct_node_overlap_mins-<strategy>.csv` per strategy.
    #[command(alias = "minimize")]
    Minimization(DirArgs),

    /// Recommend new functions to benchmark.
    ///
    /// Writes `<scenario>_recFile_recs-<n>.csv` and
    /// `<scenario>_struct_node_overlap_recs-<n>.csv` per requested count.
    #[command(alias = "recommend")]
    Recommendation {
        #[command(flatten)]
        dirs: DirArgs,

        /// Comma-separated numbers of functions to recommend (e.g. `5,10,20`).
        #[arg(allow_hyphen_values = true)]
        counts: String,
    },
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::from(exit_code(&err))
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let summary = match cli.command {
        Command::Overlap(dirs) => overlap_command(&config_from(&dirs)?)?,
        Command::Minimization(dirs) => minimization_command(&config_from(&dirs)?)?,
        Command::Recommendation { dirs, counts } => {
            let config = config_from(&dirs)?;
            let counts = parse_counts(&counts)?;
            recommendation_command(&config, &counts)?
        }
    };

    print_summary(&summary, cli.json)
}

fn config_from(dirs: &DirArgs) -> Result<AnalysisConfig> {
    let DirArgs { projects, system_dir, micro_dir, out_dir } = dirs;
    Ok(AnalysisConfig::from_args(projects, system_dir, micro_dir, out_dir)?)
}

/// Log to stderr; `RUST_LOG` overrides the default `info` level.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}
