//! `grub`: build, persist and query a food index from the command line.
//!
//! ```text
//! grub --data-dir data/sr28 --snapshot foods.grub build
//! grub --snapshot foods.grub search "cheddar cheese"
//! grub --snapshot foods.grub nutrients 01009
//! ```
//!
//! Results are printed to stdout as JSON. Logs go to stderr.

mod config;

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use grub_core::{Dataset, FoodIndex, IndexStats, LoadError, SearchHandle, SnapshotError};
use grub_types::{BuildError, ConfigError, SearchError};
use serde::Serialize;
use thiserror::Error;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use config::{ConfigFileError, DemoConfig};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Config file; defaults to ./grub.toml when present.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory holding the SR source files.
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Snapshot file to write on `build` and read otherwise.
    #[arg(long, global = true)]
    snapshot: Option<PathBuf>,

    /// Minimum trigram overlap for a match, in (0, 1].
    #[arg(long, global = true)]
    min_similarity: Option<f64>,

    /// Maximum number of hits returned.
    #[arg(long, global = true)]
    max_results: Option<usize>,

    /// Log filter used when RUST_LOG is unset.
    #[arg(long, global = true)]
    log_filter: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, PartialEq)]
enum Command {
    /// Load the source files, build the index and save the snapshot.
    Build,
    /// Search long descriptions.
    Search { query: String },
    /// Print one food record.
    Food { id: String },
    /// Print the household weights of a food.
    Weights { id: String },
    /// Print the nutrients of a food.
    Nutrients { id: String },
    /// Print index statistics.
    Stats,
}

#[derive(Debug, Error)]
enum DemoError {
    #[error(transparent)]
    Config(#[from] ConfigFileError),
    #[error("invalid search settings: {0}")]
    Settings(#[from] ConfigError),
    #[error("loading source files: {0}")]
    Load(#[from] LoadError),
    #[error("building index: {0}")]
    Build(#[from] BuildError),
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
    #[error(transparent)]
    Query(#[from] SearchError),
    #[error("no food with id {0:?}")]
    UnknownFood(String),
    #[error("writing output: {0}")]
    Output(#[from] serde_json::Error),
    #[error("writing output: {0}")]
    Io(#[from] io::Error),
}

impl Cli {
    /// Layers flag values over the file config.
    fn apply(&self, config: &mut DemoConfig) {
        if let Some(dir) = &self.data_dir {
            config.data_dir = dir.clone();
        }
        if let Some(path) = &self.snapshot {
            config.snapshot = Some(path.clone());
        }
        if let Some(min) = self.min_similarity {
            config.search.min_similarity = min;
        }
        if let Some(max) = self.max_results {
            config.search.max_results = max;
        }
        if let Some(filter) = &self.log_filter {
            config.log_filter = filter.clone();
        }
    }
}

fn init_logging(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn build_index(config: &DemoConfig) -> Result<FoodIndex, DemoError> {
    let index = Dataset::load_dir(&config.data_dir)?.into_index()?;
    Ok(index)
}

/// Prefers the snapshot when one exists, else builds from source files.
fn open_index(config: &DemoConfig) -> Result<FoodIndex, DemoError> {
    match &config.snapshot {
        Some(path) if path.exists() => Ok(FoodIndex::load(path)?),
        _ => {
            info!(data_dir = %config.data_dir.display(), "no snapshot, building from source");
            build_index(config)
        }
    }
}

/// `stats` output: the index counters plus the posting memory estimate.
#[derive(Debug, Serialize)]
struct StatsReport {
    #[serde(flatten)]
    stats: IndexStats,
    postings_memory_bytes: usize,
}

impl From<IndexStats> for StatsReport {
    fn from(stats: IndexStats) -> Self {
        Self {
            stats,
            postings_memory_bytes: stats.postings_memory_bytes(),
        }
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), DemoError> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    serde_json::to_writer_pretty(&mut out, value)?;
    writeln!(out)?;
    Ok(())
}

fn run(cli: Cli) -> Result<(), DemoError> {
    let mut config = DemoConfig::resolve(cli.config.as_deref())?;
    cli.apply(&mut config);
    config.search.validate()?;
    init_logging(&config.log_filter);

    let open = || -> Result<SearchHandle, DemoError> {
        Ok(SearchHandle::with_index(config.search, open_index(&config)?)?)
    };

    match cli.command {
        Command::Build => {
            let index = build_index(&config)?;
            if let Some(path) = &config.snapshot {
                index.save(path)?;
            }
            print_json(&StatsReport::from(index.stats()))
        }
        Command::Search { query } => print_json(&open()?.search(&query)?),
        Command::Food { id } => match open()?.food(&id)? {
            Some(food) => print_json(&food),
            None => Err(DemoError::UnknownFood(id)),
        },
        Command::Weights { id } => print_json(&open()?.weights(&id)?),
        Command::Nutrients { id } => print_json(&open()?.nutrients(&id)?),
        Command::Stats => print_json(&StatsReport::from(open()?.snapshot()?.stats())),
    }
}

fn main() -> ExitCode {
    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn flags_override_file_values() {
        let cli = Cli::try_parse_from([
            "grub",
            "search",
            "cheddar cheese",
            "--max-results",
            "5",
            "--snapshot",
            "foods.grub",
        ])
        .unwrap();
        assert_eq!(
            cli.command,
            Command::Search {
                query: "cheddar cheese".into()
            }
        );

        let mut config = DemoConfig {
            data_dir: PathBuf::from("sr28"),
            ..DemoConfig::default()
        };
        cli.apply(&mut config);

        assert_eq!(config.search.max_results, 5);
        assert_eq!(config.search.min_similarity, 0.70);
        assert_eq!(config.snapshot, Some(PathBuf::from("foods.grub")));
        assert_eq!(config.data_dir, PathBuf::from("sr28"));
    }

    #[test]
    fn stats_report_carries_memory_estimate() {
        let index = grub_core::IndexBuilder::new()
            .record(grub_types::FoodRecord::new("1", "0100", "apple pie", ""))
            .build()
            .unwrap();
        let report = StatsReport::from(index.stats());
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["num_records"], 1);
        assert_eq!(json["num_nutrient_defs"], 0);
        assert_eq!(
            json["postings_memory_bytes"],
            report.stats.postings_memory_bytes()
        );
        assert!(report.postings_memory_bytes > 0);
    }

    #[test]
    fn snapshot_is_preferred_over_sources() {
        let dir = tempfile::tempdir().unwrap();
        let snapshot = dir.path().join("foods.grub");
        grub_core::IndexBuilder::new()
            .record(grub_types::FoodRecord::new("1", "0100", "cheddar cheese", ""))
            .build()
            .unwrap()
            .save(&snapshot)
            .unwrap();

        // data_dir is empty, so only the snapshot can satisfy the open.
        let config = DemoConfig {
            data_dir: dir.path().join("missing"),
            snapshot: Some(snapshot),
            ..DemoConfig::default()
        };
        let index = open_index(&config).unwrap();
        assert_eq!(index.len(), 1);

        let config = DemoConfig {
            snapshot: None,
            ..config
        };
        assert!(matches!(open_index(&config), Err(DemoError::Load(_))));
    }
}
