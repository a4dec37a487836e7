//! Command-line interface for PBS Büchi complementation.

use clap::Parser;
use pbs_core::hoa;
use pbs_core::{complement, ComplementError, Options};
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use thiserror::Error;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("failed to read {path}: {message}")]
    IoError { path: String, message: String },

    #[error("{path}: {source}")]
    HoaError {
        path: String,
        #[source]
        source: pbs_core::HoaError,
    },

    #[error("{path}: automaton #{index}: {source}")]
    ComplementError {
        path: String,
        index: usize,
        #[source]
        source: ComplementError,
    },

    #[error("failed to write output: {message}")]
    WriteError { message: String },
}

type CliResult<T> = Result<T, CliError>;

#[derive(Parser)]
#[command(name = "pbs", version)]
#[command(about = "Complement Büchi automata with the powerset-breakpoint-slice construction", long_about = None)]
struct Cli {
    /// HOA input files; standard input when none are given
    #[arg(value_name = "FILE")]
    files: Vec<PathBuf>,

    /// Remove states that cannot reach an accepting cycle
    #[arg(long)]
    trim: bool,

    /// Disable the accepting-component filter on breakpoints and slices
    #[arg(long)]
    no_scc: bool,

    /// Disable the hopeful-state pruning
    #[arg(long)]
    no_hopeful: bool,

    /// Let every breakpoint state retire, not only marked or branching ones
    #[arg(long)]
    no_restrict: bool,

    /// Give up on an automaton once its complement has this many states
    #[arg(long, value_name = "N")]
    max_states: Option<usize>,

    /// Print construction statistics as JSON on stderr
    #[arg(long)]
    stats: bool,

    /// Show debug output
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .without_time()
        .init();

    if let Err(e) = run(&cli) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn read_input(file: Option<&Path>) -> CliResult<(String, String)> {
    let Some(file) = file else {
        let mut text = String::new();
        io::stdin()
            .read_to_string(&mut text)
            .map_err(|e| CliError::IoError {
                path: "<stdin>".into(),
                message: e.to_string(),
            })?;
        return Ok(("<stdin>".into(), text));
    };
    let path = file.display().to_string();
    match fs::read_to_string(file) {
        Ok(text) => Ok((path, text)),
        Err(e) => Err(CliError::IoError {
            path,
            message: e.to_string(),
        }),
    }
}

fn run(cli: &Cli) -> CliResult<()> {
    let opts = Options {
        use_scc: !cli.no_scc,
        use_hopeful: !cli.no_hopeful,
        restrict_retirement: !cli.no_restrict,
        max_states: cli.max_states,
    };
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut skipped = 0usize;

    if cli.files.is_empty() {
        let (path, text) = read_input(None)?;
        skipped += complement_stream(cli, &opts, &path, &text, &mut out)?;
    }
    for file in &cli.files {
        let (path, text) = read_input(Some(file.as_path()))?;
        skipped += complement_stream(cli, &opts, &path, &text, &mut out)?;
    }

    if skipped > 0 {
        warn!("{skipped} automata skipped");
    }
    Ok(())
}

/// Complement every automaton in one HOA stream and write the results.
/// Returns the number of non-Büchi automata skipped.
fn complement_stream(
    cli: &Cli,
    opts: &Options,
    path: &str,
    text: &str,
    out: &mut impl Write,
) -> CliResult<usize> {
    let automata = hoa::parse_all(text).map_err(|source| CliError::HoaError {
        path: path.to_string(),
        source,
    })?;

    let mut skipped = 0;
    for (index, aut) in automata.iter().enumerate() {
        let result = match complement(aut, opts) {
            Ok(result) => result,
            Err(e @ ComplementError::NotBuchi { .. }) => {
                warn!("{path}: skipping automaton #{index}: {e}");
                skipped += 1;
                continue;
            }
            Err(source) => {
                return Err(CliError::ComplementError {
                    path: path.to_string(),
                    index,
                    source,
                })
            }
        };

        let automaton = if cli.trim {
            let t = Instant::now();
            let trimmed = result.automaton.purge_useless();
            info!(
                before = result.automaton.num_states(),
                after = trimmed.num_states(),
                ms = t.elapsed().as_secs_f64() * 1000.0,
                "trimmed"
            );
            trimmed
        } else {
            result.automaton
        };

        if cli.stats {
            match serde_json::to_string_pretty(&result.stats) {
                Ok(json) => eprintln!("{json}"),
                Err(e) => warn!("could not serialize stats: {e}"),
            }
        }

        out.write_all(hoa::to_hoa(&automaton).as_bytes())
            .map_err(|e| CliError::WriteError {
                message: e.to_string(),
            })?;
    }
    Ok(skipped)
}
