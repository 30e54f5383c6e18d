//! # Patch Similarity CLI (`patchsim`)
//!
//! Trains one Doc2Vec model over a corpus of original programs and their
//! generated patches, then writes the similarity between each original and
//! every patch attempt to `<output>/similarities_<mode>.csv`.
//!
//! ## Usage
//!
//! ```bash
//! patchsim --mode <.ast|.src|.ident> [--input ./input] [--output ./output]
//! ```
//!
//! ## Input layout
//!
//! ```text
//! <input>/java_programs/<BUGID>.java
//! <input>/java_programs/<BUGID><mode>
//! <input>/patched_java_programs/<bugid>/<tool>/<attempt>/<BUGID><mode>
//! ```
//!
//! ## Examples
//!
//! ```bash
//! # Identifier-level similarity with default paths
//! patchsim --mode .ident
//!
//! # Syntax-tree similarity with custom hyperparameters
//! patchsim --mode .ast --config ./config/patchsim.toml --output ./results
//!
//! # Verbose diagnostics
//! PATCHSIM_LOG=debug patchsim --mode .src
//! ```

use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use patch_similarity::config::{self, Config};
use patch_similarity::experiment::{self, RunOptions};
use patch_similarity::models::Mode;
use patch_similarity::progress::ProgressMode;

/// Patch Similarity: Doc2Vec similarity between original programs and
/// automatically generated patches.
#[derive(Parser)]
#[command(
    name = "patchsim",
    about = "Doc2Vec experiment to measure patch similarity",
    version,
    long_about = "Reads original programs and their generated patches, trains a single \
    Doc2Vec model over the whole corpus, and writes the similarity between each original \
    program and every patch attempt as CSV rows: bugid,toolname,index,similarity."
)]
struct Cli {
    /// The train mode: which representation to read and how to tokenize it.
    ///
    /// `.ast` reads syntax-tree serializations split on whitespace; `.src`
    /// and `.ident` read source text or identifier lists split into
    /// lowercase camel-case words.
    #[arg(long, value_parser = parse_mode)]
    mode: Mode,

    /// Input folder. Must contain `java_programs/` and `patched_java_programs/`.
    #[arg(long, default_value = "./input")]
    input: PathBuf,

    /// Output folder. Created if missing.
    #[arg(long, default_value = "./output")]
    output: PathBuf,

    /// Optional TOML file with `[model]` hyperparameters.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override `model.workers` (tokenizer threads).
    #[arg(long)]
    workers: Option<usize>,

    /// Override `model.seed`.
    #[arg(long)]
    seed: Option<u64>,

    /// Training progress on stderr: `off`, `human`, or `json`.
    /// Defaults to `human` when stderr is a terminal, otherwise `off`.
    #[arg(long)]
    progress: Option<ProgressMode>,
}

fn parse_mode(s: &str) -> Result<Mode, String> {
    s.parse::<Mode>().map_err(|e| e.to_string())
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_env("PATCHSIM_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let mut cfg = match &cli.config {
        Some(path) => config::load_config(path)?,
        None => Config::default(),
    };
    if let Some(workers) = cli.workers {
        cfg.model.workers = workers;
    }
    if let Some(seed) = cli.seed {
        cfg.model.seed = seed;
    }

    let options = RunOptions {
        mode: cli.mode,
        input: cli.input,
        output: cli.output,
        progress: cli.progress.unwrap_or_else(ProgressMode::default_for_tty),
    };

    let summary = experiment::run_experiment(&options, &cfg)?;
    tracing::debug!(
        bugs = summary.bugs,
        documents = summary.documents,
        vocabulary = summary.vocabulary,
        rows = summary.rows_written,
        skipped = summary.rows_skipped,
        "run finished"
    );

    Ok(())
}
