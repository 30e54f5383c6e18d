//! End-to-end experiment run.
//!
//! Coordinates the full flow: corpus → tokenization → training →
//! similarity report. Every stage receives the mode and paths explicitly
//! through [`RunOptions`]. The run is all-or-nothing: any error aborts it.

use anyhow::{Context, Result};
use std::path::PathBuf;

use crate::config::Config;
use crate::corpus::{read_originals, read_patches, tagged_documents};
use crate::embedding::Doc2Vec;
use crate::models::Mode;
use crate::progress::ProgressMode;
use crate::report::write_report_file;

/// Per-run parameters taken from the command line.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub mode: Mode,
    pub input: PathBuf,
    pub output: PathBuf,
    pub progress: ProgressMode,
}

/// What a finished run produced.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub report_path: PathBuf,
    pub bugs: usize,
    pub documents: usize,
    pub vocabulary: usize,
    pub rows_written: usize,
    pub rows_skipped: usize,
}

pub fn run_experiment(options: &RunOptions, config: &Config) -> Result<RunSummary> {
    config.model.validate()?;

    std::fs::create_dir_all(&options.output).with_context(|| {
        format!(
            "Failed to create output directory: {}",
            options.output.display()
        )
    })?;

    println!("Reading original programs...");
    let mut corpus = read_originals(&options.input, options.mode)?;

    println!("Reading patched programs...");
    read_patches(&mut corpus, &options.input, options.mode)?;

    let documents = tagged_documents(&corpus.texts, options.mode, config.model.workers)?;
    let reporter = options.progress.reporter();
    let model = Doc2Vec::train(&documents, &config.model, reporter.as_ref())?;

    println!("Counting similarities...");
    let (report_path, stats) =
        write_report_file(&model, &corpus, options.mode, &options.output)?;
    println!("The similarity file was saved to {}", report_path.display());

    tracing::info!(
        path = %report_path.display(),
        written = stats.written,
        skipped = stats.skipped,
        "report written"
    );

    Ok(RunSummary {
        report_path,
        bugs: corpus.bug_count(),
        documents: documents.len(),
        vocabulary: model.vocabulary().len(),
        rows_written: stats.written,
        rows_skipped: stats.skipped,
    })
}
