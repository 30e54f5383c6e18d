//! Similarity reporter.
//!
//! Scores every patch attempt against its bug's original program and
//! appends one CSV row per scored attempt:
//!
//! ```text
//! bugid,toolname,index,similarity
//! ```
//!
//! The index counts emitted rows within a (bug, tool) pair, starting at 1.
//! Attempts whose text or original text is empty are skipped and do not
//! consume an index.

use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::corpus::Corpus;
use crate::embedding::SimilarityModel;
use crate::models::{Mode, ReportRow};
use crate::tokenize::tokenize;

/// Counts from one reporting pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReportStats {
    pub written: usize,
    pub skipped: usize,
}

/// `similarities_<mode>.csv`
pub fn output_file_name(mode: Mode) -> String {
    format!("similarities_{}.csv", mode.name())
}

pub fn output_path(output_dir: &Path, mode: Mode) -> PathBuf {
    output_dir.join(output_file_name(mode))
}

/// Score every attempt in `corpus` and write the rows to `out`.
pub fn write_report<M, W>(
    model: &M,
    corpus: &Corpus,
    mode: Mode,
    out: &mut W,
) -> Result<ReportStats>
where
    M: SimilarityModel + ?Sized,
    W: Write,
{
    let mut stats = ReportStats::default();

    for (bug, original) in &corpus.originals {
        let Some(tools) = corpus.patches.get(bug) else {
            continue;
        };
        let original_tokens = tokenize(mode, original);

        for (tool, attempts) in tools {
            let tool_name = tool.to_lowercase();
            let mut index = 1;

            for patch in attempts {
                if patch.is_empty() || original.is_empty() {
                    stats.skipped += 1;
                    continue;
                }

                let patch_tokens = tokenize(mode, patch);
                let similarity = model
                    .n_similarity(&original_tokens, &patch_tokens)
                    .with_context(|| {
                        format!("Failed to score {} patch #{} for {}", tool, index, bug)
                    })?;

                let row = ReportRow {
                    bug: bug.clone(),
                    tool: tool_name.clone(),
                    index,
                    similarity,
                };
                writeln!(out, "{}", row.to_csv_line())?;

                index += 1;
                stats.written += 1;
            }
        }
    }

    Ok(stats)
}

/// Write the report for `mode` into `output_dir`, creating it if needed.
/// Returns the path written and the pass counts.
pub fn write_report_file<M>(
    model: &M,
    corpus: &Corpus,
    mode: Mode,
    output_dir: &Path,
) -> Result<(PathBuf, ReportStats)>
where
    M: SimilarityModel + ?Sized,
{
    std::fs::create_dir_all(output_dir).with_context(|| {
        format!("Failed to create output directory: {}", output_dir.display())
    })?;

    let path = output_path(output_dir, mode);
    let file = File::create(&path)
        .with_context(|| format!("Failed to create report file: {}", path.display()))?;
    let mut writer = BufWriter::new(file);

    let stats = write_report(model, corpus, mode, &mut writer)?;
    writer
        .flush()
        .with_context(|| format!("Failed to write report file: {}", path.display()))?;

    Ok((path, stats))
}
