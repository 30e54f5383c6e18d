//! Corpus builder.
//!
//! Walks the fixed input layout and reads the mode-specific representation
//! of every original program and every patch attempt:
//!
//! ```text
//! <input>/java_programs/<BUGID><suffix>
//! <input>/patched_java_programs/<bugid>/<tool>/<attempt>/<BUGID><suffix>
//! ```
//!
//! A missing original representation aborts the build. A bug without a
//! patch directory, or an attempt without its representation file, is
//! treated as the tool not having produced that case and contributes
//! nothing.

use anyhow::{Context, Result};
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::models::{Mode, TaggedDocument};
use crate::tokenize::tokenize;

/// Subdirectory holding one representation file per bug.
pub const ORIGINALS_DIR: &str = "java_programs";
/// Subdirectory holding per-bug, per-tool, per-attempt patch directories.
pub const PATCHES_DIR: &str = "patched_java_programs";
/// Extension that marks an originals entry as a bug.
pub const PROGRAM_EXTENSION: &str = ".java";

/// Texts read for one run, plus their lookup structures.
#[derive(Debug, Default, Clone)]
pub struct Corpus {
    /// Bug ids in the order their originals were read.
    pub bugs: Vec<String>,
    /// Bug id → original program text.
    pub originals: BTreeMap<String, String>,
    /// Bug id → tool name → patch texts in encounter order.
    pub patches: BTreeMap<String, BTreeMap<String, Vec<String>>>,
    /// Every text read, originals first, in the order it was read.
    pub texts: Vec<String>,
}

impl Corpus {
    pub fn bug_count(&self) -> usize {
        self.originals.len()
    }

    pub fn patch_count(&self) -> usize {
        self.patches
            .values()
            .flat_map(|tools| tools.values())
            .map(Vec::len)
            .sum()
    }
}

/// One patch attempt directory under a bug's patch tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchAttempt {
    pub tool: String,
    pub dir: PathBuf,
}

/// Lazy walk over `<bug dir>/<tool>/<attempt>` directories, sorted by name.
pub struct PatchWalk {
    inner: walkdir::IntoIter,
}

impl PatchWalk {
    pub fn new(bug_dir: &Path) -> Self {
        let inner = WalkDir::new(bug_dir)
            .min_depth(2)
            .max_depth(2)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter();
        Self { inner }
    }
}

impl Iterator for PatchWalk {
    type Item = Result<PatchAttempt>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let entry = match self.inner.next()? {
                Ok(entry) => entry,
                Err(e) => return Some(Err(e.into())),
            };
            if !entry.file_type().is_dir() {
                continue;
            }
            let tool = entry
                .path()
                .parent()
                .and_then(|p| p.file_name())
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();
            return Some(Ok(PatchAttempt {
                tool,
                dir: entry.into_path(),
            }));
        }
    }
}

/// File name of a bug's representation in `mode`, e.g. `QUICKSORT.ast`.
pub fn representation_file(bug: &str, mode: Mode) -> String {
    format!("{}{}", bug.to_uppercase(), mode.suffix())
}

/// Derive a bug id from an originals entry name, if it is a program file.
pub fn bug_id(file_name: &str) -> Option<String> {
    file_name
        .strip_suffix(PROGRAM_EXTENSION)
        .map(|stem| stem.to_lowercase())
}

/// Read every original and patch representation under `input` for `mode`.
pub fn build_corpus(input: &Path, mode: Mode) -> Result<Corpus> {
    let mut corpus = read_originals(input, mode)?;
    read_patches(&mut corpus, input, mode)?;
    Ok(corpus)
}

/// Read the original representation of every bug in the originals directory.
pub fn read_originals(input: &Path, mode: Mode) -> Result<Corpus> {
    let mut corpus = Corpus::default();
    let originals_dir = input.join(ORIGINALS_DIR);

    for entry in WalkDir::new(&originals_dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.with_context(|| {
            format!(
                "Failed to list originals directory: {}",
                originals_dir.display()
            )
        })?;
        let name = entry.file_name().to_string_lossy();
        let Some(bug) = bug_id(&name) else {
            continue;
        };
        if corpus.originals.contains_key(&bug) {
            continue;
        }

        let path = originals_dir.join(representation_file(&bug, mode));
        let text = read_text(&path)
            .with_context(|| format!("Failed to read original program: {}", path.display()))?;

        corpus.texts.push(text.clone());
        corpus.originals.insert(bug.clone(), text);
        corpus.bugs.push(bug);
    }

    tracing::info!(bugs = corpus.bugs.len(), "read original programs");
    Ok(corpus)
}

/// Read a representation file with universal newlines.
fn read_text(path: &Path) -> std::io::Result<String> {
    std::fs::read_to_string(path).map(|text| normalize_newlines(&text))
}

/// Translate `\r\n` and lone `\r` line endings to `\n`.
pub fn normalize_newlines(text: &str) -> String {
    if !text.contains('\r') {
        return text.to_string();
    }
    text.replace("\r\n", "\n").replace('\r', "\n")
}

/// Read every patch attempt for the bugs already in `corpus`.
pub fn read_patches(corpus: &mut Corpus, input: &Path, mode: Mode) -> Result<()> {
    let patches_dir = input.join(PATCHES_DIR);

    for bug in &corpus.bugs {
        let tools = corpus.patches.entry(bug.clone()).or_default();

        let bug_dir = patches_dir.join(bug);
        if !bug_dir.exists() {
            continue;
        }

        let file_name = representation_file(bug, mode);
        for attempt in PatchWalk::new(&bug_dir) {
            let attempt = attempt.with_context(|| {
                format!("Failed to walk patch directory: {}", bug_dir.display())
            })?;
            let patch_list = tools.entry(attempt.tool).or_default();

            let path = attempt.dir.join(&file_name);
            if !path.exists() {
                tracing::trace!(path = %path.display(), "attempt has no representation");
                continue;
            }

            let text = read_text(&path)
                .with_context(|| format!("Failed to read patch: {}", path.display()))?;
            corpus.texts.push(text.clone());
            patch_list.push(text);
        }
    }

    tracing::info!(
        patches = corpus.patch_count(),
        documents = corpus.texts.len(),
        "read patched programs"
    );
    Ok(())
}

/// Tokenize every text and tag it with its position in the list.
///
/// Tokenization runs on a pool of `workers` threads; the output order
/// always matches `texts`.
pub fn tagged_documents(
    texts: &[String],
    mode: Mode,
    workers: usize,
) -> Result<Vec<TaggedDocument>> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .build()
        .context("Failed to build tokenizer thread pool")?;

    Ok(pool.install(|| {
        texts
            .par_iter()
            .enumerate()
            .map(|(tag, text)| TaggedDocument {
                words: tokenize(mode, text),
                tag,
            })
            .collect()
    }))
}
