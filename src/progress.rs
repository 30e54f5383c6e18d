//! Training progress reporting.
//!
//! Reports observable progress while the embedding model trains so users see
//! how large the vocabulary is and how many epochs remain. Progress is
//! emitted on **stderr** so stdout keeps only the run's progress lines.

use std::io::Write;
use std::str::FromStr;

/// A single progress event for training.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TrainProgressEvent {
    /// Vocabulary pass finished.
    Vocabulary { words: u64, documents: u64 },
    /// Epoch `n` (1-based) out of `total` finished.
    Epoch { n: u64, total: u64 },
}

/// Reports training progress. Implementations write to stderr (human or JSON).
pub trait TrainProgressReporter: Send + Sync {
    /// Emit a progress event. Called from the trainer.
    fn report(&self, event: TrainProgressEvent);
}

/// Human-friendly progress on stderr: "train  epoch  3 / 20".
pub struct StderrProgress;

impl TrainProgressReporter for StderrProgress {
    fn report(&self, event: TrainProgressEvent) {
        let line = match &event {
            TrainProgressEvent::Vocabulary { words, documents } => format!(
                "train  vocabulary  {} words from {} documents\n",
                format_number(*words),
                format_number(*documents)
            ),
            TrainProgressEvent::Epoch { n, total } => {
                format!("train  epoch  {} / {}\n", n, total)
            }
        };
        let _ = std::io::stderr().lock().write_all(line.as_bytes());
        let _ = std::io::stderr().lock().flush();
    }
}

/// Machine-readable progress: one JSON object per line on stderr.
pub struct JsonProgress;

impl TrainProgressReporter for JsonProgress {
    fn report(&self, event: TrainProgressEvent) {
        let obj = match &event {
            TrainProgressEvent::Vocabulary { words, documents } => serde_json::json!({
                "event": "progress",
                "phase": "vocabulary",
                "words": words,
                "documents": documents
            }),
            TrainProgressEvent::Epoch { n, total } => serde_json::json!({
                "event": "progress",
                "phase": "epoch",
                "n": n,
                "total": total
            }),
        };
        if let Ok(line) = serde_json::to_string(&obj) {
            let _ = writeln!(std::io::stderr().lock(), "{}", line);
            let _ = std::io::stderr().lock().flush();
        }
    }
}

/// No-op reporter when progress is disabled.
pub struct NoProgress;

impl TrainProgressReporter for NoProgress {
    fn report(&self, _event: TrainProgressEvent) {}
}

fn format_number(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::with_capacity(s.len() + (s.len() - 1) / 3);
    let chars: Vec<char> = s.chars().rev().collect();
    for (i, c) in chars.iter().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(*c);
    }
    result.chars().rev().collect()
}

/// Progress mode for the CLI: off, human (stderr), or JSON (stderr).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ProgressMode {
    Off,
    Human,
    Json,
}

impl ProgressMode {
    /// Default: human progress when stderr is a TTY, otherwise off.
    pub fn default_for_tty() -> Self {
        if atty::is(atty::Stream::Stderr) {
            ProgressMode::Human
        } else {
            ProgressMode::Off
        }
    }

    /// Build a reporter for this mode.
    pub fn reporter(&self) -> Box<dyn TrainProgressReporter> {
        match self {
            ProgressMode::Off => Box::new(NoProgress),
            ProgressMode::Human => Box::new(StderrProgress),
            ProgressMode::Json => Box::new(JsonProgress),
        }
    }
}

impl FromStr for ProgressMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "off" => Ok(ProgressMode::Off),
            "human" => Ok(ProgressMode::Human),
            "json" => Ok(ProgressMode::Json),
            other => Err(format!(
                "invalid progress mode '{}': expected off, human, or json",
                other
            )),
        }
    }
}
