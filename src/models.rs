//! Core data models used throughout the patch similarity pipeline.
//!
//! These types represent the run mode, the tagged training documents, and
//! the report rows that flow from the corpus builder through the trainer
//! to the similarity reporter.

use anyhow::bail;
use std::fmt;
use std::str::FromStr;

/// On-disk representation selected for a run.
///
/// The mode decides both which file suffix is read for every program and
/// which tokenization rule is applied to its text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    /// Serialized abstract syntax tree (`.ast`), whitespace tokenized.
    Ast,
    /// Raw source text (`.src`), camel-case tokenized.
    Src,
    /// Identifier list (`.ident`), camel-case tokenized.
    Ident,
}

impl Mode {
    pub const ALL: [Mode; 3] = [Mode::Ast, Mode::Src, Mode::Ident];

    /// File suffix including the leading dot, e.g. `".ast"`.
    pub fn suffix(&self) -> &'static str {
        match self {
            Mode::Ast => ".ast",
            Mode::Src => ".src",
            Mode::Ident => ".ident",
        }
    }

    /// Mode name without the leading dot, used in the output file name.
    pub fn name(&self) -> &'static str {
        &self.suffix()[1..]
    }

    /// Whether text in this mode is split into camel-case word pieces.
    pub fn splits_identifiers(&self) -> bool {
        matches!(self, Mode::Src | Mode::Ident)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.suffix())
    }
}

impl FromStr for Mode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            ".ast" => Ok(Mode::Ast),
            ".src" => Ok(Mode::Src),
            ".ident" => Ok(Mode::Ident),
            other => bail!(
                "Unknown mode: '{}'. Must be one of .ast, .src, .ident",
                other
            ),
        }
    }
}

/// A token sequence tagged with its position in the training list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaggedDocument {
    pub words: Vec<String>,
    pub tag: usize,
}

/// One line of the similarity report.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportRow {
    pub bug: String,
    /// Tool name, lowercased.
    pub tool: String,
    /// Ordinal of the emitted row within its (bug, tool) pair, from 1.
    pub index: usize,
    pub similarity: f32,
}

impl ReportRow {
    /// Render the row as a CSV line without the trailing newline.
    ///
    /// The score uses the shortest round-trip form and always keeps a
    /// fractional part, so a perfect score prints as `1.0`.
    pub fn to_csv_line(&self) -> String {
        format!(
            "{},{},{},{:?}",
            self.bug, self.tool, self.index, self.similarity
        )
    }
}
