//! Document embedding model and vector utilities.
//!
//! Defines the [`SimilarityModel`] trait, the one query the similarity
//! reporter needs from a trained model, and the concrete trainer:
//! - **[`Doc2Vec`]**: a PV-DM model with negative sampling trained over the
//!   whole tagged corpus, built on a [`Vocabulary`] pass.
//!
//! Also provides [`cosine_similarity`] for comparing two embedding vectors.
//!
//! # Training
//!
//! ```rust,no_run
//! # use patch_similarity::config::ModelConfig;
//! # use patch_similarity::embedding::{Doc2Vec, SimilarityModel};
//! # use patch_similarity::models::TaggedDocument;
//! # use patch_similarity::progress::NoProgress;
//! let corpus = vec![TaggedDocument {
//!     words: vec!["int".to_string(), "max".to_string()],
//!     tag: 0,
//! }];
//! let model = Doc2Vec::train(&corpus, &ModelConfig::default(), &NoProgress).unwrap();
//! let sim = model.n_similarity(&corpus[0].words, &corpus[0].words).unwrap();
//! assert!(sim > 0.99);
//! ```

mod doc2vec;
mod vocab;

use anyhow::Result;

pub use doc2vec::Doc2Vec;
pub use vocab::Vocabulary;

/// A trained model that can score two token sequences against each other.
pub trait SimilarityModel {
    /// Cosine similarity between the aggregate vectors of `a` and `b`.
    ///
    /// Returns a value in `[-1.0, 1.0]`. Errors when either sequence has no
    /// token the model knows.
    fn n_similarity(&self, a: &[String], b: &[String]) -> Result<f32>;
}

/// Compute cosine similarity between two embedding vectors.
///
/// Returns a value in `[-1.0, 1.0]`:
/// - `1.0` = identical direction
/// - `0.0` = orthogonal (unrelated)
/// - `-1.0` = opposite direction
///
/// Returns `0.0` for empty vectors or vectors of different lengths.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;

    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom < f32::EPSILON {
        return 0.0;
    }

    dot / denom
}
