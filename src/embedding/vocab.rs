//! Vocabulary pass for the Doc2Vec trainer.
//!
//! Counts raw token frequencies over the tagged corpus, drops rare words,
//! and precomputes the two sampling structures training needs:
//! per-word keep probabilities for frequent-word down-sampling, and a
//! cumulative unigram table (`count^0.75`) for drawing negative samples.

use anyhow::{bail, Result};
use rand::Rng;
use std::collections::HashMap;

use crate::models::TaggedDocument;

/// Exponent applied to word counts in the negative-sampling distribution.
const NS_EXPONENT: f64 = 0.75;

/// Integer domain of the cumulative table.
const CUM_TABLE_DOMAIN: u32 = i32::MAX as u32;

#[derive(Debug, Clone)]
pub struct Vocabulary {
    words: Vec<String>,
    counts: Vec<u64>,
    index: HashMap<String, usize>,
    keep_probs: Vec<f32>,
    cum_table: Vec<u32>,
}

impl Vocabulary {
    /// Build the vocabulary from a tagged corpus.
    ///
    /// Words occurring fewer than `min_count` times are dropped. Retained
    /// words are ordered by descending count; ties keep first appearance.
    /// `sample` is the down-sampling threshold; `0.0` disables it.
    pub fn build(corpus: &[TaggedDocument], min_count: usize, sample: f64) -> Result<Self> {
        let mut raw_index: HashMap<&str, usize> = HashMap::new();
        let mut raw: Vec<(&str, u64)> = Vec::new();

        for doc in corpus {
            for word in &doc.words {
                match raw_index.get(word.as_str()) {
                    Some(&i) => raw[i].1 += 1,
                    None => {
                        raw_index.insert(word.as_str(), raw.len());
                        raw.push((word.as_str(), 1));
                    }
                }
            }
        }

        raw.retain(|(_, count)| *count >= min_count as u64);
        if raw.is_empty() {
            bail!(
                "Vocabulary is empty: no token occurs at least {} time(s) in {} documents",
                min_count,
                corpus.len()
            );
        }

        // Stable sort keeps first-appearance order among equal counts.
        raw.sort_by(|a, b| b.1.cmp(&a.1));

        let words: Vec<String> = raw.iter().map(|(w, _)| w.to_string()).collect();
        let counts: Vec<u64> = raw.iter().map(|(_, c)| *c).collect();
        let index = words
            .iter()
            .enumerate()
            .map(|(i, w)| (w.clone(), i))
            .collect();

        let keep_probs = keep_probabilities(&counts, sample);
        let cum_table = cumulative_table(&counts);

        Ok(Self {
            words,
            counts,
            index,
            keep_probs,
            cum_table,
        })
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn index_of(&self, word: &str) -> Option<usize> {
        self.index.get(word).copied()
    }

    pub fn word(&self, index: usize) -> &str {
        &self.words[index]
    }

    pub fn count(&self, index: usize) -> u64 {
        self.counts[index]
    }

    /// Probability that an occurrence of word `index` survives down-sampling.
    pub fn keep_probability(&self, index: usize) -> f32 {
        self.keep_probs[index]
    }

    /// Draw a word index from the unigram^0.75 distribution.
    pub fn sample_negative<R: Rng>(&self, rng: &mut R) -> usize {
        let upper = self.cum_table[self.cum_table.len() - 1];
        let r = rng.gen_range(0..upper);
        self.cum_table.partition_point(|&c| c < r)
    }
}

fn keep_probabilities(counts: &[u64], sample: f64) -> Vec<f32> {
    if sample <= 0.0 {
        return vec![1.0; counts.len()];
    }

    let retain_total: u64 = counts.iter().sum();
    let threshold = sample * retain_total as f64;

    counts
        .iter()
        .map(|&c| {
            let c = c as f64;
            let p = ((c / threshold).sqrt() + 1.0) * (threshold / c);
            p.min(1.0) as f32
        })
        .collect()
}

fn cumulative_table(counts: &[u64]) -> Vec<u32> {
    let total: f64 = counts.iter().map(|&c| (c as f64).powf(NS_EXPONENT)).sum();
    let mut cumulative = 0.0f64;
    let mut table = Vec::with_capacity(counts.len());

    for &c in counts {
        cumulative += (c as f64).powf(NS_EXPONENT);
        table.push((cumulative / total * CUM_TABLE_DOMAIN as f64).round() as u32);
    }

    if let Some(last) = table.last_mut() {
        *last = CUM_TABLE_DOMAIN;
    }
    table
}
