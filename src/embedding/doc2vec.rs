//! PV-DM Doc2Vec trainer.
//!
//! Learns one vector per vocabulary word and one per tagged document by
//! predicting each word from the mean of its context window and its
//! document vector, with negative sampling. Training is driven by a
//! seeded `ChaCha8Rng`, so a given corpus and [`ModelConfig`] always
//! produce the same model.

use anyhow::{bail, Result};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use super::vocab::Vocabulary;
use super::{cosine_similarity, SimilarityModel};
use crate::config::ModelConfig;
use crate::models::TaggedDocument;
use crate::progress::{TrainProgressEvent, TrainProgressReporter};

/// A trained Doc2Vec model.
#[derive(Debug, Clone)]
pub struct Doc2Vec {
    vocab: Vocabulary,
    vector_size: usize,
    word_vectors: Vec<f32>,
    doc_vectors: Vec<f32>,
}

/// Scratch buffers and output weights shared across one training run.
struct Trainer<'a> {
    config: &'a ModelConfig,
    vocab: &'a Vocabulary,
    rng: ChaCha8Rng,
    word_vectors: Vec<f32>,
    doc_vectors: Vec<f32>,
    syn1neg: Vec<f32>,
    neu1: Vec<f32>,
    neu1e: Vec<f32>,
    indices: Vec<usize>,
}

impl Doc2Vec {
    /// Build the vocabulary, then train for `config.epochs` passes over `corpus`.
    pub fn train(
        corpus: &[TaggedDocument],
        config: &ModelConfig,
        progress: &dyn TrainProgressReporter,
    ) -> Result<Self> {
        config.validate()?;
        if corpus.is_empty() {
            bail!("Cannot train on an empty corpus");
        }

        let vocab = Vocabulary::build(corpus, config.min_count, config.sample)?;
        progress.report(TrainProgressEvent::Vocabulary {
            words: vocab.len() as u64,
            documents: corpus.len() as u64,
        });
        tracing::debug!(
            words = vocab.len(),
            documents = corpus.len(),
            "vocabulary built"
        );

        let doc_slots = corpus.iter().map(|d| d.tag).max().unwrap_or(0) + 1;
        let mut trainer = Trainer::new(config, &vocab, doc_slots);

        let total_docs = (corpus.len() * config.epochs) as f32;
        let mut done = 0usize;
        for epoch in 0..config.epochs {
            for doc in corpus {
                let frac = done as f32 / total_docs;
                let alpha = config.alpha - (config.alpha - config.min_alpha) * frac;
                trainer.train_document(doc, alpha);
                done += 1;
            }
            progress.report(TrainProgressEvent::Epoch {
                n: epoch as u64 + 1,
                total: config.epochs as u64,
            });
        }

        Ok(Self {
            vector_size: config.vector_size,
            word_vectors: trainer.word_vectors,
            doc_vectors: trainer.doc_vectors,
            vocab,
        })
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocab
    }

    pub fn vector_size(&self) -> usize {
        self.vector_size
    }

    pub fn word_vector(&self, word: &str) -> Option<&[f32]> {
        self.vocab
            .index_of(word)
            .map(|i| row(&self.word_vectors, i, self.vector_size))
    }

    pub fn doc_vector(&self, tag: usize) -> Option<&[f32]> {
        let start = tag * self.vector_size;
        self.doc_vectors.get(start..start + self.vector_size)
    }

    /// Mean of the word vectors for `words`. Unknown words are ignored;
    /// repeated words count once per occurrence.
    pub fn mean_vector(&self, words: &[String]) -> Option<Vec<f32>> {
        let mut mean = vec![0.0f32; self.vector_size];
        let mut n = 0usize;
        for v in words.iter().filter_map(|w| self.word_vector(w)) {
            add_into(&mut mean, v);
            n += 1;
        }
        if n == 0 {
            return None;
        }
        scale(&mut mean, 1.0 / n as f32);
        Some(mean)
    }
}

impl SimilarityModel for Doc2Vec {
    fn n_similarity(&self, a: &[String], b: &[String]) -> Result<f32> {
        let (Some(va), Some(vb)) = (self.mean_vector(a), self.mean_vector(b)) else {
            bail!("At least one of the token lists has no known words");
        };
        Ok(cosine_similarity(&va, &vb).clamp(-1.0, 1.0))
    }
}

impl<'a> Trainer<'a> {
    fn new(config: &'a ModelConfig, vocab: &'a Vocabulary, doc_slots: usize) -> Self {
        let size = config.vector_size;
        let mut rng = ChaCha8Rng::seed_from_u64(config.seed);

        let mut init = |n: usize| -> Vec<f32> {
            (0..n)
                .map(|_| (rng.gen::<f32>() - 0.5) / size as f32)
                .collect()
        };
        let word_vectors = init(vocab.len() * size);
        let doc_vectors = init(doc_slots * size);

        Self {
            config,
            vocab,
            rng,
            word_vectors,
            doc_vectors,
            syn1neg: vec![0.0; vocab.len() * size],
            neu1: vec![0.0; size],
            neu1e: vec![0.0; size],
            indices: Vec::new(),
        }
    }

    fn train_document(&mut self, doc: &TaggedDocument, alpha: f32) {
        let size = self.config.vector_size;
        let window = self.config.window;

        // Truncate first, then drop unknown and down-sampled words.
        self.indices.clear();
        for word in doc.words.iter().take(self.config.max_document_len) {
            let Some(i) = self.vocab.index_of(word) else {
                continue;
            };
            let keep = self.vocab.keep_probability(i);
            if keep < 1.0 && keep < self.rng.gen::<f32>() {
                continue;
            }
            self.indices.push(i);
        }

        let n = self.indices.len();
        let doc_start = doc.tag * size;

        for pos in 0..n {
            let reduced = self.rng.gen_range(0..window);
            let start = pos.saturating_sub(window - reduced);
            let end = (pos + window - reduced + 1).min(n);

            self.neu1
                .copy_from_slice(&self.doc_vectors[doc_start..doc_start + size]);
            let mut count = 1usize;
            for j in start..end {
                if j != pos {
                    add_into(&mut self.neu1, row(&self.word_vectors, self.indices[j], size));
                    count += 1;
                }
            }
            let inv_count = 1.0 / count as f32;
            scale(&mut self.neu1, inv_count);

            self.neu1e.fill(0.0);
            let word = self.indices[pos];
            for d in 0..=self.config.negative {
                let (target, label) = if d == 0 {
                    (word, 1.0f32)
                } else {
                    let t = self.vocab.sample_negative(&mut self.rng);
                    if t == word {
                        continue;
                    }
                    (t, 0.0f32)
                };

                let out = row_mut(&mut self.syn1neg, target, size);
                let f = sigmoid(dot(&self.neu1, out));
                let g = (label - f) * alpha;
                axpy(&mut self.neu1e, g, out);
                axpy(out, g, &self.neu1);
            }

            axpy(
                &mut self.doc_vectors[doc_start..doc_start + size],
                1.0,
                &self.neu1e,
            );
            for j in start..end {
                if j != pos {
                    let target = row_mut(&mut self.word_vectors, self.indices[j], size);
                    axpy(target, 1.0, &self.neu1e);
                }
            }
        }
    }
}

fn row(m: &[f32], i: usize, size: usize) -> &[f32] {
    &m[i * size..(i + 1) * size]
}

fn row_mut(m: &mut [f32], i: usize, size: usize) -> &mut [f32] {
    &mut m[i * size..(i + 1) * size]
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// `y += a * x`
fn axpy(y: &mut [f32], a: f32, x: &[f32]) {
    for (yi, xi) in y.iter_mut().zip(x) {
        *yi += a * xi;
    }
}

fn add_into(y: &mut [f32], x: &[f32]) {
    axpy(y, 1.0, x);
}

fn scale(y: &mut [f32], a: f32) {
    for v in y.iter_mut() {
        *v *= a;
    }
}

fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}
