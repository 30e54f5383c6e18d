//! # Patch Similarity
//!
//! Measures how close automatically generated patches stay to the program
//! they patch, using Doc2Vec document embeddings as the yardstick.
//!
//! A run reads one representation of every original program and every
//! patch attempt, trains a single embedding model over all of them, and
//! writes one similarity score per (bug, tool, attempt) to a CSV file.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐   ┌─────────────┐   ┌──────────────┐
//! │   Corpus    │──▶│   Doc2Vec   │──▶│  Similarity   │
//! │  Builder    │   │   Trainer   │   │  Reporter     │
//! └─────────────┘   └─────────────┘   └──────┬───────┘
//!                                            ▼
//!                               similarities_<mode>.csv
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! patchsim --mode .ident --input ./input --output ./output
//! patchsim --mode .ast --config ./config/patchsim.toml
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML model hyperparameters |
//! | [`models`] | Core data types |
//! | [`tokenize`] | Mode-dependent tokenizer |
//! | [`corpus`] | Input tree walk and corpus assembly |
//! | [`embedding`] | Doc2Vec trainer and similarity query |
//! | [`report`] | CSV similarity report |
//! | [`progress`] | Training progress on stderr |
//! | [`experiment`] | End-to-end run |

pub mod config;
pub mod corpus;
pub mod embedding;
pub mod experiment;
pub mod models;
pub mod progress;
pub mod report;
pub mod tokenize;
