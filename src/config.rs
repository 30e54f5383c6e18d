use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub model: ModelConfig,
}

/// Doc2Vec hyperparameters.
#[derive(Debug, Deserialize, Clone)]
pub struct ModelConfig {
    #[serde(default = "default_vector_size")]
    pub vector_size: usize,
    #[serde(default = "default_min_count")]
    pub min_count: usize,
    #[serde(default = "default_epochs")]
    pub epochs: usize,
    #[serde(default = "default_window")]
    pub window: usize,
    #[serde(default = "default_workers")]
    pub workers: usize,
    #[serde(default = "default_negative")]
    pub negative: usize,
    #[serde(default = "default_alpha")]
    pub alpha: f32,
    #[serde(default = "default_min_alpha")]
    pub min_alpha: f32,
    #[serde(default = "default_sample")]
    pub sample: f64,
    #[serde(default = "default_seed")]
    pub seed: u64,
    #[serde(default = "default_max_document_len")]
    pub max_document_len: usize,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            vector_size: 100,
            min_count: 1,
            epochs: 20,
            window: 10,
            workers: 8,
            negative: 5,
            alpha: 0.025,
            min_alpha: 0.0001,
            sample: 1e-3,
            seed: 1,
            max_document_len: 10_000,
        }
    }
}

fn default_vector_size() -> usize {
    100
}
fn default_min_count() -> usize {
    1
}
fn default_epochs() -> usize {
    20
}
fn default_window() -> usize {
    10
}
fn default_workers() -> usize {
    8
}
fn default_negative() -> usize {
    5
}
fn default_alpha() -> f32 {
    0.025
}
fn default_min_alpha() -> f32 {
    0.0001
}
fn default_sample() -> f64 {
    1e-3
}
fn default_seed() -> u64 {
    1
}
fn default_max_document_len() -> usize {
    10_000
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    parse_config(&content)
}

pub fn parse_config(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content).with_context(|| "Failed to parse config file")?;
    config.model.validate()?;
    Ok(config)
}

impl ModelConfig {
    pub fn validate(&self) -> Result<()> {
        if self.vector_size == 0 {
            anyhow::bail!("model.vector_size must be > 0");
        }
        if self.min_count == 0 {
            anyhow::bail!("model.min_count must be >= 1");
        }
        if self.epochs == 0 {
            anyhow::bail!("model.epochs must be > 0");
        }
        if self.window == 0 {
            anyhow::bail!("model.window must be > 0");
        }
        if self.workers == 0 {
            anyhow::bail!("model.workers must be > 0");
        }
        if !(self.alpha > 0.0 && self.alpha <= 1.0) {
            anyhow::bail!("model.alpha must be in (0.0, 1.0]");
        }
        if self.min_alpha < 0.0 || self.min_alpha > self.alpha {
            anyhow::bail!("model.min_alpha must be in [0.0, model.alpha]");
        }
        if self.sample < 0.0 {
            anyhow::bail!("model.sample must be >= 0");
        }
        if self.max_document_len == 0 {
            anyhow::bail!("model.max_document_len must be > 0");
        }
        Ok(())
    }
}
