//! Tokenizer implementations for the truncation fallback

pub mod bpe;
pub mod huggingface;

use anyhow::Result;
use std::sync::Arc;
use tracing::info;

use crate::domain::models::TokenizerConfig;
use crate::domain::ports::Tokenizer;

pub use bpe::BpeTokenizer;
pub use huggingface::HuggingFaceTokenizer;

/// Build the tokenizer selected by configuration
pub fn from_config(config: &TokenizerConfig) -> Result<Arc<dyn Tokenizer>> {
    let tokenizer: Arc<dyn Tokenizer> = match &config.file {
        Some(path) => Arc::new(HuggingFaceTokenizer::from_file(path)?),
        None => Arc::new(BpeTokenizer::cl100k()?),
    };
    info!(tokenizer = tokenizer.name(), "tokenizer loaded");
    Ok(tokenizer)
}
