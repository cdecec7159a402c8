//! HuggingFace tokenizer loaded from a `tokenizer.json` file.

use anyhow::{anyhow, Result};
use std::path::Path;

use crate::domain::ports::Tokenizer;

/// Tokenizer matching the embedding model's own vocabulary, e.g. the
/// `sentence-transformers/all-MiniLM-L6-v2` WordPiece tokenizer.
pub struct HuggingFaceTokenizer {
    inner: tokenizers::Tokenizer,
    name: String,
}

impl HuggingFaceTokenizer {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let inner = tokenizers::Tokenizer::from_file(path)
            .map_err(|e| anyhow!("Failed to load tokenizer from {}: {e}", path.display()))?;
        Ok(Self {
            inner,
            name: path.display().to_string(),
        })
    }
}

impl Tokenizer for HuggingFaceTokenizer {
    fn name(&self) -> &str {
        &self.name
    }

    fn encode(&self, text: &str) -> Result<Vec<u32>> {
        let encoding = self
            .inner
            .encode(text, false)
            .map_err(|e| anyhow!("Failed to encode text: {e}"))?;
        Ok(encoding.get_ids().to_vec())
    }

    fn decode(&self, ids: &[u32]) -> Result<String> {
        self.inner
            .decode(ids, false)
            .map_err(|e| anyhow!("Failed to decode tokens: {e}"))
    }
}
