//! Byte-level BPE tokenizer backed by tiktoken's `cl100k_base` encoding.

use anyhow::{anyhow, Result};
use tiktoken_rs::CoreBPE;

use crate::domain::ports::Tokenizer;

/// Token counting and truncation with the `cl100k_base` vocabulary.
///
/// The vocabulary ships with the crate, so no download is needed.
pub struct BpeTokenizer {
    bpe: CoreBPE,
}

impl BpeTokenizer {
    pub fn cl100k() -> Result<Self> {
        let bpe = tiktoken_rs::cl100k_base().map_err(|e| anyhow!("Failed to load tokenizer: {e}"))?;
        Ok(Self { bpe })
    }
}

impl Tokenizer for BpeTokenizer {
    fn name(&self) -> &str {
        "cl100k_base"
    }

    fn encode(&self, text: &str) -> Result<Vec<u32>> {
        self.bpe
            .encode_ordinary(text)
            .into_iter()
            .map(|rank| u32::try_from(rank).map_err(|_| anyhow!("token id {rank} out of range")))
            .collect()
    }

    fn decode(&self, ids: &[u32]) -> Result<String> {
        let ranks = ids.iter().map(|id| *id as usize).collect();
        self.bpe
            .decode(ranks)
            .map_err(|e| anyhow!("Failed to decode tokens: {e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_tokens() {
        let tokenizer = BpeTokenizer::cl100k().unwrap();
        assert_eq!(tokenizer.count_tokens("").unwrap(), 0);
        assert!(tokenizer.count_tokens("public void run() {}").unwrap() > 0);
    }

    #[test]
    fn test_short_text_roundtrips() {
        let tokenizer = BpeTokenizer::cl100k().unwrap();
        let text = "int add(int a, int b) { return a + b; }";
        let ids = tokenizer.encode(text).unwrap();
        assert_eq!(tokenizer.decode(&ids).unwrap(), text);
    }

    #[test]
    fn test_truncate_long_method() {
        let tokenizer = BpeTokenizer::cl100k().unwrap();
        let text = "value = compute(value);\n".repeat(200);

        let result = tokenizer.truncate_to_budget(&text, 64).unwrap();

        assert!(result.was_truncated());
        assert!(tokenizer.count_tokens(result.text()).unwrap() <= 64);
        assert!(text.starts_with(result.text()));
    }

    #[test]
    fn test_truncate_multibyte_text_stays_valid() {
        let tokenizer = BpeTokenizer::cl100k().unwrap();
        let text = "// 日本語のコメント 🚀🚀🚀 ".repeat(50);

        let result = tokenizer.truncate_to_budget(&text, 17).unwrap();

        assert!(tokenizer.count_tokens(result.text()).unwrap() <= 17);
        let again = tokenizer.truncate_to_budget(result.text(), 17).unwrap();
        assert_eq!(again.text(), result.text());
    }
}
