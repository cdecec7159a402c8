//! Tokenizer port and the token-budget truncation built on it.

use anyhow::Result;

/// Text after applying a token budget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Truncated {
    /// The text already fit the budget and is returned as given.
    Unchanged(String),
    /// The text was cut to a decoded prefix of its token sequence.
    Truncated { text: String, original_tokens: usize },
}

impl Truncated {
    pub fn text(&self) -> &str {
        match self {
            Self::Unchanged(text) | Self::Truncated { text, .. } => text,
        }
    }

    pub fn into_text(self) -> String {
        match self {
            Self::Unchanged(text) | Self::Truncated { text, .. } => text,
        }
    }

    pub const fn was_truncated(&self) -> bool {
        matches!(self, Self::Truncated { .. })
    }
}

/// A deterministic text tokenizer.
///
/// Implementors provide `encode`/`decode`; counting and truncation are
/// derived from them so every tokenizer truncates the same way.
pub trait Tokenizer: Send + Sync {
    /// Short name used in log fields.
    fn name(&self) -> &str;

    /// Token ids of `text`, without special tokens.
    fn encode(&self, text: &str) -> Result<Vec<u32>>;

    /// Text for a sequence of token ids.
    fn decode(&self, ids: &[u32]) -> Result<String>;

    fn count_tokens(&self, text: &str) -> Result<usize> {
        Ok(self.encode(text)?.len())
    }

    /// Cut `text` so that it encodes to at most `max_tokens` tokens.
    ///
    /// The result is the decoding of the longest prefix of `encode(text)`
    /// that decodes cleanly and re-encodes within the budget, which makes the
    /// operation idempotent.
    fn truncate_to_budget(&self, text: &str, max_tokens: usize) -> Result<Truncated> {
        let ids = self.encode(text)?;
        if ids.len() <= max_tokens {
            return Ok(Truncated::Unchanged(text.to_string()));
        }

        let original_tokens = ids.len();
        let mut keep = max_tokens;
        while keep > 0 {
            // A prefix can end inside a multi-byte sequence or re-merge into
            // more tokens than it was cut to; shorten until both hold.
            if let Ok(candidate) = self.decode(&ids[..keep]) {
                if self.count_tokens(&candidate)? <= max_tokens {
                    return Ok(Truncated::Truncated {
                        text: candidate,
                        original_tokens,
                    });
                }
            }
            keep -= 1;
        }

        Ok(Truncated::Truncated {
            text: String::new(),
            original_tokens,
        })
    }
}
