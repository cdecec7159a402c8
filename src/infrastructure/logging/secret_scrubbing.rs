use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

static SCRUBBER: LazyLock<SecretScrubber> = LazyLock::new(SecretScrubber::new);

/// Scrub a message with the shared scrubber
pub fn scrub(message: &str) -> String {
    SCRUBBER.scrub_message(message)
}

/// Removes credentials from text before it reaches a log sink
#[derive(Clone)]
pub struct SecretScrubber {
    hf_token_pattern: Regex,
    token_pattern: Regex,
    bearer_pattern: Regex,
    password_pattern: Regex,
    uri_credentials_pattern: Regex,
}

impl SecretScrubber {
    /// Create a new secret scrubber
    pub fn new() -> Self {
        Self {
            // Match HuggingFace access tokens: hf_...
            hf_token_pattern: Regex::new(r"hf_[a-zA-Z0-9]{20,}").expect("valid regex"),
            // Match generic tokens
            token_pattern: Regex::new(
                r#"["']?(?:api_key|apikey|token|secret)["']?\s*[:=]\s*["']?([a-zA-Z0-9-_\.]{20,})["']?"#,
            )
            .expect("valid regex"),
            // Match Bearer tokens in Authorization headers
            bearer_pattern: Regex::new(r"Bearer\s+[a-zA-Z0-9-_\.]+").expect("valid regex"),
            // Match password fields
            password_pattern: Regex::new(r#"["']?password["']?\s*[:=]\s*["']?([^"'\s,}]+)["']?"#)
                .expect("valid regex"),
            // Match user:password@ in connection URIs
            uri_credentials_pattern: Regex::new(r"://[^/\s:@]+:[^/\s@]+@").expect("valid regex"),
        }
    }

    /// Scrub a message of sensitive data
    pub fn scrub_message(&self, message: &str) -> String {
        let mut scrubbed = self
            .hf_token_pattern
            .replace_all(message, "[TOKEN_REDACTED]")
            .to_string();
        scrubbed = self
            .bearer_pattern
            .replace_all(&scrubbed, "Bearer [TOKEN_REDACTED]")
            .to_string();
        scrubbed = self
            .token_pattern
            .replace_all(&scrubbed, |caps: &regex::Captures| {
                let full_match = &caps[0];
                if let Some(colon_pos) = full_match.find(':') {
                    format!("{}:[REDACTED]", &full_match[..colon_pos])
                } else if let Some(eq_pos) = full_match.find('=') {
                    format!("{}=[REDACTED]", &full_match[..eq_pos])
                } else {
                    "[REDACTED]".to_string()
                }
            })
            .to_string();
        scrubbed = self
            .password_pattern
            .replace_all(&scrubbed, "password=[REDACTED]")
            .to_string();
        self.uri_credentials_pattern
            .replace_all(&scrubbed, "://[REDACTED]@")
            .to_string()
    }
}

impl Default for SecretScrubber {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SecretScrubber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretScrubber").finish()
    }
}
