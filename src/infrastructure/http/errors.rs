use reqwest::StatusCode;
use thiserror::Error;

/// Errors surfaced by the retrying HTTP client
#[derive(Error, Debug)]
pub enum HttpError {
    /// Every attempt timed out
    #[error("Request timed out after {attempts} attempt(s)")]
    Timeout { attempts: u32 },

    /// Every attempt failed to connect or send
    #[error("Connection failed after {attempts} attempt(s): {message}")]
    Connection { attempts: u32, message: String },

    /// The endpoint kept answering with a retryable status
    #[error("Gave up after {attempts} attempt(s), last status {status}: {body}")]
    RetriesExhausted {
        status: StatusCode,
        attempts: u32,
        body: String,
    },

    /// Non-transient reqwest failure (client build, body read, ...)
    #[error("Request error: {0}")]
    Request(#[from] reqwest::Error),

    /// The bearer token cannot be sent as a header value
    #[error("Invalid header value: {0}")]
    InvalidHeader(String),
}

/// Returns true for reqwest errors worth another attempt
pub fn is_transient_transport(err: &reqwest::Error) -> bool {
    err.is_timeout() || err.is_connect() || err.is_request()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exhausted_message_names_status_and_attempts() {
        let err = HttpError::RetriesExhausted {
            status: StatusCode::TOO_MANY_REQUESTS,
            attempts: 6,
            body: "slow down".to_string(),
        };
        let message = err.to_string();
        assert!(message.contains("6 attempt(s)"));
        assert!(message.contains("429"));
        assert!(message.contains("slow down"));
    }
}
