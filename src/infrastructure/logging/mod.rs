//! Logging infrastructure
//!
//! Structured logging using tracing and tracing-subscriber:
//! - Append-only JSON log file through tracing-appender
//! - Pretty or JSON terminal output
//! - Secret scrubbing for logged response bodies

pub mod config;
pub mod logger;
pub mod secret_scrubbing;

pub use config::{LogConfig, LogFormat};
pub use logger::LoggerImpl;
pub use secret_scrubbing::{scrub, SecretScrubber};
