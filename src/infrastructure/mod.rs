//! Infrastructure layer module
//!
//! This module contains the technical building blocks the adapters are made of:
//! - Retrying HTTP transport for the inference endpoint
//! - Tokenizers for the truncation fallback
//! - Configuration management
//! - Logging infrastructure

pub mod config;
pub mod http;
pub mod logging;
pub mod tokenizer;
