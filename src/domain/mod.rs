//! Domain layer for the codembed pipeline
//!
//! This module contains the record and index models, the error taxonomy, and
//! the port traits implemented by the infrastructure adapters.

pub mod errors;
pub mod models;
pub mod ports;

pub use errors::{DomainError, DomainResult, EmbedError};
