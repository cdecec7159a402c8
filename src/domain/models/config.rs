use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

use super::index::{SimilarityFunction, VectorIndexSpec};
use super::pipeline::{FailurePolicy, RecordScope};

/// Main configuration structure for codembed
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Embedding inference endpoint configuration
    #[serde(default)]
    pub inference: InferenceConfig,

    /// HTTP retry policy configuration
    #[serde(default)]
    pub retry: RetryConfig,

    /// Graph database configuration
    #[serde(default)]
    pub graph: GraphConfig,

    /// Batch pipeline configuration
    #[serde(default)]
    pub pipeline: PipelineConfig,

    /// Tokenizer used by the truncation fallback
    #[serde(default)]
    pub tokenizer: TokenizerConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Index definition derived from the graph and inference settings.
    pub fn index_spec(&self) -> VectorIndexSpec {
        VectorIndexSpec {
            name: self.graph.index_name.clone(),
            label: self.graph.label.clone(),
            property: self.graph.embedding_property.clone(),
            dimensions: self.inference.dimensions,
            similarity: self.graph.similarity,
        }
    }
}

/// Embedding inference endpoint configuration
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct InferenceConfig {
    /// Full URL of the feature-extraction endpoint
    #[serde(default)]
    pub url: String,

    /// Bearer token sent in the Authorization header
    #[serde(default)]
    pub token: String,

    /// Dimension of the vectors produced by the model
    #[serde(default)]
    pub dimensions: usize,

    /// Per-item token ceiling applied by the truncation fallback
    #[serde(default)]
    pub max_tokens_per_item: usize,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

const fn default_timeout_secs() -> u64 {
    30
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            token: String::new(),
            dimensions: 0,
            max_tokens_per_item: 0,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl fmt::Debug for InferenceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InferenceConfig")
            .field("url", &self.url)
            .field("token", &redacted(&self.token))
            .field("dimensions", &self.dimensions)
            .field("max_tokens_per_item", &self.max_tokens_per_item)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// HTTP retry policy configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RetryConfig {
    /// Retries after the first attempt
    #[serde(default = "default_total_retries")]
    pub total_retries: u32,

    /// Base of the exponential backoff, in seconds
    #[serde(default = "default_backoff_factor_secs")]
    pub backoff_factor_secs: f64,

    /// Upper bound for a single backoff delay, in seconds
    #[serde(default = "default_max_backoff_secs")]
    pub max_backoff_secs: f64,

    /// Status codes that trigger an automatic retry
    #[serde(default = "default_retry_statuses")]
    pub retry_statuses: Vec<u16>,
}

const fn default_total_retries() -> u32 {
    5
}

const fn default_backoff_factor_secs() -> f64 {
    1.0
}

const fn default_max_backoff_secs() -> f64 {
    120.0
}

fn default_retry_statuses() -> Vec<u16> {
    vec![429, 500, 502, 503, 504]
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            total_retries: default_total_retries(),
            backoff_factor_secs: default_backoff_factor_secs(),
            max_backoff_secs: default_max_backoff_secs(),
            retry_statuses: default_retry_statuses(),
        }
    }
}

/// Graph database configuration
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct GraphConfig {
    /// Bolt URI, e.g. `bolt://localhost:7687`
    #[serde(default)]
    pub uri: String,

    #[serde(default)]
    pub user: String,

    #[serde(default)]
    pub password: String,

    /// Node label of method records
    #[serde(default = "default_label")]
    pub label: String,

    /// Property holding the source text
    #[serde(default = "default_text_property")]
    pub text_property: String,

    /// Property receiving the embedding
    #[serde(default = "default_embedding_property")]
    pub embedding_property: String,

    /// Name of the vector index
    #[serde(default = "default_index_name")]
    pub index_name: String,

    /// Similarity function of the vector index
    #[serde(default)]
    pub similarity: SimilarityFunction,
}

fn default_label() -> String {
    "Method".to_string()
}

fn default_text_property() -> String {
    "code".to_string()
}

fn default_embedding_property() -> String {
    "embedding".to_string()
}

fn default_index_name() -> String {
    "methodEmbeddings".to_string()
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            uri: String::new(),
            user: String::new(),
            password: String::new(),
            label: default_label(),
            text_property: default_text_property(),
            embedding_property: default_embedding_property(),
            index_name: default_index_name(),
            similarity: SimilarityFunction::default(),
        }
    }
}

impl fmt::Debug for GraphConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GraphConfig")
            .field("uri", &self.uri)
            .field("user", &self.user)
            .field("password", &redacted(&self.password))
            .field("label", &self.label)
            .field("text_property", &self.text_property)
            .field("embedding_property", &self.embedding_property)
            .field("index_name", &self.index_name)
            .field("similarity", &self.similarity)
            .finish()
    }
}

/// Batch pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct PipelineConfig {
    /// Records per inference request
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Truncate-and-resubmit cycles allowed per batch on token-limit errors
    #[serde(default = "default_truncation_retries")]
    pub truncation_retries: u32,

    /// Which records a run selects
    #[serde(default)]
    pub scope: RecordScope,

    /// Reaction to index DDL failures and skipped batches
    #[serde(default)]
    pub failure_policy: FailurePolicy,
}

const fn default_batch_size() -> usize {
    30
}

const fn default_truncation_retries() -> u32 {
    1
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            truncation_retries: default_truncation_retries(),
            scope: RecordScope::default(),
            failure_policy: FailurePolicy::default(),
        }
    }
}

/// Tokenizer configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct TokenizerConfig {
    /// Path to a HuggingFace `tokenizer.json`. The built-in `cl100k_base`
    /// BPE is used when unset.
    #[serde(default)]
    pub file: Option<PathBuf>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: json or pretty
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Directory for the append-only log file, the working directory by
    /// default; `null` logs to the terminal only
    #[serde(default = "default_log_dir")]
    pub log_dir: Option<PathBuf>,

    /// Log file name inside `log_dir`
    #[serde(default = "default_log_file_name")]
    pub file_name: String,

    /// Also log to the terminal (stderr)
    #[serde(default = "default_true")]
    pub enable_stdout: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

#[allow(clippy::unnecessary_wraps)]
fn default_log_dir() -> Option<PathBuf> {
    Some(PathBuf::from("."))
}

fn default_log_file_name() -> String {
    "loading.log".to_string()
}

const fn default_true() -> bool {
    true
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            log_dir: default_log_dir(),
            file_name: default_log_file_name(),
            enable_stdout: true,
        }
    }
}

fn redacted(secret: &str) -> &'static str {
    if secret.is_empty() {
        "<unset>"
    } else {
        "<redacted>"
    }
}
