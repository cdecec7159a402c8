pub mod config;
pub mod index;
pub mod method;
pub mod pipeline;

pub use config::{
    Config, GraphConfig, InferenceConfig, LoggingConfig, PipelineConfig, RetryConfig,
    TokenizerConfig,
};
pub use index::{SimilarityFunction, VectorIndexSpec};
pub use method::{Embedding, MethodRecord, RecordId, SimilarMethod};
pub use pipeline::{FailurePolicy, PageOutcome, PageProgress, RecordScope, RunReport, SkipReason};
