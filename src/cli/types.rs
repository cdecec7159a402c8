//! CLI type definitions
//!
//! This module contains clap command structures that define the CLI interface.

use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;

use crate::domain::models::{FailurePolicy, RecordScope};

#[derive(Parser, Debug)]
#[command(name = "codembed")]
#[command(about = "Embed code methods stored in Neo4j and search them by similarity", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file (defaults to .codembed/config.yaml)
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Hide the progress bar
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(flatten)]
    pub overrides: ConfigOverrides,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Rebuild the vector index and embed every method in scope
    Embed,

    /// Drop and recreate the vector index only
    Index,

    /// Find the methods most similar to a query
    Search {
        /// Free-text or code query
        query: String,

        /// Number of matches to return
        #[arg(short = 'n', long, default_value = "10")]
        top: usize,
    },
}

/// Settings given on the command line or through their environment
/// variables; they take precedence over every config source.
#[derive(Args, Debug, Default, Clone)]
pub struct ConfigOverrides {
    /// Inference endpoint URL
    #[arg(long, global = true, env = "HF_URL")]
    pub hf_url: Option<String>,

    /// Inference API token
    #[arg(long, global = true, env = "HF_TOKEN", hide_env_values = true)]
    pub hf_token: Option<String>,

    /// Embedding dimensions produced by the model
    #[arg(long, global = true, env = "HF_DIM")]
    pub hf_dim: Option<usize>,

    /// Tokens the model accepts per input
    #[arg(long, global = true, env = "HF_TPE")]
    pub hf_tpe: Option<usize>,

    /// Neo4j Bolt URI
    #[arg(long, global = true, env = "NEO4J_URI")]
    pub neo4j_uri: Option<String>,

    /// Neo4j user
    #[arg(long, global = true, env = "NEO4J_USER")]
    pub neo4j_user: Option<String>,

    /// Neo4j password
    #[arg(long, global = true, env = "NEO4J_PASS", hide_env_values = true)]
    pub neo4j_pass: Option<String>,

    /// Methods per inference request
    #[arg(long, global = true)]
    pub batch_size: Option<usize>,

    /// Which methods to embed
    #[arg(long, global = true, value_enum)]
    pub scope: Option<ScopeArg>,

    /// Abort on the first failed batch or index error
    #[arg(long, global = true)]
    pub strict: bool,

    /// Name of the vector index
    #[arg(long, global = true)]
    pub index_name: Option<String>,

    /// HuggingFace tokenizer.json used for truncation
    #[arg(long, global = true, value_name = "FILE")]
    pub tokenizer_file: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Directory of the append-only log file
    #[arg(long, global = true, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,
}

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeArg {
    /// Only methods without an embedding
    Unembedded,
    /// Every method, overwriting existing embeddings
    All,
}

impl From<ScopeArg> for RecordScope {
    fn from(arg: ScopeArg) -> Self {
        match arg {
            ScopeArg::Unembedded => Self::Unembedded,
            ScopeArg::All => Self::All,
        }
    }
}

// Nested shape merged over the loaded configuration; unset fields are
// skipped so lower-precedence sources keep their values.

#[derive(Serialize, Default)]
struct InferenceOverrides<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    url: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    token: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    dimensions: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens_per_item: Option<usize>,
}

#[derive(Serialize, Default)]
struct GraphOverrides<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    uri: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    user: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    password: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    index_name: Option<&'a str>,
}

#[derive(Serialize, Default)]
struct PipelineOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    batch_size: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    scope: Option<RecordScope>,
    #[serde(skip_serializing_if = "Option::is_none")]
    failure_policy: Option<FailurePolicy>,
}

#[derive(Serialize, Default)]
struct TokenizerOverrides<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    file: Option<&'a PathBuf>,
}

#[derive(Serialize, Default)]
struct LoggingOverrides<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    level: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    log_dir: Option<&'a PathBuf>,
}

#[derive(Serialize)]
struct OverrideTree<'a> {
    inference: InferenceOverrides<'a>,
    graph: GraphOverrides<'a>,
    pipeline: PipelineOverrides,
    tokenizer: TokenizerOverrides<'a>,
    logging: LoggingOverrides<'a>,
}

impl Serialize for ConfigOverrides {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        OverrideTree {
            inference: InferenceOverrides {
                url: self.hf_url.as_deref(),
                token: self.hf_token.as_deref(),
                dimensions: self.hf_dim,
                max_tokens_per_item: self.hf_tpe,
            },
            graph: GraphOverrides {
                uri: self.neo4j_uri.as_deref(),
                user: self.neo4j_user.as_deref(),
                password: self.neo4j_pass.as_deref(),
                index_name: self.index_name.as_deref(),
            },
            pipeline: PipelineOverrides {
                batch_size: self.batch_size,
                scope: self.scope.map(RecordScope::from),
                failure_policy: self.strict.then_some(FailurePolicy::Strict),
            },
            tokenizer: TokenizerOverrides {
                file: self.tokenizer_file.as_ref(),
            },
            logging: LoggingOverrides {
                level: self.log_level.as_deref(),
                log_dir: self.log_dir.as_ref(),
            },
        }
        .serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_unset_overrides_serialize_to_empty_sections() {
        let json = serde_json::to_value(ConfigOverrides::default()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "inference": {},
                "graph": {},
                "pipeline": {},
                "tokenizer": {},
                "logging": {}
            })
        );
    }

    #[test]
    fn test_overrides_map_onto_config_sections() {
        let overrides = ConfigOverrides {
            hf_url: Some("http://localhost/embed".to_string()),
            hf_dim: Some(384),
            hf_tpe: Some(512),
            neo4j_pass: Some("secret".to_string()),
            scope: Some(ScopeArg::All),
            strict: true,
            ..ConfigOverrides::default()
        };
        let json = serde_json::to_value(&overrides).unwrap();

        assert_eq!(json["inference"]["url"], "http://localhost/embed");
        assert_eq!(json["inference"]["dimensions"], 384);
        assert_eq!(json["inference"]["max_tokens_per_item"], 512);
        assert_eq!(json["graph"]["password"], "secret");
        assert_eq!(json["pipeline"]["scope"], "all");
        assert_eq!(json["pipeline"]["failure_policy"], "strict");
        assert!(json["inference"].get("token").is_none());
    }
}
