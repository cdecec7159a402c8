use anyhow::{Context, Result};

use crate::cli::output::{ProgressBarSink, TableFormatter};
use crate::domain::models::Config;
use crate::services::{EmbeddingPipeline, PipelineSettings};

/// Handle the embed command: rebuild the index, then embed methods in scope
pub async fn execute(config: &Config, json: bool, quiet: bool) -> Result<()> {
    let store = super::connect_store(config).await?;
    let embedder = super::build_embedder(config)?;
    let pipeline = EmbeddingPipeline::new(store, embedder, PipelineSettings::from_config(config));

    let progress = if json || quiet {
        ProgressBarSink::hidden()
    } else {
        ProgressBarSink::new()
    };

    let report = match pipeline.run(&progress).await {
        Ok(report) => report,
        Err(err) => {
            progress.abandon("run aborted");
            return Err(err).context("Embedding run failed");
        }
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", TableFormatter::new().format_report(&report));
    }

    Ok(())
}
