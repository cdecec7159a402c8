use anyhow::{Context, Result};

use crate::cli::output::progress::create_spinner_with_message;
use crate::cli::output::TableFormatter;
use crate::domain::models::Config;
use crate::services::SimilaritySearch;

/// Handle the search command
pub async fn execute(config: &Config, query: &str, top: usize, json: bool, quiet: bool) -> Result<()> {
    let store = super::connect_store(config).await?;
    let embedder = super::build_embedder(config)?;
    let search = SimilaritySearch::new(store, embedder, config.graph.index_name.clone());

    let spinner = (!json && !quiet).then(|| create_spinner_with_message("Searching..."));
    let result = search.search(query, top).await;
    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }
    let matches = result.context("Similarity search failed")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&matches)?);
    } else if matches.is_empty() {
        println!("No similar methods found.");
    } else {
        println!("{}", TableFormatter::new().format_matches(&matches));
        println!(
            "\nShowing {} match{}",
            matches.len(),
            if matches.len() == 1 { "" } else { "es" }
        );
    }

    Ok(())
}
