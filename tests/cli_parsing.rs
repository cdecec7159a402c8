use clap::Parser;
use codembed::cli::types::ScopeArg;
use codembed::cli::{Cli, Commands};

/// Environment variables clap reads for overrides
const OVERRIDE_VARS: [&str; 7] = [
    "HF_URL",
    "HF_TOKEN",
    "HF_DIM",
    "HF_TPE",
    "NEO4J_URI",
    "NEO4J_USER",
    "NEO4J_PASS",
];

fn parse(args: &[&str]) -> Cli {
    temp_env::with_vars_unset(OVERRIDE_VARS, || Cli::try_parse_from(args).unwrap())
}

#[test]
fn test_parse_embed_with_original_flags() {
    let cli = parse(&[
        "codembed",
        "embed",
        "--hf-url",
        "https://api-inference.example/models/minilm",
        "--hf-token",
        "hf_abc",
        "--hf-dim",
        "384",
        "--hf-tpe",
        "512",
        "--neo4j-uri",
        "bolt://localhost:7687",
        "--neo4j-user",
        "neo4j",
        "--neo4j-pass",
        "secret",
    ]);

    assert!(matches!(cli.command, Commands::Embed));
    assert_eq!(
        cli.overrides.hf_url.as_deref(),
        Some("https://api-inference.example/models/minilm")
    );
    assert_eq!(cli.overrides.hf_dim, Some(384));
    assert_eq!(cli.overrides.hf_tpe, Some(512));
    assert_eq!(cli.overrides.neo4j_pass.as_deref(), Some("secret"));
    assert!(!cli.json);
}

#[test]
fn test_parse_search() {
    let cli = parse(&["codembed", "search", "read a file line by line", "--top", "5", "--json"]);

    match cli.command {
        Commands::Search { query, top } => {
            assert_eq!(query, "read a file line by line");
            assert_eq!(top, 5);
        }
        _ => panic!("Wrong command"),
    }
    assert!(cli.json);
}

#[test]
fn test_search_top_defaults_to_ten() {
    let cli = parse(&["codembed", "search", "sort"]);
    assert!(matches!(cli.command, Commands::Search { top: 10, .. }));
}

#[test]
fn test_global_flags_before_subcommand() {
    let cli = parse(&[
        "codembed",
        "--config",
        "custom.yaml",
        "--quiet",
        "--batch-size",
        "10",
        "--scope",
        "all",
        "--strict",
        "index",
    ]);

    assert!(matches!(cli.command, Commands::Index));
    assert_eq!(cli.config.as_deref(), Some(std::path::Path::new("custom.yaml")));
    assert!(cli.quiet);
    assert_eq!(cli.overrides.batch_size, Some(10));
    assert_eq!(cli.overrides.scope, Some(ScopeArg::All));
    assert!(cli.overrides.strict);
}

#[test]
fn test_overrides_read_from_environment() {
    let cli = temp_env::with_vars(
        [
            ("HF_TOKEN", Some("hf_from_env")),
            ("NEO4J_URI", Some("bolt://db:7687")),
            ("HF_URL", None),
            ("HF_DIM", None),
            ("HF_TPE", None),
            ("NEO4J_USER", None),
            ("NEO4J_PASS", None),
        ],
        || Cli::try_parse_from(["codembed", "embed"]).unwrap(),
    );

    assert_eq!(cli.overrides.hf_token.as_deref(), Some("hf_from_env"));
    assert_eq!(cli.overrides.neo4j_uri.as_deref(), Some("bolt://db:7687"));
    assert!(cli.overrides.hf_url.is_none());
}

#[test]
fn test_invalid_dimension_rejected() {
    let result = temp_env::with_vars_unset(OVERRIDE_VARS, || {
        Cli::try_parse_from(["codembed", "embed", "--hf-dim", "many"])
    });
    assert!(result.is_err());
}

#[test]
fn test_missing_subcommand_rejected() {
    let result = temp_env::with_vars_unset(OVERRIDE_VARS, || Cli::try_parse_from(["codembed"]));
    assert!(result.is_err());
}
