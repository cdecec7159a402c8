use codembed::domain::ports::Tokenizer;
use codembed::infrastructure::tokenizer::BpeTokenizer;
use proptest::prelude::*;
use std::sync::LazyLock;

static TOKENIZER: LazyLock<BpeTokenizer> =
    LazyLock::new(|| BpeTokenizer::cl100k().expect("cl100k tokenizer should load"));

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Property: truncated text fits the budget
    #[test]
    fn prop_truncation_fits_budget(text in "\\PC{0,300}", budget in 0usize..48) {
        let truncated = TOKENIZER.truncate_to_budget(&text, budget).unwrap();
        prop_assert!(TOKENIZER.count_tokens(truncated.text()).unwrap() <= budget);
    }

    /// Property: truncating twice gives the same text as truncating once
    #[test]
    fn prop_truncation_is_idempotent(text in "\\PC{0,300}", budget in 0usize..48) {
        let once = TOKENIZER.truncate_to_budget(&text, budget).unwrap().into_text();
        let twice = TOKENIZER.truncate_to_budget(&once, budget).unwrap();
        prop_assert!(!twice.was_truncated());
        prop_assert_eq!(twice.text(), once.as_str());
    }

    /// Property: text within budget comes back untouched
    #[test]
    fn prop_short_text_unchanged(text in "[a-z ]{0,40}") {
        let tokens = TOKENIZER.count_tokens(&text).unwrap();
        let result = TOKENIZER.truncate_to_budget(&text, tokens).unwrap();
        prop_assert!(!result.was_truncated());
        prop_assert_eq!(result.text(), text.as_str());
    }
}

#[test]
fn test_source_code_truncates_to_exact_budget() {
    let method = "public int add(int a, int b) { return a + b; }\n".repeat(60);
    let truncated = TOKENIZER.truncate_to_budget(&method, 512).unwrap();

    assert!(truncated.was_truncated());
    assert!(method.starts_with(truncated.text()));
    let count = TOKENIZER.count_tokens(truncated.text()).unwrap();
    assert!(count <= 512);
    assert!(count >= 500, "prefix should stay close to the budget, got {count}");
}
