use sieve_bm25::{RegexTokenizer, WhitespaceTokenizer};
use sieve_core::{SieveError, Tokenizer};

#[tokio::test]
async fn whitespace_lowercases_and_trims_punctuation() {
    let tokens = WhitespaceTokenizer.tokenize("The Cat, sat!").await.unwrap();
    assert_eq!(tokens, vec!["the", "cat", "sat"]);
}

#[tokio::test]
async fn degenerate_inputs_yield_no_tokens() {
    let regex = RegexTokenizer::words().unwrap();
    for text in ["", "   \t\n", "!!! ??? ---"] {
        assert!(WhitespaceTokenizer.tokenize(text).await.unwrap().is_empty());
        assert!(regex.tokenize(text).await.unwrap().is_empty());
    }
}

#[tokio::test]
async fn regex_filters_stop_words_and_short_tokens() {
    let tokenizer = RegexTokenizer::words()
        .unwrap()
        .with_min_token_length(2)
        .with_english_stop_words();

    let tokens = tokenizer
        .tokenize("The quick fox is a friend of Rust")
        .await
        .unwrap();
    assert_eq!(tokens, vec!["quick", "fox", "friend", "rust"]);
}

#[tokio::test]
async fn regex_custom_pattern() {
    let tokenizer = RegexTokenizer::new(r"[a-z]+").unwrap();
    let tokens = tokenizer.tokenize("abc123def").await.unwrap();
    assert_eq!(tokens, vec!["abc", "def"]);
}

#[test]
fn invalid_pattern_is_rejected() {
    let err = RegexTokenizer::new("(unclosed").unwrap_err();
    assert!(matches!(err, SieveError::InvalidArgument(_)));
}

#[test]
fn ids_reflect_settings() {
    let plain = RegexTokenizer::words().unwrap();
    let filtered = RegexTokenizer::words().unwrap().with_english_stop_words();
    let long_only = RegexTokenizer::words().unwrap().with_min_token_length(3);

    assert_ne!(plain.id(), filtered.id());
    assert_ne!(plain.id(), long_only.id());
    assert_ne!(plain.id(), WhitespaceTokenizer.id());
    let again = RegexTokenizer::words().unwrap().with_english_stop_words();
    assert_eq!(filtered.id(), again.id());
}
