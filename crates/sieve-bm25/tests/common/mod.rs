use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use sieve_bm25::WhitespaceTokenizer;
use sieve_core::{SieveError, Tokenizer};

/// Whitespace tokenizer that counts calls and fails on texts containing "poison".
#[derive(Default)]
pub struct CountingTokenizer {
    calls: AtomicUsize,
}

impl CountingTokenizer {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Tokenizer for CountingTokenizer {
    async fn tokenize(&self, text: &str) -> Result<Vec<String>, SieveError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if text.contains("poison") {
            return Err(SieveError::Tokenizer("poisoned input".into()));
        }
        WhitespaceTokenizer.tokenize(text).await
    }
}

#[allow(dead_code)]
pub fn strings(texts: &[&str]) -> Vec<String> {
    texts.iter().map(|s| s.to_string()).collect()
}
