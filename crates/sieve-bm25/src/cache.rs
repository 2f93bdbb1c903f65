use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use sieve_core::{SieveError, Tokenizer};
use tokio::sync::RwLock;

/// Stable fingerprint of a text blob.
pub fn fingerprint(text: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    text.hash(&mut hasher);
    hasher.finish()
}

/// Cache key of `text` as tokenized by the tokenizer with id `tokenizer_id`.
pub fn cache_key(tokenizer_id: &str, text: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    tokenizer_id.hash(&mut hasher);
    text.hash(&mut hasher);
    hasher.finish()
}

/// Tokenized form of a text blob.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessedDocument {
    /// Normalized terms in document order.
    pub tokens: Vec<String>,
    /// Occurrences of each distinct term.
    pub term_frequency: HashMap<String, usize>,
    /// Number of tokens.
    pub length: usize,
}

impl ProcessedDocument {
    pub fn from_tokens(tokens: Vec<String>) -> Self {
        let term_frequency = term_frequencies(&tokens);
        Self {
            length: tokens.len(),
            tokens,
            term_frequency,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }
}

/// Count occurrences of each term.
pub fn term_frequencies(tokens: &[String]) -> HashMap<String, usize> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for token in tokens {
        *counts.entry(token.clone()).or_insert(0) += 1;
    }
    counts
}

/// Hit/miss counters of a [`TokenCache`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

/// Memoizes tokenizer output keyed by tokenizer id and content fingerprint.
///
/// Scorers with different tokenizers may share one cache; their entries live
/// under different keys. Safe to share between concurrent scorers. The tokenizer runs outside the
/// lock, so two tasks missing on the same key may both tokenize; the last
/// write wins, which is harmless because tokenization is deterministic.
/// Entries never expire; call [`clear`](TokenCache::clear) to drop them.
#[derive(Debug, Default)]
pub struct TokenCache {
    entries: RwLock<HashMap<u64, Arc<ProcessedDocument>>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl TokenCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up an entry without computing it.
    pub async fn get(&self, key: u64) -> Option<Arc<ProcessedDocument>> {
        self.entries.read().await.get(&key).cloned()
    }

    /// Return the cached entry for `key`, tokenizing `text` on a miss.
    ///
    /// Tokenizer errors are returned and nothing is cached for the key.
    pub async fn get_or_compute(
        &self,
        key: u64,
        text: &str,
        tokenizer: &dyn Tokenizer,
    ) -> Result<Arc<ProcessedDocument>, SieveError> {
        let cached = self.entries.read().await.get(&key).cloned();
        if let Some(entry) = cached {
            self.hits.fetch_add(1, Ordering::Relaxed);
            tracing::trace!(key, "token cache hit");
            return Ok(entry);
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(key, "token cache miss");
        let tokens = tokenizer.tokenize(text).await?;
        let entry = Arc::new(ProcessedDocument::from_tokens(tokens));
        self.entries.write().await.insert(key, Arc::clone(&entry));
        Ok(entry)
    }

    /// [`get_or_compute`](TokenCache::get_or_compute) keyed by [`cache_key`].
    pub async fn get_or_tokenize(
        &self,
        text: &str,
        tokenizer: &dyn Tokenizer,
    ) -> Result<Arc<ProcessedDocument>, SieveError> {
        self.get_or_compute(cache_key(tokenizer.id(), text), text, tokenizer)
            .await
    }

    /// Drop every entry. Counters are kept.
    pub async fn clear(&self) {
        let mut entries = self.entries.write().await;
        tracing::debug!(entries = entries.len(), "clearing token cache");
        entries.clear();
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fingerprint_is_content_based() {
        assert_eq!(fingerprint("the cat sat"), fingerprint("the cat sat"));
        assert_ne!(fingerprint("the cat sat"), fingerprint("the cat sat "));
    }

    #[test]
    fn cache_key_depends_on_tokenizer() {
        assert_eq!(cache_key("a", "the cat"), cache_key("a", "the cat"));
        assert_ne!(cache_key("a", "the cat"), cache_key("b", "the cat"));
        // The boundary between id and text is part of the key.
        assert_ne!(cache_key("ab", "c"), cache_key("a", "bc"));
    }

    #[test]
    fn processed_document_counts_terms() {
        let doc = ProcessedDocument::from_tokens(
            ["a", "b", "a"].iter().map(|s| s.to_string()).collect(),
        );
        assert_eq!(doc.length, 3);
        assert_eq!(doc.term_frequency["a"], 2);
        assert_eq!(doc.term_frequency["b"], 1);
        assert!(!doc.is_empty());
    }
}
