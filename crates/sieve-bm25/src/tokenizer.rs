use std::collections::HashSet;

use async_trait::async_trait;
use regex::Regex;
use sieve_core::{SieveError, Tokenizer};

/// Default word pattern for [`RegexTokenizer`].
pub const WORD_PATTERN: &str = r"\w+";

/// Common English stop words.
pub const ENGLISH_STOP_WORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "by", "for", "from", "has", "he", "in", "is", "it",
    "its", "of", "on", "or", "that", "the", "to", "was", "were", "will", "with", "this", "but",
    "they", "have", "had", "what", "when", "where", "who", "which", "you", "your", "we", "our",
    "can", "all", "there", "their", "been", "would", "could", "should", "may", "might", "must",
    "do", "does", "did", "if", "not", "no", "so", "up", "out", "just", "than", "then", "too",
    "very", "also",
];

/// Splits on whitespace, lowercases, and strips leading/trailing punctuation.
#[derive(Debug, Clone, Copy, Default)]
pub struct WhitespaceTokenizer;

impl WhitespaceTokenizer {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Tokenizer for WhitespaceTokenizer {
    async fn tokenize(&self, text: &str) -> Result<Vec<String>, SieveError> {
        Ok(text
            .split_whitespace()
            .map(|word| word.trim_matches(|c: char| !c.is_alphanumeric()))
            .filter(|word| !word.is_empty())
            .map(str::to_lowercase)
            .collect())
    }
}

/// Regex-driven tokenizer with optional stop-word filtering.
///
/// Every match of the pattern becomes a lowercase token; tokens shorter than
/// `min_token_length` characters or listed as stop words are dropped.
#[derive(Debug, Clone)]
pub struct RegexTokenizer {
    pattern: Regex,
    min_token_length: usize,
    stop_words: HashSet<String>,
    id: String,
}

impl RegexTokenizer {
    /// Create a tokenizer for the given pattern.
    ///
    /// Returns an error if the pattern is not a valid regex.
    pub fn new(pattern: &str) -> Result<Self, SieveError> {
        let pattern = Regex::new(pattern)
            .map_err(|e| SieveError::InvalidArgument(format!("invalid token pattern: {e}")))?;
        Ok(Self {
            pattern,
            min_token_length: 1,
            stop_words: HashSet::new(),
            id: String::new(),
        }
        .with_refreshed_id())
    }

    /// Unicode word tokenizer (`\w+`).
    pub fn words() -> Result<Self, SieveError> {
        Self::new(WORD_PATTERN)
    }

    pub fn with_min_token_length(mut self, min_token_length: usize) -> Self {
        self.min_token_length = min_token_length;
        self.with_refreshed_id()
    }

    pub fn with_stop_words<I, S>(mut self, stop_words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.stop_words = stop_words
            .into_iter()
            .map(|w| w.into().to_lowercase())
            .collect();
        self.with_refreshed_id()
    }

    pub fn with_english_stop_words(self) -> Self {
        self.with_stop_words(ENGLISH_STOP_WORDS.iter().copied())
    }

    fn with_refreshed_id(mut self) -> Self {
        let mut stop_words: Vec<&str> = self.stop_words.iter().map(String::as_str).collect();
        stop_words.sort_unstable();
        self.id = format!(
            "regex:{}:min={}:stop={}",
            self.pattern.as_str(),
            self.min_token_length,
            stop_words.join(",")
        );
        self
    }
}

#[async_trait]
impl Tokenizer for RegexTokenizer {
    async fn tokenize(&self, text: &str) -> Result<Vec<String>, SieveError> {
        Ok(self
            .pattern
            .find_iter(text)
            .map(|m| m.as_str().to_lowercase())
            .filter(|token| token.chars().count() >= self.min_token_length)
            .filter(|token| !self.stop_words.contains(token))
            .collect())
    }

    fn id(&self) -> &str {
        &self.id
    }
}
