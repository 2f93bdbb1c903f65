//! BM25 relevance scoring for Sieve.
//!
//! Scores a streamed candidate set against a query using Okapi BM25 with
//! query-term saturation (`k3`). Tokenization goes through an external
//! [`Tokenizer`](sieve_core::Tokenizer) and is memoized in a [`TokenCache`].
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use futures::stream;
//! use sieve_bm25::{Bm25Scorer, Bm25Stage, WhitespaceTokenizer};
//! use sieve_core::RankingStageExt;
//!
//! let scorer = Bm25Scorer::new(Arc::new(WhitespaceTokenizer));
//! let corpus = vec!["the cat sat".to_string(), "the dog ran".to_string()];
//! let statistics = Arc::new(scorer.compute_statistics(stream::iter(corpus.clone())).await);
//! let stage = Bm25Stage::with_statistics(scorer, statistics);
//! let top = stage.rank("cat", stream::iter(corpus), 1);
//! ```

mod cache;
mod scorer;
mod scoring;
mod statistics;
mod tokenizer;

pub use cache::{
    cache_key, fingerprint, term_frequencies, CacheStats, ProcessedDocument, TokenCache,
};
pub use scorer::{Bm25Scorer, Bm25Stage, StatisticsSource};
pub use scoring::{bm25_score, idf, Bm25Params};
pub use statistics::{compute_corpus_statistics, CorpusStatistics, CorpusStatisticsBuilder};
pub use tokenizer::{RegexTokenizer, WhitespaceTokenizer, ENGLISH_STOP_WORDS, WORD_PATTERN};
