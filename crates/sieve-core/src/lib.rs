//! Core traits and types for Sieve.
//!
//! Everything a ranking stage needs to agree on lives here: the candidate and
//! scored-document types flowing between stages, the [`RankingStage`]
//! capability, the [`Tokenizer`] boundary, the bounded [`TopN`] selector and
//! the shared [`SieveError`] type.

mod stage;
mod top_n;

pub use stage::{FnStage, RankingStage, RankingStageExt};
pub use top_n::TopN;

use std::cmp::Ordering;
use std::pin::Pin;

use async_trait::async_trait;
use futures::Stream;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// SieveError
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum SieveError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("tokenizer error: {0}")]
    Tokenizer(String),
    #[error("judge error: {0}")]
    Judge(String),
    #[error("parsing error: {0}")]
    Parsing(String),
    #[error("timeout: {0}")]
    Timeout(String),
}

// ---------------------------------------------------------------------------
// Candidate / ScoredDocument
// ---------------------------------------------------------------------------

/// A document entering a ranking stage.
///
/// `index` is the document's position in the caller's original input stream.
/// Stages must carry it through unchanged so results can be matched back to
/// the caller's records and ties can be broken deterministically.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub index: usize,
    pub text: String,
}

impl Candidate {
    pub fn new(index: usize, text: impl Into<String>) -> Self {
        Self {
            index,
            text: text.into(),
        }
    }
}

/// A document paired with the score a stage assigned to it.
///
/// BM25 scores are unbounded (but non-negative); judge scores are in `[0, 1]`.
/// Nothing normalizes between the two.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredDocument<D = String> {
    pub index: usize,
    pub document: D,
    pub score: f64,
}

impl<D> ScoredDocument<D> {
    pub fn new(index: usize, document: D, score: f64) -> Self {
        Self {
            index,
            document,
            score,
        }
    }

    /// Replace the document payload, keeping index and score.
    pub fn map<E>(self, f: impl FnOnce(D) -> E) -> ScoredDocument<E> {
        ScoredDocument {
            index: self.index,
            document: f(self.document),
            score: self.score,
        }
    }
}

impl ScoredDocument<String> {
    /// Score a candidate, keeping its original index and text.
    pub fn from_candidate(candidate: Candidate, score: f64) -> Self {
        Self::new(candidate.index, candidate.text, score)
    }

    /// Turn a scored text back into a candidate for the next stage.
    pub fn into_candidate(self) -> Candidate {
        Candidate::new(self.index, self.document)
    }
}

/// Pinned, boxed stream of candidates fed into a stage.
pub type CandidateStream<'a> = Pin<Box<dyn Stream<Item = Candidate> + Send + 'a>>;

/// Pinned, boxed stream of scored documents emitted by a stage.
pub type ScoredStream<'a, D = String> = Pin<Box<dyn Stream<Item = ScoredDocument<D>> + Send + 'a>>;

/// Orders two scored documents: higher score first, then lower original index.
pub fn compare_scored<D>(a: &ScoredDocument<D>, b: &ScoredDocument<D>) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| a.index.cmp(&b.index))
}

/// Sort by score descending; equal scores keep original stream order.
pub fn sort_by_score<D>(items: &mut [ScoredDocument<D>]) {
    items.sort_by(compare_scored);
}

/// Map NaN and negative scores to zero. Infinite scores pass through.
pub fn sanitize_score(score: f64) -> f64 {
    if score.is_nan() || score < 0.0 {
        0.0
    } else {
        score
    }
}

/// True when the query carries no text to match against.
pub fn is_blank_query(query: &str) -> bool {
    query.trim().is_empty()
}

// ---------------------------------------------------------------------------
// Tokenizer trait
// ---------------------------------------------------------------------------

/// Linguistic preprocessing boundary.
///
/// Implementations must be deterministic for identical input and return an
/// empty sequence for empty, whitespace-only or symbol-only text.
#[async_trait]
pub trait Tokenizer: Send + Sync {
    /// Split `text` into an ordered sequence of normalized terms.
    async fn tokenize(&self, text: &str) -> Result<Vec<String>, SieveError>;

    /// Identity of this tokenizer and its settings, used to namespace shared
    /// token caches. Two tokenizers that can produce different terms for the
    /// same text must return different ids.
    fn id(&self) -> &str {
        std::any::type_name::<Self>()
    }
}
