//! Pure BM25 scoring.
//!
//! ```text
//! idf(t) = ln(1 + (N - df(t) + 0.5) / (df(t) + 0.5))
//! tf(t)  = f(t) * (k1 + 1) / (f(t) + k1 * (1 - b + b * |D| / avgdl))
//! qtf(t) = qf(t) * (k3 + 1) / (qf(t) + k3)
//! score  = Σ idf(t) * tf(t) * qtf(t)     over query terms t
//! ```

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use sieve_core::SieveError;

use crate::statistics::CorpusStatistics;

/// Tunable BM25 parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Bm25Params {
    /// Term frequency saturation (default: 1.5).
    pub k1: f64,
    /// Document length normalization, 0 = none, 1 = full (default: 0.75).
    pub b: f64,
    /// Query term frequency saturation (default: 1000, effectively off).
    pub k3: f64,
}

impl Default for Bm25Params {
    fn default() -> Self {
        Self {
            k1: 1.5,
            b: 0.75,
            k3: 1000.0,
        }
    }
}

impl Bm25Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Titles, tweets and other short texts: weaker length penalty.
    pub fn for_short_docs() -> Self {
        Self {
            k1: 1.2,
            b: 0.3,
            ..Self::default()
        }
    }

    /// Code and API docs, where repeated identifiers matter.
    pub fn for_technical() -> Self {
        Self {
            k1: 2.0,
            b: 0.5,
            ..Self::default()
        }
    }

    pub fn with_k1(mut self, k1: f64) -> Self {
        self.k1 = k1;
        self
    }

    pub fn with_b(mut self, b: f64) -> Self {
        self.b = b;
        self
    }

    pub fn with_k3(mut self, k3: f64) -> Self {
        self.k3 = k3;
        self
    }

    pub fn validate(&self) -> Result<(), SieveError> {
        if !self.k1.is_finite() || self.k1 < 0.0 {
            return Err(SieveError::InvalidArgument(format!(
                "k1 must be a finite non-negative number, got {}",
                self.k1
            )));
        }
        if !(0.0..=1.0).contains(&self.b) {
            return Err(SieveError::InvalidArgument(format!(
                "b must be within [0, 1], got {}",
                self.b
            )));
        }
        if !self.k3.is_finite() || self.k3 < 0.0 {
            return Err(SieveError::InvalidArgument(format!(
                "k3 must be a finite non-negative number, got {}",
                self.k3
            )));
        }
        Ok(())
    }
}

/// Inverse document frequency of a term found in `document_frequency` of
/// `total_documents` documents. Positive whenever `df <= N`; never NaN.
pub fn idf(document_frequency: usize, total_documents: usize) -> f64 {
    let n = total_documents as f64;
    let df = document_frequency as f64;
    ((n - df + 0.5).max(0.0) / (df + 0.5)).ln_1p()
}

/// BM25 score of one document for one query.
///
/// Terms missing from the document or from the corpus contribute nothing.
/// With an average document length of 0 the length normalization factor is 1.
pub fn bm25_score(
    query_term_frequency: &HashMap<String, usize>,
    document_term_frequency: &HashMap<String, usize>,
    document_length: usize,
    statistics: &CorpusStatistics,
    params: &Bm25Params,
) -> f64 {
    let average_length = statistics.average_document_length();
    let normalization = if average_length > 0.0 {
        1.0 - params.b + params.b * document_length as f64 / average_length
    } else {
        1.0
    };

    // Fixed summation order keeps repeated scores bit-identical.
    let mut terms: Vec<(&String, &usize)> = query_term_frequency.iter().collect();
    terms.sort_unstable_by(|a, b| a.0.cmp(b.0));

    let mut score = 0.0;
    for (term, &query_frequency) in terms {
        let frequency = match document_term_frequency.get(term) {
            Some(&f) if f > 0 => f as f64,
            _ => continue,
        };
        let document_frequency = statistics.document_frequency(term);
        if document_frequency == 0 || query_frequency == 0 {
            continue;
        }

        let idf = idf(document_frequency, statistics.total_documents());
        let tf = frequency * (params.k1 + 1.0) / (frequency + params.k1 * normalization);
        let qf = query_frequency as f64;
        let qtf = qf * (params.k3 + 1.0) / (qf + params.k3);
        score += idf * tf * qtf;
    }
    score
}
