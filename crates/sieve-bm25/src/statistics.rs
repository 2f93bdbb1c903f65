use std::collections::HashMap;

use futures::{Stream, StreamExt};
use serde::{Deserialize, Serialize};
use sieve_core::Tokenizer;

use crate::cache::{ProcessedDocument, TokenCache};

/// Corpus-wide term statistics used for IDF and length normalization.
///
/// Immutable once built. Build it once over a static corpus with
/// [`compute_corpus_statistics`] and share it (behind an `Arc`) across any
/// number of queries and tasks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CorpusStatistics {
    document_frequency: HashMap<String, usize>,
    total_documents: usize,
    average_document_length: f64,
}

impl CorpusStatistics {
    /// Statistics over an in-memory collection of processed documents.
    pub fn from_documents<'a, I>(documents: I) -> Self
    where
        I: IntoIterator<Item = &'a ProcessedDocument>,
    {
        let mut builder = CorpusStatisticsBuilder::new();
        for document in documents {
            builder.add(document);
        }
        builder.build()
    }

    /// Number of documents containing `term` (0 if unseen).
    pub fn document_frequency(&self, term: &str) -> usize {
        self.document_frequency.get(term).copied().unwrap_or(0)
    }

    pub fn total_documents(&self) -> usize {
        self.total_documents
    }

    pub fn average_document_length(&self) -> f64 {
        self.average_document_length
    }

    /// Number of distinct terms.
    pub fn vocabulary_size(&self) -> usize {
        self.document_frequency.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total_documents == 0
    }
}

/// One-pass accumulator for [`CorpusStatistics`].
#[derive(Debug, Default)]
pub struct CorpusStatisticsBuilder {
    document_frequency: HashMap<String, usize>,
    total_documents: usize,
    total_length: u64,
}

impl CorpusStatisticsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Account for one document. Each distinct term counts once.
    pub fn add(&mut self, document: &ProcessedDocument) {
        self.total_documents += 1;
        self.total_length += document.length as u64;
        for term in document.term_frequency.keys() {
            *self.document_frequency.entry(term.clone()).or_insert(0) += 1;
        }
    }

    pub fn build(self) -> CorpusStatistics {
        let average_document_length = if self.total_documents == 0 {
            0.0
        } else {
            self.total_length as f64 / self.total_documents as f64
        };
        CorpusStatistics {
            document_frequency: self.document_frequency,
            total_documents: self.total_documents,
            average_document_length,
        }
    }
}

/// Aggregate statistics over a document stream, consuming it exactly once.
///
/// Documents are tokenized through `cache`, so a later scoring pass over the
/// same texts hits the cache. A document whose tokenization fails still counts
/// towards the total, with length 0.
pub async fn compute_corpus_statistics<S>(
    documents: S,
    tokenizer: &dyn Tokenizer,
    cache: &TokenCache,
) -> CorpusStatistics
where
    S: Stream<Item = String> + Send,
{
    let mut builder = CorpusStatisticsBuilder::new();
    let mut documents = std::pin::pin!(documents);
    while let Some(text) = documents.next().await {
        match cache.get_or_tokenize(&text, tokenizer).await {
            Ok(processed) => builder.add(&processed),
            Err(e) => {
                tracing::warn!(error = %e, "tokenization failed while computing corpus statistics");
                builder.add(&ProcessedDocument::default());
            }
        }
    }
    let statistics = builder.build();
    tracing::debug!(
        documents = statistics.total_documents(),
        vocabulary = statistics.vocabulary_size(),
        average_length = statistics.average_document_length(),
        "computed corpus statistics"
    );
    statistics
}
