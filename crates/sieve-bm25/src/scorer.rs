use std::collections::HashMap;
use std::sync::Arc;

use futures::{Stream, StreamExt};
use sieve_core::{
    is_blank_query, sanitize_score, Candidate, CandidateStream, RankingStage, ScoredDocument,
    ScoredStream, SieveError, Tokenizer,
};

use crate::cache::{ProcessedDocument, TokenCache};
use crate::scoring::{bm25_score, Bm25Params};
use crate::statistics::{compute_corpus_statistics, CorpusStatistics, CorpusStatisticsBuilder};

/// BM25 scorer over a candidate stream.
///
/// Owns its tokenizer and a [`TokenCache`]. The cache is created with the
/// scorer unless one is shared in through [`with_cache`](Bm25Scorer::with_cache).
///
/// Two entry points, chosen explicitly by the caller:
/// - [`score_with_statistics`](Bm25Scorer::score_with_statistics): single
///   pass against precomputed corpus statistics, constant memory.
/// - [`score_ad_hoc`](Bm25Scorer::score_ad_hoc): materializes the candidates
///   to derive local statistics, then scores them.
pub struct Bm25Scorer {
    tokenizer: Arc<dyn Tokenizer>,
    cache: Arc<TokenCache>,
    params: Bm25Params,
}

impl Bm25Scorer {
    /// Create a scorer with default parameters (k1=1.5, b=0.75, k3=1000).
    pub fn new(tokenizer: Arc<dyn Tokenizer>) -> Self {
        Self {
            tokenizer,
            cache: Arc::new(TokenCache::new()),
            params: Bm25Params::default(),
        }
    }

    /// Create a scorer with custom parameters.
    ///
    /// Returns an error if the parameters are out of range.
    pub fn with_params(
        tokenizer: Arc<dyn Tokenizer>,
        params: Bm25Params,
    ) -> Result<Self, SieveError> {
        params.validate()?;
        Ok(Self {
            params,
            ..Self::new(tokenizer)
        })
    }

    /// Share a token cache with other scorers.
    pub fn with_cache(mut self, cache: Arc<TokenCache>) -> Self {
        self.cache = cache;
        self
    }

    pub fn params(&self) -> &Bm25Params {
        &self.params
    }

    pub fn cache(&self) -> &Arc<TokenCache> {
        &self.cache
    }

    pub async fn clear_cache(&self) {
        self.cache.clear().await;
    }

    /// Tokenize `text` through the cache.
    pub async fn process(&self, text: &str) -> Result<Arc<ProcessedDocument>, SieveError> {
        self.cache.get_or_tokenize(text, self.tokenizer.as_ref()).await
    }

    /// Precompute statistics over a corpus with this scorer's tokenizer,
    /// warming its cache on the way.
    pub async fn compute_statistics<S>(&self, documents: S) -> CorpusStatistics
    where
        S: Stream<Item = String> + Send,
    {
        compute_corpus_statistics(documents, self.tokenizer.as_ref(), &self.cache).await
    }

    /// Term frequencies of the query, or `None` when nothing can match.
    async fn query_terms(&self, query: &str) -> Option<HashMap<String, usize>> {
        if is_blank_query(query) {
            return None;
        }
        match self.process(query).await {
            Ok(processed) if !processed.is_empty() => Some(processed.term_frequency.clone()),
            Ok(_) => None,
            Err(e) => {
                tracing::warn!(error = %e, "query tokenization failed, scoring all documents 0");
                None
            }
        }
    }

    fn score_processed(
        &self,
        query: &HashMap<String, usize>,
        document: &ProcessedDocument,
        statistics: &CorpusStatistics,
    ) -> f64 {
        sanitize_score(bm25_score(
            query,
            &document.term_frequency,
            document.length,
            statistics,
            &self.params,
        ))
    }

    async fn score_candidate(
        &self,
        query: &HashMap<String, usize>,
        candidate: &Candidate,
        statistics: &CorpusStatistics,
    ) -> f64 {
        match self.process(&candidate.text).await {
            Ok(document) => self.score_processed(query, &document, statistics),
            Err(e) => {
                tracing::warn!(
                    index = candidate.index,
                    error = %e,
                    "document tokenization failed, using 0"
                );
                0.0
            }
        }
    }

    /// Score candidates in a single pass against precomputed statistics.
    ///
    /// Output order matches input order.
    pub fn score_with_statistics<'a>(
        &'a self,
        query: &'a str,
        candidates: CandidateStream<'a>,
        statistics: Arc<CorpusStatistics>,
    ) -> ScoredStream<'a> {
        Box::pin(async_stream::stream! {
            let mut candidates = candidates;
            let query_terms = self.query_terms(query).await;
            while let Some(candidate) = candidates.next().await {
                let score = match &query_terms {
                    Some(terms) => self.score_candidate(terms, &candidate, &statistics).await,
                    None => 0.0,
                };
                yield ScoredDocument::from_candidate(candidate, score);
            }
        })
    }

    /// Score candidates using statistics derived from the candidates themselves.
    ///
    /// The whole candidate set is held in memory between the two passes.
    /// Output order matches input order.
    pub fn score_ad_hoc<'a>(
        &'a self,
        query: &'a str,
        candidates: CandidateStream<'a>,
    ) -> ScoredStream<'a> {
        Box::pin(async_stream::stream! {
            let mut candidates = candidates;
            match self.query_terms(query).await {
                None => {
                    while let Some(candidate) = candidates.next().await {
                        yield ScoredDocument::from_candidate(candidate, 0.0);
                    }
                }
                Some(terms) => {
                    let mut builder = CorpusStatisticsBuilder::new();
                    let mut materialized = Vec::new();
                    while let Some(candidate) = candidates.next().await {
                        let processed = match self.process(&candidate.text).await {
                            Ok(processed) => {
                                builder.add(&processed);
                                Some(processed)
                            }
                            Err(e) => {
                                tracing::warn!(
                                    index = candidate.index,
                                    error = %e,
                                    "document tokenization failed, using 0"
                                );
                                builder.add(&ProcessedDocument::default());
                                None
                            }
                        };
                        materialized.push((candidate, processed));
                    }

                    let statistics = builder.build();
                    tracing::debug!(
                        documents = statistics.total_documents(),
                        average_length = statistics.average_document_length(),
                        "derived ad hoc corpus statistics"
                    );
                    for (candidate, processed) in materialized {
                        let score = match processed {
                            Some(document) => self.score_processed(&terms, &document, &statistics),
                            None => 0.0,
                        };
                        yield ScoredDocument::from_candidate(candidate, score);
                    }
                }
            }
        })
    }
}

/// Where a [`Bm25Stage`] takes its corpus statistics from.
#[derive(Debug, Clone)]
pub enum StatisticsSource {
    /// Statistics computed ahead of time over the full corpus.
    Precomputed(Arc<CorpusStatistics>),
    /// Statistics derived from each candidate set (two passes).
    AdHoc,
}

/// BM25 as a [`RankingStage`].
pub struct Bm25Stage {
    name: String,
    scorer: Bm25Scorer,
    statistics: StatisticsSource,
}

impl Bm25Stage {
    /// A stage deriving statistics from each candidate set.
    pub fn new(scorer: Bm25Scorer) -> Self {
        Self {
            name: "bm25".to_string(),
            scorer,
            statistics: StatisticsSource::AdHoc,
        }
    }

    /// A stage scoring against precomputed statistics.
    pub fn with_statistics(scorer: Bm25Scorer, statistics: Arc<CorpusStatistics>) -> Self {
        Self {
            statistics: StatisticsSource::Precomputed(statistics),
            ..Self::new(scorer)
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn scorer(&self) -> &Bm25Scorer {
        &self.scorer
    }

    pub fn statistics(&self) -> &StatisticsSource {
        &self.statistics
    }
}

impl RankingStage for Bm25Stage {
    fn name(&self) -> &str {
        &self.name
    }

    fn score_candidates<'a>(
        &'a self,
        query: &'a str,
        candidates: CandidateStream<'a>,
    ) -> ScoredStream<'a> {
        match &self.statistics {
            StatisticsSource::Precomputed(statistics) => {
                self.scorer
                    .score_with_statistics(query, candidates, Arc::clone(statistics))
            }
            StatisticsSource::AdHoc => self.scorer.score_ad_hoc(query, candidates),
        }
    }
}
