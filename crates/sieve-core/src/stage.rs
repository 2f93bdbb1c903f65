use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, PoisonError};

use futures::{Stream, StreamExt};

use crate::{
    is_blank_query, sanitize_score, Candidate, CandidateStream, ScoredDocument, ScoredStream,
    SieveError, TopN,
};

/// Something that can assign a relevance score to every candidate in a stream.
///
/// Implementations:
/// - BM25 lexical scoring (`sieve-bm25`)
/// - an external relevance judge such as an LLM (`sieve-judge`)
/// - a cascade of other stages (`sieve-cascade`)
/// - [`FnStage`] for ad hoc closures
///
/// Contract:
/// - emitted items keep the `index` of the candidate they were produced from;
/// - a stage that does not reorder emits in input order;
/// - scores are never NaN or negative, and a per-document failure yields
///   `0.0` instead of ending the stream;
/// - a blank query scores every candidate `0.0` without calling anything.
///
/// The stream is lazy and finite. Dropping it cancels any outstanding work.
pub trait RankingStage: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &str;

    /// Score every candidate against `query`.
    fn score_candidates<'a>(
        &'a self,
        query: &'a str,
        candidates: CandidateStream<'a>,
    ) -> ScoredStream<'a>;
}

impl<T: RankingStage + ?Sized> RankingStage for Arc<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn score_candidates<'a>(
        &'a self,
        query: &'a str,
        candidates: CandidateStream<'a>,
    ) -> ScoredStream<'a> {
        (**self).score_candidates(query, candidates)
    }
}

/// Convenience operations derived from [`RankingStage::score_candidates`].
///
/// Implemented for every stage, including `dyn RankingStage`.
pub trait RankingStageExt: RankingStage {
    /// Score a stream of plain text documents. Indexes are assigned from 0.
    fn score<'a, S>(&'a self, query: &'a str, documents: S) -> ScoredStream<'a>
    where
        S: Stream<Item = String> + Send + 'a,
    {
        let candidates = documents
            .enumerate()
            .map(|(index, text)| Candidate::new(index, text));
        self.score_candidates(query, Box::pin(candidates))
    }

    /// Score arbitrary records, using `text_of` to extract the text to rank.
    ///
    /// Records are held until the stage emits their score, then handed back
    /// with it. Records a stage drops are released when the stream ends.
    fn score_records<'a, R, S, F>(
        &'a self,
        query: &'a str,
        records: S,
        text_of: F,
    ) -> ScoredStream<'a, R>
    where
        R: Send + 'a,
        S: Stream<Item = R> + Send + 'a,
        F: Fn(&R) -> String + Send + 'a,
    {
        let pending: Arc<Mutex<HashMap<usize, R>>> = Arc::new(Mutex::new(HashMap::new()));

        let feed = {
            let pending = Arc::clone(&pending);
            records.enumerate().map(move |(index, record)| {
                let text = text_of(&record);
                pending
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .insert(index, record);
                Candidate::new(index, text)
            })
        };

        let scored = self.score_candidates(query, Box::pin(feed));
        Box::pin(scored.filter_map(move |scored| {
            let record = pending
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .remove(&scored.index);
            futures::future::ready(
                record.map(|record| ScoredDocument::new(scored.index, record, scored.score)),
            )
        }))
    }

    /// The `top_n` best documents, highest score first.
    ///
    /// Consumes the whole scored stream before yielding, keeping at most
    /// `top_n` items in memory.
    fn rank<'a, S>(&'a self, query: &'a str, documents: S, top_n: usize) -> ScoredStream<'a>
    where
        S: Stream<Item = String> + Send + 'a,
    {
        top_of(self.score(query, documents), top_n)
    }

    /// Record flavour of [`rank`](RankingStageExt::rank).
    fn rank_records<'a, R, S, F>(
        &'a self,
        query: &'a str,
        records: S,
        text_of: F,
        top_n: usize,
    ) -> ScoredStream<'a, R>
    where
        R: Send + 'a,
        S: Stream<Item = R> + Send + 'a,
        F: Fn(&R) -> String + Send + 'a,
    {
        top_of(self.score_records(query, records, text_of), top_n)
    }
}

impl<T: RankingStage + ?Sized> RankingStageExt for T {}

fn top_of<'a, D: Send + 'a>(scored: ScoredStream<'a, D>, top_n: usize) -> ScoredStream<'a, D> {
    Box::pin(async_stream::stream! {
        let mut scored = scored;
        let mut top = TopN::new(top_n);
        while let Some(doc) = scored.next().await {
            top.push(doc.score, doc);
        }
        for (_, doc) in top.into_sorted_vec() {
            yield doc;
        }
    })
}

// ---------------------------------------------------------------------------
// FnStage
// ---------------------------------------------------------------------------

type ScoreFn =
    dyn Fn(String, String) -> Pin<Box<dyn Future<Output = Result<f64, SieveError>> + Send>>
        + Send
        + Sync;

/// A ranking stage backed by an async closure `(query, text) -> score`.
///
/// Errors from the closure degrade to a score of `0.0`.
///
/// ```ignore
/// let length = FnStage::new("length", |_query, text| async move {
///     Ok(text.len() as f64)
/// });
/// ```
pub struct FnStage {
    name: String,
    func: Box<ScoreFn>,
}

impl FnStage {
    pub fn new<F, Fut>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(String, String) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<f64, SieveError>> + Send + 'static,
    {
        Self {
            name: name.into(),
            func: Box::new(move |query, text| Box::pin(func(query, text))),
        }
    }
}

impl RankingStage for FnStage {
    fn name(&self) -> &str {
        &self.name
    }

    fn score_candidates<'a>(
        &'a self,
        query: &'a str,
        candidates: CandidateStream<'a>,
    ) -> ScoredStream<'a> {
        if is_blank_query(query) {
            return Box::pin(candidates.map(|c| ScoredDocument::from_candidate(c, 0.0)));
        }
        Box::pin(candidates.then(move |candidate| async move {
            let score = match (self.func)(query.to_string(), candidate.text.clone()).await {
                Ok(score) => sanitize_score(score),
                Err(e) => {
                    tracing::warn!(
                        stage = %self.name,
                        index = candidate.index,
                        error = %e,
                        "scoring failed, using 0"
                    );
                    0.0
                }
            };
            ScoredDocument::from_candidate(candidate, score)
        }))
    }
}
