use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use sieve_core::{
    is_blank_query, Candidate, CandidateStream, RankingStage, ScoredDocument, ScoredStream,
    SieveError,
};

use crate::judge::{Judgment, RelevanceJudge};

/// Ranking stage that asks a [`RelevanceJudge`] about every candidate.
///
/// - One judge call per candidate; calls are independent.
/// - Up to `max_concurrency` calls are in flight (default 1). Results are
///   emitted in input order regardless.
/// - Failures, timeouts and non-finite scores yield `0.0`; other scores are
///   clamped into `[0, 1]`.
/// - A blank query yields `0.0` for every candidate without calling the judge.
pub struct JudgeStage {
    name: String,
    judge: Arc<dyn RelevanceJudge>,
    max_concurrency: usize,
    timeout: Option<Duration>,
}

impl JudgeStage {
    pub fn new(judge: Arc<dyn RelevanceJudge>) -> Self {
        Self {
            name: "judge".to_string(),
            judge,
            max_concurrency: 1,
            timeout: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Allow up to `max_concurrency` judge calls at once. Values below 1 mean 1.
    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency.max(1);
        self
    }

    /// Give up on a single judge call after `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn max_concurrency(&self) -> usize {
        self.max_concurrency
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    async fn ask(&self, query: &str, document: &str) -> Result<Judgment, SieveError> {
        match self.timeout {
            Some(limit) => tokio::time::timeout(limit, self.judge.judge(query, document))
                .await
                .map_err(|_| {
                    SieveError::Timeout(format!("judge gave no answer within {limit:?}"))
                })?,
            None => self.judge.judge(query, document).await,
        }
    }

    async fn score_candidate(&self, query: &str, candidate: Candidate) -> ScoredDocument {
        let score = match self.ask(query, &candidate.text).await {
            Ok(judgment) => {
                tracing::trace!(
                    stage = %self.name,
                    index = candidate.index,
                    score = judgment.score,
                    rationale = %judgment.rationale,
                    "judged candidate"
                );
                clamp_relevance(judgment.score)
            }
            Err(e) => {
                tracing::warn!(
                    stage = %self.name,
                    index = candidate.index,
                    error = %e,
                    "judge failed, using 0"
                );
                0.0
            }
        };
        ScoredDocument::from_candidate(candidate, score)
    }
}

/// Force a judge score into `[0, 1]`; non-finite values become 0.
pub fn clamp_relevance(score: f64) -> f64 {
    if score.is_finite() {
        score.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

impl RankingStage for JudgeStage {
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
        Box::pin(
            candidates
                .map(move |candidate| self.score_candidate(query, candidate))
                .buffered(self.max_concurrency),
        )
    }
}
