use std::sync::Arc;

use futures::{stream, Stream, StreamExt};
use serde::{Deserialize, Serialize};
use sieve_core::{
    sort_by_score, Candidate, CandidateStream, RankingStage, ScoredDocument, ScoredStream,
    SieveError,
};

use crate::config::PipelineConfig;

/// What happened to the candidate set at one stage boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageReport {
    /// Name of the stage.
    pub stage: String,
    /// Candidates the stage scored.
    pub scored: usize,
    /// Candidates at or above the score threshold.
    pub retained: usize,
    /// Candidates passed on to the next stage, or emitted after the last.
    pub forwarded: usize,
}

/// Ordered chain of ranking stages narrowing a candidate set.
///
/// Per stage: score every surviving candidate, keep those with
/// `score >= score_threshold`, sort best first (ties by original index), then
/// cut to `top_k` for the next stage or to `top_m` after the last stage.
/// Stages run strictly one after another. A stage that keeps nothing hands an
/// empty set to the next one.
///
/// Scores are never normalized between stages; the threshold applies to the
/// raw score of whichever stage is running.
///
/// The pipeline is itself a [`RankingStage`], so it can be ranked over
/// (`rank`, `score_records`) or nested inside another pipeline.
pub struct CascadePipeline {
    name: String,
    config: PipelineConfig,
    stages: Vec<Arc<dyn RankingStage>>,
}

impl CascadePipeline {
    /// Create a pipeline. Fails if `stages` is empty or `config` is invalid.
    pub fn new(
        config: PipelineConfig,
        stages: Vec<Arc<dyn RankingStage>>,
    ) -> Result<Self, SieveError> {
        config.validate()?;
        if stages.is_empty() {
            return Err(SieveError::InvalidArgument(
                "cascade pipeline needs at least one stage".to_string(),
            ));
        }
        Ok(Self {
            name: "cascade".to_string(),
            config,
            stages,
        })
    }

    pub fn builder() -> CascadePipelineBuilder {
        CascadePipelineBuilder::new()
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn stages(&self) -> &[Arc<dyn RankingStage>] {
        &self.stages
    }

    /// Run the cascade and collect its output, best first.
    pub async fn run<S>(&self, query: &str, documents: S) -> Vec<ScoredDocument>
    where
        S: Stream<Item = String> + Send,
    {
        self.run_with_reports(query, documents).await.0
    }

    /// Like [`run`](CascadePipeline::run), also returning one report per stage.
    pub async fn run_with_reports<S>(
        &self,
        query: &str,
        documents: S,
    ) -> (Vec<ScoredDocument>, Vec<StageReport>)
    where
        S: Stream<Item = String> + Send,
    {
        let candidates: Vec<Candidate> = documents
            .enumerate()
            .map(|(index, text)| Candidate::new(index, text))
            .collect()
            .await;
        let mut reports = Vec::with_capacity(self.stages.len());
        let results = self.cascade(query, candidates, &mut reports).await;
        (results, reports)
    }

    async fn cascade(
        &self,
        query: &str,
        mut candidates: Vec<Candidate>,
        reports: &mut Vec<StageReport>,
    ) -> Vec<ScoredDocument> {
        let last = self.stages.len().saturating_sub(1);
        let mut results = Vec::new();

        for (position, stage) in self.stages.iter().enumerate() {
            let input = std::mem::take(&mut candidates);
            let scored: Vec<ScoredDocument> = stage
                .score_candidates(query, Box::pin(stream::iter(input)))
                .collect()
                .await;
            let scored_count = scored.len();

            let mut retained: Vec<ScoredDocument> = scored
                .into_iter()
                .filter(|doc| doc.score >= self.config.score_threshold)
                .collect();
            let retained_count = retained.len();

            sort_by_score(&mut retained);
            let width = if position == last {
                self.config.top_m
            } else {
                self.config.top_k
            };
            retained.truncate(width);

            let report = StageReport {
                stage: stage.name().to_string(),
                scored: scored_count,
                retained: retained_count,
                forwarded: retained.len(),
            };
            tracing::debug!(
                pipeline = %self.name,
                stage = %report.stage,
                position,
                scored = report.scored,
                retained = report.retained,
                forwarded = report.forwarded,
                "cascade stage finished"
            );
            reports.push(report);

            if position == last {
                results = retained;
            } else {
                candidates = retained
                    .into_iter()
                    .map(ScoredDocument::into_candidate)
                    .collect();
            }
        }
        results
    }
}

impl RankingStage for CascadePipeline {
    fn name(&self) -> &str {
        &self.name
    }

    /// Materializes the input, then runs every stage once the returned stream
    /// is first polled. Emits at most `top_m` items, best first.
    fn score_candidates<'a>(
        &'a self,
        query: &'a str,
        candidates: CandidateStream<'a>,
    ) -> ScoredStream<'a> {
        Box::pin(async_stream::stream! {
            let initial: Vec<Candidate> = candidates.collect().await;
            let mut reports = Vec::with_capacity(self.stages.len());
            for doc in self.cascade(query, initial, &mut reports).await {
                yield doc;
            }
        })
    }
}

/// Builder for [`CascadePipeline`].
///
/// Both a config and at least one stage must be supplied.
#[derive(Default)]
pub struct CascadePipelineBuilder {
    name: Option<String>,
    config: Option<PipelineConfig>,
    stages: Option<Vec<Arc<dyn RankingStage>>>,
}

impl CascadePipelineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn config(mut self, config: PipelineConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Append one stage.
    pub fn stage(mut self, stage: Arc<dyn RankingStage>) -> Self {
        self.stages.get_or_insert_with(Vec::new).push(stage);
        self
    }

    /// Append several stages, in order.
    pub fn stages<I>(mut self, stages: I) -> Self
    where
        I: IntoIterator<Item = Arc<dyn RankingStage>>,
    {
        self.stages.get_or_insert_with(Vec::new).extend(stages);
        self
    }

    pub fn build(self) -> Result<CascadePipeline, SieveError> {
        let config = self.config.ok_or_else(|| {
            SieveError::InvalidArgument("cascade pipeline requires a config".to_string())
        })?;
        let stages = self.stages.ok_or_else(|| {
            SieveError::InvalidArgument("cascade pipeline requires stages".to_string())
        })?;
        let pipeline = CascadePipeline::new(config, stages)?;
        Ok(match self.name {
            Some(name) => pipeline.with_name(name),
            None => pipeline,
        })
    }
}
