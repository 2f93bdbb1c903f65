use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sieve_core::SieveError;
use tokio::sync::Mutex;

/// A relevance verdict from an external judge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Judgment {
    /// Relevance in `[0, 1]`.
    pub score: f64,
    /// Free-text justification. May be empty.
    #[serde(default)]
    pub rationale: String,
}

impl Judgment {
    pub fn new(score: f64, rationale: impl Into<String>) -> Self {
        Self {
            score,
            rationale: rationale.into(),
        }
    }

    pub fn with_score(score: f64) -> Self {
        Self::new(score, String::new())
    }
}

/// External relevance-judgment service, typically an LLM.
///
/// Each call judges one document independently. Implementations may be slow
/// or fail; callers treat every error as a score of 0.
#[async_trait]
pub trait RelevanceJudge: Send + Sync {
    async fn judge(&self, query: &str, document: &str) -> Result<Judgment, SieveError>;
}

/// A judge that returns pre-scripted results in order.
///
/// Once the script runs out every call fails.
pub struct ScriptedJudge {
    responses: Mutex<VecDeque<Result<Judgment, SieveError>>>,
    calls: AtomicUsize,
}

impl ScriptedJudge {
    pub fn new(responses: Vec<Result<Judgment, SieveError>>) -> Self {
        Self {
            responses: Mutex::new(VecDeque::from(responses)),
            calls: AtomicUsize::new(0),
        }
    }

    /// Script plain scores with empty rationales.
    pub fn scores(scores: impl IntoIterator<Item = f64>) -> Self {
        Self::new(
            scores
                .into_iter()
                .map(|score| Ok(Judgment::with_score(score)))
                .collect(),
        )
    }

    /// Number of `judge` calls made so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RelevanceJudge for ScriptedJudge {
    async fn judge(&self, _query: &str, _document: &str) -> Result<Judgment, SieveError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut responses = self.responses.lock().await;
        responses.pop_front().unwrap_or_else(|| {
            Err(SieveError::Judge("scripted judge exhausted responses".to_string()))
        })
    }
}

type JudgeFuture = Pin<Box<dyn Future<Output = Result<Judgment, SieveError>> + Send>>;
type JudgeFn = dyn Fn(String, String) -> JudgeFuture + Send + Sync;

/// Wraps an async closure `(query, document) -> Judgment` as a judge.
///
/// ```ignore
/// let judge = FnJudge::new(|query, document| async move {
///     let hit = document.contains(&query);
///     Ok(Judgment::with_score(if hit { 1.0 } else { 0.0 }))
/// });
/// ```
pub struct FnJudge {
    func: Box<JudgeFn>,
}

impl FnJudge {
    pub fn new<F, Fut>(func: F) -> Self
    where
        F: Fn(String, String) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Judgment, SieveError>> + Send + 'static,
    {
        Self {
            func: Box::new(move |query, document| Box::pin(func(query, document))),
        }
    }
}

#[async_trait]
impl RelevanceJudge for FnJudge {
    async fn judge(&self, query: &str, document: &str) -> Result<Judgment, SieveError> {
        (self.func)(query.to_string(), document.to_string()).await
    }
}
