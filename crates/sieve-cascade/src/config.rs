use serde::{Deserialize, Serialize};
use sieve_core::SieveError;

/// Filtering policy of a [`CascadePipeline`](crate::CascadePipeline).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Candidates forwarded from one stage to the next (default: 20).
    pub top_k: usize,
    /// Results emitted by the last stage (default: 5).
    pub top_m: usize,
    /// Inclusive minimum score a candidate needs to survive a stage (default: 0.0).
    pub score_threshold: f64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            top_k: 20,
            top_m: 5,
            score_threshold: 0.0,
        }
    }
}

impl PipelineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn with_top_m(mut self, top_m: usize) -> Self {
        self.top_m = top_m;
        self
    }

    pub fn with_score_threshold(mut self, score_threshold: f64) -> Self {
        self.score_threshold = score_threshold;
        self
    }

    pub fn validate(&self) -> Result<(), SieveError> {
        if self.top_k == 0 {
            return Err(SieveError::InvalidArgument("top_k must be positive".to_string()));
        }
        if self.top_m == 0 {
            return Err(SieveError::InvalidArgument("top_m must be positive".to_string()));
        }
        if !self.score_threshold.is_finite() {
            return Err(SieveError::InvalidArgument(format!(
                "score_threshold must be finite, got {}",
                self.score_threshold
            )));
        }
        Ok(())
    }
}
