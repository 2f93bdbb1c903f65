//! External relevance judges for Sieve.
//!
//! A [`JudgeStage`] scores each candidate with a single call to a
//! [`RelevanceJudge`], usually an LLM, which answers with a score in `[0, 1]`
//! and a short rationale. Judge failures never fail the stream: the affected
//! document simply scores 0.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use sieve_judge::{JudgeStage, PromptJudge};
//!
//! let judge = PromptJudge::new(Arc::new(my_completion_client));
//! let stage = JudgeStage::new(Arc::new(judge))
//!     .with_max_concurrency(4)
//!     .with_timeout(std::time::Duration::from_secs(20));
//! ```

mod judge;
mod prompt;
mod stage;

pub use judge::{FnJudge, Judgment, RelevanceJudge, ScriptedJudge};
pub use prompt::{parse_judgment, CompletionModel, PromptJudge};
pub use stage::{clamp_relevance, JudgeStage};
