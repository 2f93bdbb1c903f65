//! Sieve: streaming BM25 scoring and cascade reranking.
//!
//! This crate re-exports the Sieve sub-crates for single-import usage.
//! Enable features to control which modules are available.
//!
//! # Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `default` | `bm25`, `judge`, `cascade` |
//! | `bm25` | `TokenCache`, `CorpusStatistics`, `Bm25Scorer`, `Bm25Stage`, tokenizers |
//! | `judge` | `RelevanceJudge`, `JudgeStage`, `PromptJudge`, test judges |
//! | `cascade` | `PipelineConfig`, `CascadePipeline` |
//! | `full` | All features enabled |
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use sieve::bm25::{Bm25Scorer, Bm25Stage, RegexTokenizer};
//! use sieve::core::RankingStageExt;
//!
//! let tokenizer = RegexTokenizer::words()?.with_english_stop_words();
//! let stage = Bm25Stage::new(Bm25Scorer::new(Arc::new(tokenizer)));
//! let top: Vec<_> = stage.rank("cat", futures::stream::iter(docs), 3).collect().await;
//! ```

/// Core traits and types: RankingStage, Candidate, ScoredDocument, TopN, Tokenizer, SieveError.
/// Always available.
pub use sieve_core as core;

/// BM25 scoring: TokenCache, CorpusStatistics, Bm25Scorer, Bm25Stage, tokenizers.
#[cfg(feature = "bm25")]
pub use sieve_bm25 as bm25;

/// External relevance judges: JudgeStage, PromptJudge, ScriptedJudge, FnJudge.
#[cfg(feature = "judge")]
pub use sieve_judge as judge;

/// Cascade reranking: PipelineConfig, CascadePipeline.
#[cfg(feature = "cascade")]
pub use sieve_cascade as cascade;

/// Commonly used items in one import.
pub mod prelude {
    pub use sieve_core::{
        Candidate, FnStage, RankingStage, RankingStageExt, ScoredDocument, SieveError, Tokenizer,
        TopN,
    };

    #[cfg(feature = "bm25")]
    pub use sieve_bm25::{
        compute_corpus_statistics, Bm25Params, Bm25Scorer, Bm25Stage, CorpusStatistics,
        RegexTokenizer, TokenCache, WhitespaceTokenizer,
    };

    #[cfg(feature = "judge")]
    pub use sieve_judge::{CompletionModel, JudgeStage, Judgment, PromptJudge, RelevanceJudge};

    #[cfg(feature = "cascade")]
    pub use sieve_cascade::{CascadePipeline, PipelineConfig};
}
