//! Cascade reranking.
//!
//! A [`CascadePipeline`] runs an ordered list of [`RankingStage`]s. Each stage
//! scores the survivors of the previous one; survivors are those scoring at
//! least `score_threshold`, best first, cut to `top_k` between stages and to
//! `top_m` after the last. Typical use puts a cheap lexical stage first and an
//! expensive judge last.
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use sieve_cascade::{CascadePipeline, PipelineConfig};
//!
//! let pipeline = CascadePipeline::builder()
//!     .config(PipelineConfig::default().with_top_k(50).with_top_m(5))
//!     .stage(Arc::new(bm25_stage))
//!     .stage(Arc::new(judge_stage))
//!     .build()?;
//! let best = pipeline.run("rust async runtime", futures::stream::iter(docs)).await;
//! ```
//!
//! [`RankingStage`]: sieve_core::RankingStage

mod config;
mod pipeline;

pub use config::PipelineConfig;
pub use pipeline::{CascadePipeline, CascadePipelineBuilder, StageReport};
