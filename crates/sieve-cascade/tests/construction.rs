use std::sync::Arc;

use sieve_cascade::{CascadePipeline, PipelineConfig};
use sieve_core::{FnStage, RankingStage, SieveError};

fn stage() -> Arc<dyn RankingStage> {
    Arc::new(FnStage::new("one", |_q, _t| async { Ok(1.0) }))
}

#[test]
fn empty_stage_list_is_rejected() {
    let err = CascadePipeline::new(PipelineConfig::default(), Vec::new()).err().unwrap();
    assert!(matches!(err, SieveError::InvalidArgument(_)));
}

#[test]
fn invalid_config_is_rejected() {
    let err = CascadePipeline::new(PipelineConfig::new().with_top_m(0), vec![stage()])
        .err()
        .unwrap();
    assert!(matches!(err, SieveError::InvalidArgument(_)));
}

#[test]
fn builder_requires_config_and_stages() {
    let missing_config = CascadePipeline::builder().stage(stage()).build();
    assert!(matches!(missing_config, Err(SieveError::InvalidArgument(_))));

    let missing_stages = CascadePipeline::builder()
        .config(PipelineConfig::default())
        .build();
    assert!(matches!(missing_stages, Err(SieveError::InvalidArgument(_))));

    let empty_stages = CascadePipeline::builder()
        .config(PipelineConfig::default())
        .stages(Vec::new())
        .build();
    assert!(matches!(empty_stages, Err(SieveError::InvalidArgument(_))));
}

#[test]
fn builder_keeps_stage_order_and_name() {
    let pipeline = CascadePipeline::builder()
        .name("hybrid")
        .config(PipelineConfig::default())
        .stages(vec![stage(), stage()])
        .stage(Arc::new(FnStage::new("last", |_q, _t| async { Ok(0.0) })))
        .build()
        .unwrap();

    assert_eq!(pipeline.name(), "hybrid");
    let names: Vec<_> = pipeline.stages().iter().map(|s| s.name().to_string()).collect();
    assert_eq!(names, vec!["one", "one", "last"]);
    assert_eq!(pipeline.config().top_m, 5);
}

#[test]
fn config_deserializes_partial_json() {
    let config: PipelineConfig = serde_json::from_str(r#"{"top_k": 50}"#).unwrap();
    assert_eq!(config.top_k, 50);
    assert_eq!(config.top_m, 5);
    assert_eq!(config.score_threshold, 0.0);
}
