use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use futures::{stream, StreamExt};
use sieve_core::{FnStage, RankingStage, RankingStageExt, ScoredDocument, SieveError};

fn docs(texts: &[&str]) -> Vec<String> {
    texts.iter().map(|s| s.to_string()).collect()
}

fn length_stage() -> FnStage {
    FnStage::new("length", |_query, text| async move { Ok(text.len() as f64) })
}

#[tokio::test]
async fn score_preserves_input_order() {
    let stage = length_stage();
    let scored: Vec<ScoredDocument> = stage
        .score("q", stream::iter(docs(&["aaa", "a", "aa"])))
        .collect()
        .await;

    let indexes: Vec<_> = scored.iter().map(|d| d.index).collect();
    assert_eq!(indexes, vec![0, 1, 2]);
    assert_eq!(scored[0].score, 3.0);
    assert_eq!(scored[1].document, "a");
}

#[tokio::test]
async fn blank_query_scores_zero_without_calls() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let stage = FnStage::new("counting", move |_q, _t| {
        counter.fetch_add(1, Ordering::SeqCst);
        async { Ok(1.0) }
    });

    let scored: Vec<_> = stage
        .score("   ", stream::iter(docs(&["x", "y", "z"])))
        .collect()
        .await;

    assert_eq!(scored.len(), 3);
    assert!(scored.iter().all(|d| d.score == 0.0));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn failing_closure_degrades_to_zero() {
    let stage = FnStage::new("flaky", |_q, text: String| async move {
        if text == "bad" {
            Err(SieveError::Judge("boom".into()))
        } else {
            Ok(1.0)
        }
    });

    let scored: Vec<_> = stage
        .score("q", stream::iter(docs(&["good", "bad", "good"])))
        .collect()
        .await;

    let scores: Vec<_> = scored.iter().map(|d| d.score).collect();
    assert_eq!(scores, vec![1.0, 0.0, 1.0]);
}

#[tokio::test]
async fn nan_scores_are_sanitized() {
    let stage = FnStage::new("nan", |_q, _t| async { Ok(f64::NAN) });
    let scored: Vec<_> = stage.score("q", stream::iter(docs(&["a"]))).collect().await;
    assert_eq!(scored[0].score, 0.0);
}

#[tokio::test]
async fn rank_returns_min_of_top_n_and_len_sorted() {
    let stage = length_stage();
    let input = docs(&["aa", "aaaa", "a", "aaa"]);

    let top2: Vec<_> = stage.rank("q", stream::iter(input.clone()), 2).collect().await;
    assert_eq!(top2.len(), 2);
    assert_eq!(top2[0].document, "aaaa");
    assert_eq!(top2[1].document, "aaa");

    let all: Vec<_> = stage.rank("q", stream::iter(input), 10).collect().await;
    assert_eq!(all.len(), 4);
    for pair in all.windows(2) {
        assert!(pair[0].score >= pair[1].score);
    }
}

#[tokio::test]
async fn rank_is_subset_of_score() {
    let stage = length_stage();
    let input = docs(&["one", "three", "fifteen", "x"]);

    let scored: Vec<_> = stage.score("q", stream::iter(input.clone())).collect().await;
    let ranked: Vec<_> = stage.rank("q", stream::iter(input), 3).collect().await;

    for doc in &ranked {
        assert!(scored.contains(doc));
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Article {
    id: u32,
    title: String,
}

#[tokio::test]
async fn score_records_hands_back_records() {
    let stage = length_stage();
    let articles = vec![
        Article { id: 10, title: "short".into() },
        Article { id: 20, title: "a much longer title".into() },
    ];

    let scored: Vec<_> = stage
        .score_records("q", stream::iter(articles.clone()), |a: &Article| {
            a.title.clone()
        })
        .collect()
        .await;

    assert_eq!(scored.len(), 2);
    assert_eq!(scored[0].document, articles[0]);
    assert_eq!(scored[1].score, articles[1].title.len() as f64);

    let ranked: Vec<_> = stage
        .rank_records("q", stream::iter(articles), |a: &Article| a.title.clone(), 1)
        .collect()
        .await;
    assert_eq!(ranked.len(), 1);
    assert_eq!(ranked[0].document.id, 20);
}

#[tokio::test]
async fn dyn_stage_supports_extension_methods() {
    let stage: Arc<dyn RankingStage> = Arc::new(length_stage());
    assert_eq!(stage.name(), "length");

    let ranked: Vec<_> = stage
        .rank("q", stream::iter(docs(&["bb", "b"])), 1)
        .collect()
        .await;
    assert_eq!(ranked[0].document, "bb");
}

#[tokio::test]
async fn empty_stream_yields_nothing() {
    let stage = length_stage();
    let scored: Vec<_> = stage.score("q", stream::iter(Vec::<String>::new())).collect().await;
    assert!(scored.is_empty());
    let ranked: Vec<_> = stage
        .rank("q", stream::iter(Vec::<String>::new()), 5)
        .collect()
        .await;
    assert!(ranked.is_empty());
}
