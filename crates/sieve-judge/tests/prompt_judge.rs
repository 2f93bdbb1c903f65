use std::sync::Arc;

use async_trait::async_trait;
use futures::{stream, StreamExt};
use sieve_core::{RankingStageExt, SieveError};
use sieve_judge::{CompletionModel, JudgeStage, PromptJudge, RelevanceJudge};
use tokio::sync::Mutex;

/// Completion model that replays canned answers and records prompts.
struct CannedModel {
    answers: Mutex<Vec<Result<String, SieveError>>>,
    prompts: Mutex<Vec<String>>,
}

impl CannedModel {
    fn new(answers: Vec<Result<String, SieveError>>) -> Self {
        let mut answers = answers;
        answers.reverse();
        Self {
            answers: Mutex::new(answers),
            prompts: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl CompletionModel for CannedModel {
    async fn complete(&self, prompt: &str) -> Result<String, SieveError> {
        self.prompts.lock().await.push(prompt.to_string());
        self.answers
            .lock()
            .await
            .pop()
            .unwrap_or_else(|| Err(SieveError::Judge("no more answers".into())))
    }
}

#[tokio::test]
async fn prompt_contains_query_and_document() {
    let model = Arc::new(CannedModel::new(vec![Ok(
        r#"{"score": 0.9, "rationale": "exact topic"}"#.to_string(),
    )]));
    let judge = PromptJudge::new(model.clone());

    let judgment = judge.judge("rust async", "tokio is an async runtime").await.unwrap();

    assert_eq!(judgment.score, 0.9);
    assert_eq!(judgment.rationale, "exact topic");
    let prompts = model.prompts.lock().await;
    assert!(prompts[0].contains("Query: rust async"));
    assert!(prompts[0].contains("Document: tokio is an async runtime"));
}

#[tokio::test]
async fn custom_template_is_rendered() {
    let model = Arc::new(CannedModel::new(vec![Ok("0.4".to_string())]));
    let judge = PromptJudge::with_prompt(model.clone(), "Q={query} D={document}");

    assert_eq!(judge.render("a", "b"), "Q=a D=b");
    let judgment = judge.judge("a", "b").await.unwrap();
    assert_eq!(judgment.score, 0.4);
}

#[tokio::test]
async fn malformed_answers_degrade_inside_stage() {
    let model = Arc::new(CannedModel::new(vec![
        Ok(r#"{"score": 0.75}"#.to_string()),
        Ok("no idea".to_string()),
        Err(SieveError::Timeout("upstream".into())),
        Ok(r#"{"score": 12}"#.to_string()),
    ]));
    let stage = JudgeStage::new(Arc::new(PromptJudge::new(model)));
    let docs: Vec<String> = (0..4).map(|i| format!("doc {i}")).collect();

    let scored: Vec<_> = stage.score("query", stream::iter(docs)).collect().await;

    let scores: Vec<_> = scored.iter().map(|d| d.score).collect();
    assert_eq!(scores, vec![0.75, 0.0, 0.0, 0.0]);
}
