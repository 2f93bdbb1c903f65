use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use sieve_core::SieveError;

use crate::judge::{Judgment, RelevanceJudge};

const DEFAULT_PROMPT_TEMPLATE: &str = r#"You are an impartial judge rating how relevant a document is to a search query.

Query: {query}
Document: {document}

Rate the relevance from 0 (unrelated) to 1 (fully answers the query).
Respond with ONLY a JSON object of the form {"score": <number>, "rationale": "<one sentence>"}."#;

/// Text-completion client behind a [`PromptJudge`].
///
/// Transport, authentication and retries are the implementor's concern.
#[async_trait]
pub trait CompletionModel: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, SieveError>;
}

/// Judge that prompts a completion model and parses its verdict.
pub struct PromptJudge {
    model: Arc<dyn CompletionModel>,
    prompt_template: String,
}

impl PromptJudge {
    /// Create a judge with the default prompt template.
    pub fn new(model: Arc<dyn CompletionModel>) -> Self {
        Self {
            model,
            prompt_template: DEFAULT_PROMPT_TEMPLATE.to_string(),
        }
    }

    /// Create a judge with a custom prompt template.
    ///
    /// The template should contain `{query}` and `{document}` placeholders.
    pub fn with_prompt(model: Arc<dyn CompletionModel>, template: impl Into<String>) -> Self {
        Self {
            model,
            prompt_template: template.into(),
        }
    }

    pub fn render(&self, query: &str, document: &str) -> String {
        self.prompt_template
            .replace("{query}", query)
            .replace("{document}", document)
    }
}

#[async_trait]
impl RelevanceJudge for PromptJudge {
    async fn judge(&self, query: &str, document: &str) -> Result<Judgment, SieveError> {
        let prompt = self.render(query, document);
        let response = self.model.complete(&prompt).await?;
        parse_judgment(&response)
    }
}

#[derive(Deserialize)]
struct RawJudgment {
    score: f64,
    #[serde(default)]
    rationale: String,
}

/// Parse a judge response.
///
/// Accepts a JSON object with a `score` (and optional `rationale`), also when
/// surrounded by prose or a code fence. Otherwise falls back to the last bare
/// number in the text, keeping the whole response as rationale. Scores outside
/// `[0, 1]` are rejected in both forms.
pub fn parse_judgment(text: &str) -> Result<Judgment, SieveError> {
    if let (Some(start), Some(end)) = (text.find('{'), text.rfind('}')) {
        if start < end {
            if let Ok(raw) = serde_json::from_str::<RawJudgment>(&text[start..=end]) {
                return checked(raw.score).map(|score| Judgment::new(score, raw.rationale));
            }
        }
    }

    // Verdicts come last in prose such as "on a scale of 0 to 1, this is 0.9".
    let score = text
        .split_whitespace()
        .rev()
        .find_map(|word| {
            word.trim_matches(|c: char| !c.is_ascii_digit() && c != '.' && c != '-')
                .trim_end_matches('.')
                .parse::<f64>()
                .ok()
        })
        .ok_or_else(|| {
            SieveError::Parsing(format!(
                "could not parse a relevance score from judge response: {text:?}"
            ))
        })?;
    checked(score).map(|score| Judgment::new(score, text.trim()))
}

fn checked(score: f64) -> Result<f64, SieveError> {
    if (0.0..=1.0).contains(&score) {
        Ok(score)
    } else {
        Err(SieveError::Parsing(format!("judge score {score} is outside [0, 1]")))
    }
}
