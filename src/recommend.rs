//! Study recommendation backend
//!
//! Single best-effort call to an OpenAI-compatible chat-completions endpoint.
//! No retries; the request timeout is the only hardening. The backend is known
//! to answer in two shapes - a structured `choices` object or a bare list of
//! message fragments - and both are normalized to plain text here. Failures
//! never cross the boundary as panics; the controller gets a typed error and
//! decides what the user sees.

use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

#[derive(Debug, thiserror::Error)]
pub enum RecommendError {
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Backend returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("Malformed response: {0}")]
    Malformed(String),
}

/// Free-text guidance for one subject/theme pair
#[async_trait]
pub trait Recommender: Send + Sync {
    async fn recommend(&self, subject: &str, theme: &str) -> Result<String, RecommendError>;
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    stream: bool,
}

/// Both response shapes the backend is known to produce
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ChatResponse {
    Choices { choices: Vec<Choice> },
    Fragments(Vec<Fragment>),
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: String,
}

#[derive(Debug, Deserialize)]
struct Fragment {
    #[serde(default)]
    content: Option<String>,
}

/// Compose the prompt sent for a debt theme
pub fn study_prompt(subject: &str, theme: &str) -> String {
    format!(
        "Give detailed recommendations and advice for studying the topic '{}' \
         in the subject '{}'. Include examples and useful resources.",
        theme, subject
    )
}

/// Normalize either response shape to plain text
fn normalize(response: ChatResponse) -> Result<String, RecommendError> {
    match response {
        ChatResponse::Choices { choices } => choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| RecommendError::Malformed("empty choices".to_string())),
        ChatResponse::Fragments(fragments) => Ok(fragments
            .into_iter()
            .filter_map(|f| f.content)
            .collect::<Vec<_>>()
            .join("")),
    }
}

/// OpenAI-compatible recommender client
pub struct OpenAiRecommender {
    client: Client,
    url: String,
    api_key: Option<String>,
    model: String,
}

impl OpenAiRecommender {
    pub fn new(
        url: &str,
        api_key: Option<&str>,
        model: &str,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.to_string(),
            api_key: api_key.map(|s| s.to_string()),
            model: model.to_string(),
        })
    }
}

#[async_trait]
impl Recommender for OpenAiRecommender {
    async fn recommend(&self, subject: &str, theme: &str) -> Result<String, RecommendError> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage {
                role: "user",
                content: study_prompt(subject, theme),
            }],
            stream: false,
        };

        debug!(
            "Requesting recommendations: model={}, subject={}, theme={}",
            self.model, subject, theme
        );

        let mut builder = self.client.post(&self.url).json(&request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(RecommendError::Status { status, body });
        }

        let body = response.text().await?;
        let parsed: ChatResponse = serde_json::from_str(&body)
            .map_err(|e| RecommendError::Malformed(e.to_string()))?;

        normalize(parsed)
    }
}
