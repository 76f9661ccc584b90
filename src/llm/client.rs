//! OpenAI-compatible chat completion client.

use std::future::Future;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    config::Settings,
    error::{LosError, Result},
};

/// One chat turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".into(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".into(),
            content: content.into(),
        }
    }
}

/// Anything that turns a conversation into a reply.
pub trait Completion {
    fn complete(&self, messages: &[ChatMessage]) -> impl Future<Output = Result<String>> + Send;
}

/// Blocking-per-call HTTP client for a `/chat/completions` endpoint.
#[derive(Debug, Clone)]
pub struct ChatClient {
    http: Client,
    endpoint: String,
    api_key: Option<String>,
    model: String,
    pub temperature: f64,
    pub max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f64,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChatMessage,
}

impl ChatClient {
    pub fn new(settings: &Settings, model: &str) -> Result<Self> {
        let http = Client::builder()
            .user_agent("los-explain/0.1")
            .timeout(settings.llm_timeout())
            .gzip(true)
            .build()?;
        Ok(Self {
            http,
            endpoint: format!(
                "{}/chat/completions",
                settings.llm_api_base.trim_end_matches('/')
            ),
            api_key: settings.llm_api_key.clone(),
            model: model.to_string(),
            temperature: 0.2,
            max_tokens: 512,
        })
    }
}

impl Completion for ChatClient {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
        let body = ChatRequest {
            model: &self.model,
            messages,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };
        let mut request = self.http.post(&self.endpoint).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }
        let response: ChatResponse = request.send().await?.error_for_status()?.json().await?;
        let content = response
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| LosError::Inference("chat response had no choices".into()))?;
        debug!(model = %self.model, chars = content.len(), "chat completion");
        Ok(content)
    }
}
