use std::time::Duration;

use async_trait::async_trait;
use reqwest::{
    Client, StatusCode,
    header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
};
use serde::{Deserialize, Serialize};

use crate::config::AppConfig;
use crate::error::CallFailure;
use crate::infra::retry::RetryPolicy;
use crate::services::{CallResult, LanguageModelService};

/// OpenAI-compatible chat-completion client (OpenRouter by default).
pub struct ChatCompletionClient {
    http: Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
    timeout: Duration,
    retry: RetryPolicy,
}

impl ChatCompletionClient {
    pub fn new(
        endpoint: String,
        model: String,
        api_key: Option<String>,
        timeout: Duration,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            http: Client::new(),
            endpoint,
            model,
            api_key,
            timeout,
            retry,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            config.endpoint.clone(),
            config.model.clone(),
            config.api_key.clone(),
            config.timeout,
            config.retry,
        )
    }

    fn api_key(&self) -> Result<&str, CallFailure> {
        self.api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| CallFailure::Configuration("API key not configured".to_string()))
    }

    async fn attempt(&self, prompt: &str, attempt: u32) -> CallResult {
        let api_key = self.api_key()?;
        tracing::debug!(attempt, model = %self.model, endpoint = %self.endpoint, "sending chat completion");

        let response = self
            .http
            .post(&self.endpoint)
            .header(AUTHORIZATION, format!("Bearer {api_key}"))
            .header(ACCEPT, "application/json")
            .header(CONTENT_TYPE, "application/json")
            .timeout(self.timeout)
            .json(&ChatCompletionRequest::single_user_message(&self.model, prompt))
            .send()
            .await
            .map_err(classify_transport)?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unable to read response>".to_string());
            return Err(CallFailure::BadStatus {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await.map_err(classify_transport)?;
        let payload: ChatCompletionResponse = serde_json::from_str(&body)
            .map_err(|err| CallFailure::MalformedResponse(format!("invalid JSON: {err}")))?;
        payload.into_content()
    }
}

#[async_trait]
impl LanguageModelService for ChatCompletionClient {
    async fn complete(&self, prompt: &str) -> CallResult {
        self.retry
            .run(|attempt| self.attempt(prompt, attempt))
            .await
    }
}

fn classify_transport(err: reqwest::Error) -> CallFailure {
    if err.is_timeout() {
        CallFailure::Timeout
    } else {
        CallFailure::Transport(err.to_string())
    }
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

impl<'a> ChatCompletionRequest<'a> {
    fn single_user_message(model: &'a str, prompt: &'a str) -> Self {
        Self {
            model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
        }
    }
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

impl ChatCompletionResponse {
    fn into_content(self) -> CallResult {
        let choice = self.choices.into_iter().next().ok_or_else(|| {
            CallFailure::MalformedResponse("response contained no choices".to_string())
        })?;
        match choice.message.and_then(|message| message.content) {
            Some(content) if !content.trim().is_empty() => Ok(content),
            _ => Err(CallFailure::MalformedResponse(
                "first choice has no message content".to_string(),
            )),
        }
    }
}

#[derive(Deserialize)]
struct ChatChoice {
    message: Option<ChatChoiceMessage>,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}
