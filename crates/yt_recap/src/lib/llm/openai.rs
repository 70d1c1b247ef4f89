use reqwest::header::CONTENT_TYPE;
use reqwest_middleware::ClientWithMiddleware;
use serde::Deserialize;

use crate::{http::retrying_client, Config, Summarizer, SummaryResponse};

/// Client for OpenAI-compatible chat completion APIs (OpenRouter by default).
pub struct OpenAIClient {
    client: ClientWithMiddleware,
    api_key: String,
    base_url: String,
}

#[derive(Debug, thiserror::Error)]
pub enum OpenAIError {
    #[error("HTTP error: {0}")]
    Request(#[from] reqwest_middleware::Error),
    #[error("HTTP error: {0}")]
    Response(#[from] reqwest::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },
    #[error("Empty response from model")]
    EmptyResponse,
}

impl OpenAIClient {
    const MAX_TOKENS: u32 = 4000;
    const TEMPERATURE: f64 = 0.3;

    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: retrying_client(),
            api_key: api_key.into(),
            base_url: Config::DEFAULT_LLM_BASE_URL.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.openrouter_api_key).with_base_url(&config.llm_base_url)
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub async fn send_completion_request(
        &self,
        model_name: &str,
        system_content: &str,
        user_content: &str,
    ) -> Result<CompletionResponse, OpenAIError> {
        let body = serde_json::json!({
            "model": model_name,
            "max_tokens": Self::MAX_TOKENS,
            "temperature": Self::TEMPERATURE,
            "messages": [
                {
                    "role": "system",
                    "content": system_content
                },
                {
                    "role": "user",
                    "content": user_content
                }
            ]
        });

        let resp = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .header(CONTENT_TYPE, "application/json")
            .header("X-Title", "yt-recap")
            .body(serde_json::to_vec(&body)?)
            .send()
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Failed to make http request"))?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let message = resp.text().await.unwrap_or_default();
            return Err(OpenAIError::Api { status, message });
        }

        Ok(resp.json::<CompletionResponse>().await?)
    }
}

#[derive(Debug, Deserialize)]
pub struct CompletionResponse {
    pub choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
pub struct CompletionChoice {
    pub message: CompletionMessage,
}

#[derive(Debug, Deserialize)]
pub struct CompletionMessage {
    pub content: Option<String>,
}

impl CompletionResponse {
    /// Text of the first choice, if it has any non-blank content
    pub fn into_text(self) -> Option<String> {
        self.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|content| !content.trim().is_empty())
    }
}

impl Summarizer for OpenAIClient {
    type Error = OpenAIError;

    #[tracing::instrument(skip(self, prompt, transcript), fields(transcript_chars = transcript.len()))]
    async fn summarize(
        &self,
        model: &str,
        prompt: &str,
        transcript: &str,
    ) -> Result<SummaryResponse, Self::Error> {
        let response = self
            .send_completion_request(model, prompt, transcript)
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Failed to summarize content"))?;

        let summary = response.into_text().ok_or(OpenAIError::EmptyResponse)?;

        Ok(SummaryResponse { summary })
    }
}
