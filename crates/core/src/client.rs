//! The generative-model collaborator: sends a prompt, hands back raw text.
//!
//! Nothing here looks inside the text. Making sense of it is the pipeline's
//! job.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::provider::{Provider, ProviderError};

pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Provider error: {0}")]
    ProviderError(#[from] ProviderError),

    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Invalid API response: {0}")]
    InvalidApiResponse(serde_json::Value),

    #[error("Model returned an empty response")]
    EmptyResponse,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationConfig {
    pub temperature: f32,
    pub top_p: f32,
    pub max_output_tokens: u32,
}

impl GenerationConfig {
    pub const QUIZ: GenerationConfig = GenerationConfig {
        temperature: 0.7,
        top_p: 0.95,
        max_output_tokens: 8192,
    };

    pub const REPORT: GenerationConfig = GenerationConfig {
        temperature: 0.7,
        top_p: 0.8,
        max_output_tokens: 2048,
    };
}

#[derive(Debug, Clone)]
pub struct ModelRequest {
    pub prompt: String,
    pub video_url: Option<String>,
    pub config: GenerationConfig,
}

impl ModelRequest {
    pub fn quiz(video_url: &str, prompt: String) -> Self {
        Self {
            prompt,
            video_url: Some(video_url.to_string()),
            config: GenerationConfig::QUIZ,
        }
    }

    pub fn report(prompt: String) -> Self {
        Self {
            prompt,
            video_url: None,
            config: GenerationConfig::REPORT,
        }
    }

    fn user_content(&self) -> String {
        match &self.video_url {
            Some(url) => format!("Video: {url}\n\n{}", self.prompt),
            None => self.prompt.clone(),
        }
    }
}

#[async_trait]
pub trait ModelClient: Send + Sync {
    async fn complete(&self, request: &ModelRequest) -> Result<String, ClientError>;
}

/// Client for OpenAI-compatible chat completion endpoints.
pub struct ChatClient {
    http: reqwest::Client,
    provider: Provider,
    api_key: String,
}

impl ChatClient {
    pub fn new(provider: Provider) -> Result<Self, ClientError> {
        let api_key = provider.validate_api_key()?;
        let http = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;

        Ok(Self {
            http,
            provider,
            api_key,
        })
    }
}

/// Pull the assistant text out of a chat completion envelope.
pub fn completion_text(response: &serde_json::Value) -> Result<String, ClientError> {
    let content = response["choices"][0]["message"]["content"]
        .as_str()
        .ok_or_else(|| ClientError::InvalidApiResponse(response.clone()))?;

    if content.trim().is_empty() {
        return Err(ClientError::EmptyResponse);
    }

    Ok(content.to_string())
}

#[async_trait]
impl ModelClient for ChatClient {
    async fn complete(&self, request: &ModelRequest) -> Result<String, ClientError> {
        let config = self.provider.config();

        info!(provider = self.provider.name(), model = config.model, "calling model");
        let response = self
            .http
            .post(config.api_url)
            .header("Content-Type", "application/json")
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&serde_json::json!({
                "model": config.model,
                "messages": [
                    {
                        "role": "user",
                        "content": request.user_content(),
                    },
                ],
                "temperature": request.config.temperature,
                "top_p": request.config.top_p,
                "max_tokens": request.config.max_output_tokens,
            }))
            .send()
            .await?
            .error_for_status()?
            .json::<serde_json::Value>()
            .await?;

        let text = completion_text(&response)?;
        debug!(len = text.len(), "raw model response: {text}");
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn extracts_completion_text() {
        let response = json!({
            "choices": [{ "message": { "role": "assistant", "content": "{\"segments\": []}" } }]
        });
        assert_eq!(completion_text(&response).unwrap(), "{\"segments\": []}");
    }

    #[test]
    fn rejects_missing_or_blank_content() {
        assert!(matches!(
            completion_text(&json!({ "error": "quota" })),
            Err(ClientError::InvalidApiResponse(_))
        ));
        assert!(matches!(
            completion_text(&json!({ "choices": [{ "message": { "content": "  " } }] })),
            Err(ClientError::EmptyResponse)
        ));
    }

    #[test]
    fn video_url_is_part_of_user_message() {
        let request = ModelRequest::quiz("https://youtu.be/abc", "Make a quiz".into());
        assert_eq!(request.user_content(), "Video: https://youtu.be/abc\n\nMake a quiz");
        assert_eq!(request.config, GenerationConfig::QUIZ);
    }
}
