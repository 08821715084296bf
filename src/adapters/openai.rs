use crate::domain::ports::{AreaCodeOracle, ConfigProvider, OracleRequest};
use crate::utils::error::{PickerError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: Option<String>,
}

/// Chat-completions backed oracle.
pub struct OpenAiOracle {
    client: Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
    temperature: f32,
}

impl OpenAiOracle {
    pub fn new<C: ConfigProvider>(config: &C) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds()))
            .build()?;

        Ok(Self {
            client,
            endpoint: config.oracle_endpoint().to_string(),
            model: config.oracle_model().to_string(),
            api_key: config.api_key().map(str::to_string),
            temperature: config.temperature(),
        })
    }

    pub fn has_credentials(&self) -> bool {
        self.api_key.is_some()
    }
}

#[async_trait]
impl AreaCodeOracle for OpenAiOracle {
    async fn complete(&self, request: &OracleRequest) -> Result<String> {
        let Some(api_key) = &self.api_key else {
            tracing::warn!("OpenAI API key not found. Set OPENAI_API_KEY environment variable.");
            return Err(PickerError::OracleUnavailable {
                message: "missing API key".to_string(),
            });
        };

        let body = ChatCompletionRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &request.system,
                },
                ChatMessage {
                    role: "user",
                    content: &request.user,
                },
            ],
            temperature: self.temperature,
        };

        tracing::debug!("Making oracle request to: {}", self.endpoint);
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;

        tracing::debug!("Oracle response status: {}", response.status());
        if !response.status().is_success() {
            return Err(PickerError::OracleUnavailable {
                message: format!("oracle returned HTTP {}", response.status()),
            });
        }

        let parsed: ChatCompletionResponse = response.json().await?;
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| PickerError::UnparseableReply {
                message: "reply has no message content".to_string(),
            })
    }
}
