use async_trait::async_trait;
use log::{debug, error};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{Completion, CompletionProvider, EmbeddingProvider};
use crate::errors::ProviderError;

/// OpenAI client for the embeddings and responses endpoints
#[derive(Debug, Clone)]
pub struct OpenAI {
    /// HTTP client for API requests
    client: Client,
    /// API key for authentication
    api_key: String,
    /// API base URL, e.g. `https://api.openai.com/v1`
    endpoint: String,
    /// Model answering prompts
    chat_model: String,
    /// Model producing embeddings
    embedding_model: String,
    /// Sampling temperature for responses; service default when unset
    temperature: Option<f32>,
}

/// Embeddings request
#[derive(Debug, Serialize)]
pub struct EmbeddingRequest<'a> {
    pub model: &'a str,
    pub input: &'a [String],
}

/// Embeddings response
#[derive(Debug, Deserialize)]
pub struct EmbeddingResponse {
    pub data: Vec<EmbeddingData>,
    #[serde(default)]
    pub usage: Option<EmbeddingUsage>,
}

/// One embedding in a response
#[derive(Debug, Deserialize)]
pub struct EmbeddingData {
    pub index: usize,
    pub embedding: Vec<f32>,
}

/// Token usage of an embeddings call
#[derive(Debug, Deserialize)]
pub struct EmbeddingUsage {
    pub prompt_tokens: u64,
}

/// Responses API request
#[derive(Debug, Serialize)]
pub struct ResponsesRequest<'a> {
    pub model: &'a str,
    pub input: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

/// Responses API response
#[derive(Debug, Deserialize)]
pub struct ResponsesResponse {
    #[serde(default)]
    pub output: Vec<OutputItem>,
    #[serde(default)]
    pub usage: Option<ResponsesUsage>,
}

/// An item of the `output` array
#[derive(Debug, Deserialize)]
pub struct OutputItem {
    #[serde(rename = "type")]
    pub item_type: String,
    #[serde(default)]
    pub content: Vec<OutputContent>,
}

/// A content part of an output message
#[derive(Debug, Deserialize)]
pub struct OutputContent {
    #[serde(rename = "type")]
    pub content_type: String,
    #[serde(default)]
    pub text: String,
}

/// Token usage of a responses call
#[derive(Debug, Deserialize)]
pub struct ResponsesUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

impl ResponsesResponse {
    /// Concatenated `output_text` parts of every message item
    pub fn output_text(&self) -> String {
        self.output
            .iter()
            .filter(|item| item.item_type == "message")
            .flat_map(|item| item.content.iter())
            .filter(|c| c.content_type == "output_text")
            .map(|c| c.text.as_str())
            .collect()
    }
}

impl OpenAI {
    /// Create a new OpenAI client
    pub fn new(
        api_key: impl Into<String>,
        endpoint: impl Into<String>,
        chat_model: impl Into<String>,
        embedding_model: impl Into<String>,
        timeout_secs: u64,
    ) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(timeout_secs))
                .build()
                .unwrap_or_default(),
            api_key: api_key.into(),
            endpoint: endpoint.into(),
            chat_model: chat_model.into(),
            embedding_model: embedding_model.into(),
            temperature: None,
        }
    }

    /// Use a fixed sampling temperature for responses
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Same connection settings with another chat model
    pub fn with_chat_model(&self, chat_model: impl Into<String>) -> Self {
        Self {
            chat_model: chat_model.into(),
            ..self.clone()
        }
    }

    fn url(&self, path: &str) -> String {
        let base = if self.endpoint.is_empty() {
            "https://api.openai.com/v1"
        } else {
            self.endpoint.trim_end_matches('/')
        };
        format!("{}/{}", base, path)
    }

    async fn post<Req: Serialize + ?Sized, Resp: DeserializeOwned>(
        &self,
        path: &str,
        body: &Req,
    ) -> Result<Resp, ProviderError> {
        let response = self
            .client
            .post(self.url(path))
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await
            .map_err(ProviderError::from_transport)?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to get error response text".to_string());
            error!("OpenAI API error ({}): {}", status, error_text);
            return Err(ProviderError::from_status(status.as_u16(), error_text));
        }

        response
            .json::<Resp>()
            .await
            .map_err(|e| ProviderError::ParseError(format!("Failed to parse OpenAI response: {}", e)))
    }

    /// Call the embeddings endpoint
    pub async fn embeddings(&self, input: &[String]) -> Result<EmbeddingResponse, ProviderError> {
        let request = EmbeddingRequest {
            model: &self.embedding_model,
            input,
        };
        self.post("embeddings", &request).await
    }

    /// Call the responses endpoint
    pub async fn responses(&self, input: &str) -> Result<ResponsesResponse, ProviderError> {
        let request = ResponsesRequest {
            model: &self.chat_model,
            input,
            temperature: self.temperature,
        };
        self.post("responses", &request).await
    }
}

/// Order embeddings by their `index` and check that every input got one
pub fn collect_embeddings(
    mut data: Vec<EmbeddingData>,
    expected: usize,
) -> Result<Vec<Vec<f32>>, ProviderError> {
    if data.len() != expected {
        return Err(ProviderError::ParseError(format!(
            "Expected {} embeddings, got {}",
            expected,
            data.len()
        )));
    }
    data.sort_by_key(|d| d.index);
    Ok(data.into_iter().map(|d| d.embedding).collect())
}

#[async_trait]
impl EmbeddingProvider for OpenAI {
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, ProviderError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let response = self.embeddings(texts).await?;
        if let Some(usage) = &response.usage {
            debug!("Embedded {} texts ({} tokens)", texts.len(), usage.prompt_tokens);
        }
        collect_embeddings(response.data, texts.len())
    }

    fn model_name(&self) -> &str {
        &self.embedding_model
    }
}

#[async_trait]
impl CompletionProvider for OpenAI {
    async fn complete(&self, prompt: &str) -> Result<Completion, ProviderError> {
        let response = self.responses(prompt).await?;
        let text = response.output_text();
        if text.is_empty() {
            return Err(ProviderError::ParseError(
                "OpenAI response contained no output text".to_string(),
            ));
        }

        Ok(Completion {
            text: text.trim().to_string(),
            prompt_tokens: response.usage.as_ref().map(|u| u.input_tokens),
            completion_tokens: response.usage.as_ref().map(|u| u.output_tokens),
        })
    }

    fn model_name(&self) -> &str {
        &self.chat_model
    }
}
