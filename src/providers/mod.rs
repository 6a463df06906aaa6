/*!
 * Clients for the hosted model APIs.
 *
 * This module contains client implementations for the services the pipeline
 * delegates to:
 * - OpenAI: embeddings, answer generation and evaluation judgements
 * - Anthropic: synthetic question generation
 *
 * The rest of the crate talks to them through the [`EmbeddingProvider`] and
 * [`CompletionProvider`] traits, so tests can swap in [`mock::MockProvider`].
 */

use async_trait::async_trait;
use std::fmt::Debug;

use crate::errors::ProviderError;

pub mod anthropic;
pub mod mock;
pub mod openai;
pub mod usage;

pub use usage::TokenUsageStats;

/// Text returned by a completion call, with token accounting when the
/// service reports it
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub text: String,
    pub prompt_tokens: Option<u64>,
    pub completion_tokens: Option<u64>,
}

impl Completion {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            prompt_tokens: None,
            completion_tokens: None,
        }
    }
}

/// Turns text into embedding vectors
#[async_trait]
pub trait EmbeddingProvider: Send + Sync + Debug {
    /// Embed several texts; the result is in input order
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, ProviderError>;

    /// Embed a single text
    async fn embed(&self, text: &str) -> Result<Vec<f32>, ProviderError> {
        let mut vectors = self.embed_batch(&[text.to_string()]).await?;
        vectors
            .pop()
            .ok_or_else(|| ProviderError::ParseError("No embedding returned".to_string()))
    }

    /// Model identifier, stored with the index
    fn model_name(&self) -> &str;
}

/// Completes a single prompt
#[async_trait]
pub trait CompletionProvider: Send + Sync + Debug {
    /// Send `prompt` and return the generated text
    async fn complete(&self, prompt: &str) -> Result<Completion, ProviderError>;

    /// Model identifier
    fn model_name(&self) -> &str;
}
