/*!
 * Mock provider implementations for testing.
 *
 * The mock answers both embedding and completion calls without a network:
 * - `MockProvider::working()` - echoes prompts and embeds text as a hashed bag of words
 * - `MockProvider::intermittent(n)` - fails every nth request
 * - `MockProvider::failing()` - always fails with an error
 * - `MockProvider::empty()` - returns empty completions
 *
 * Embeddings are deterministic, so texts sharing words land close together
 * and retrieval tests can rely on cosine ordering.
 */

use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::{Completion, CompletionProvider, EmbeddingProvider};
use crate::errors::ProviderError;

/// Dimension of mock embeddings
pub const MOCK_EMBEDDING_DIM: usize = 64;

/// Behavior mode for the mock provider
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockBehavior {
    /// Always succeeds
    Working,
    /// Fails intermittently (every Nth request)
    Intermittent { fail_every: usize },
    /// Always fails with an error
    Failing,
    /// Returns empty completions
    Empty,
    /// Simulates slow response (for timeout testing)
    Slow { delay_ms: u64 },
}

/// Mock provider for testing retrieval and evaluation flows
#[derive(Debug)]
pub struct MockProvider {
    /// Behavior mode
    behavior: MockBehavior,
    /// Request counter for intermittent failures
    request_count: Arc<AtomicUsize>,
    /// Custom completion generator (optional)
    custom_response: Option<fn(&str) -> String>,
}

impl MockProvider {
    /// Create a new mock provider with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            request_count: Arc::new(AtomicUsize::new(0)),
            custom_response: None,
        }
    }

    /// Create a working mock provider that always succeeds
    pub fn working() -> Self {
        Self::new(MockBehavior::Working)
    }

    /// Create an intermittently failing mock provider
    pub fn intermittent(fail_every: usize) -> Self {
        Self::new(MockBehavior::Intermittent { fail_every })
    }

    /// Create a failing mock provider that always errors
    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    /// Create a mock that returns empty completions
    pub fn empty() -> Self {
        Self::new(MockBehavior::Empty)
    }

    /// Set a custom completion generator
    pub fn with_custom_response(mut self, generator: fn(&str) -> String) -> Self {
        self.custom_response = Some(generator);
        self
    }

    /// Number of requests served so far, shared between clones
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    /// Hashed bag-of-words embedding, L2-normalized
    pub fn embed_text(text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; MOCK_EMBEDDING_DIM];
        for word in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            let bucket = fnv1a(&word.to_lowercase()) as usize % MOCK_EMBEDDING_DIM;
            vector[bucket] += 1.0;
        }

        let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            vector.iter_mut().for_each(|v| *v /= norm);
        }
        vector
    }

    async fn admit(&self) -> Result<(), ProviderError> {
        let count = self.request_count.fetch_add(1, Ordering::SeqCst);

        match self.behavior {
            MockBehavior::Intermittent { fail_every } if fail_every > 0 => {
                if count % fail_every == fail_every - 1 {
                    return Err(ProviderError::ApiError {
                        message: format!("Simulated intermittent failure (request #{})", count + 1),
                        status_code: 503,
                    });
                }
            }
            MockBehavior::Failing => {
                return Err(ProviderError::ApiError {
                    message: "Simulated provider failure".to_string(),
                    status_code: 500,
                });
            }
            MockBehavior::Slow { delay_ms } => {
                tokio::time::sleep(tokio::time::Duration::from_millis(delay_ms)).await;
            }
            _ => {}
        }
        Ok(())
    }
}

fn fnv1a(word: &str) -> u64 {
    word.bytes().fold(0xcbf29ce484222325u64, |hash, byte| {
        (hash ^ byte as u64).wrapping_mul(0x100000001b3)
    })
}

impl Clone for MockProvider {
    fn clone(&self) -> Self {
        Self {
            behavior: self.behavior,
            request_count: Arc::clone(&self.request_count),
            custom_response: self.custom_response,
        }
    }
}

#[async_trait]
impl EmbeddingProvider for MockProvider {
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, ProviderError> {
        self.admit().await?;
        Ok(texts.iter().map(|t| Self::embed_text(t)).collect())
    }

    fn model_name(&self) -> &str {
        "mock-embedding"
    }
}

#[async_trait]
impl CompletionProvider for MockProvider {
    async fn complete(&self, prompt: &str) -> Result<Completion, ProviderError> {
        self.admit().await?;

        let text = match (self.behavior, self.custom_response) {
            (MockBehavior::Empty, _) => String::new(),
            (_, Some(generator)) => generator(prompt),
            _ => format!("[MOCK] {}", prompt.lines().last().unwrap_or_default()),
        };

        Ok(Completion {
            prompt_tokens: Some(prompt.split_whitespace().count() as u64),
            completion_tokens: Some(text.split_whitespace().count() as u64),
            text,
        })
    }

    fn model_name(&self) -> &str {
        "mock-completion"
    }
}
