/*!
 * Tests for the provider implementations
 */

use std::time::Duration;

use thesisrag::errors::ProviderError;
use thesisrag::providers::anthropic::Anthropic;
use thesisrag::providers::mock::{MOCK_EMBEDDING_DIM, MockBehavior, MockProvider};
use thesisrag::providers::openai::OpenAI;
use thesisrag::providers::{Completion, CompletionProvider, EmbeddingProvider, TokenUsageStats};

/// Test the OpenAI provider against the real API
#[tokio::test]
#[ignore]
async fn test_openaiProvider_withValidApiKey_shouldEmbedAndComplete() {
    let api_key = std::env::var("OPENAI_API_KEY").unwrap_or_default();
    if api_key.is_empty() {
        return;
    }

    let client = OpenAI::new(api_key, "", "gpt-4o-mini", "text-embedding-3-small", 60);
    let vectors = client.embed_batch(&["retroflex fricative".to_string()]).await.unwrap();
    assert_eq!(vectors.len(), 1);
    assert!(!vectors[0].is_empty());

    let completion = client.complete("Say hello!").await.unwrap();
    assert!(!completion.text.is_empty());
}

/// Test the Anthropic provider against the real API
#[tokio::test]
#[ignore]
async fn test_anthropicProvider_withValidApiKey_shouldComplete() {
    let api_key = std::env::var("ANTHROPIC_API_KEY").unwrap_or_default();
    if api_key.is_empty() {
        return;
    }

    let client = Anthropic::new(api_key, "", "claude-opus-4-5-20251101", 50, 1.0, 60);
    let completion = client.complete("Say hello!").await.unwrap();
    assert!(!completion.text.is_empty());
}

#[tokio::test]
async fn test_openaiProvider_withUnreachableEndpoint_shouldReturnConnectionError() {
    let client = OpenAI::new("sk-test", "http://127.0.0.1:9/v1", "gpt-4o-mini", "text-embedding-3-small", 5);
    let result = client.embed_batch(&["text".to_string()]).await;
    assert!(matches!(result, Err(ProviderError::ConnectionError(_))));
}

#[tokio::test]
async fn test_openaiProvider_withEmptyBatch_shouldNotCallApi() {
    let client = OpenAI::new("sk-test", "http://127.0.0.1:9/v1", "gpt-4o-mini", "text-embedding-3-small", 5);
    let vectors = client.embed_batch(&[]).await.unwrap();
    assert!(vectors.is_empty());
}

#[test]
fn test_openaiProvider_withChatModel_shouldKeepEmbeddingModel() {
    let client = OpenAI::new("sk-test", "", "gpt-4o-mini", "text-embedding-3-small", 5);
    let judge = client.with_chat_model("gpt-4o").with_temperature(0.0);

    assert_eq!(CompletionProvider::model_name(&judge), "gpt-4o");
    assert_eq!(EmbeddingProvider::model_name(&judge), "text-embedding-3-small");
    assert_eq!(CompletionProvider::model_name(&client), "gpt-4o-mini");
}

#[tokio::test]
async fn test_mockProvider_embedBatch_shouldReturnOneVectorPerText() {
    let provider = MockProvider::working();
    let texts = vec!["ʂ and ɕ".to_string(), "vowels".to_string()];

    let vectors = provider.embed_batch(&texts).await.unwrap();

    assert_eq!(vectors.len(), 2);
    assert!(vectors.iter().all(|v| v.len() == MOCK_EMBEDDING_DIM));
    assert_eq!(provider.request_count(), 1);
}

#[tokio::test]
async fn test_mockProvider_withSlowBehavior_shouldStillComplete() {
    let provider = MockProvider::new(MockBehavior::Slow { delay_ms: 10 });
    let completion = tokio::time::timeout(Duration::from_secs(5), provider.complete("hi"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(completion.text, "[MOCK] hi");
}

#[tokio::test]
async fn test_mockProvider_failing_shouldFailEmbeddings() {
    let provider = MockProvider::failing();
    assert!(provider.embed_batch(&["x".to_string()]).await.is_err());
}

#[test]
fn test_tokenUsageStats_record_shouldAccumulateAcrossCalls() {
    let mut stats = TokenUsageStats::with_provider_info("openai", "gpt-4o-mini");
    let completion = Completion {
        text: "answer".to_string(),
        prompt_tokens: Some(120),
        completion_tokens: Some(30),
    };

    stats.record(&completion, Duration::from_millis(200));
    stats.record(&completion, Duration::from_millis(300));

    assert_eq!(stats.requests, 2);
    assert_eq!(stats.prompt_tokens, 240);
    assert_eq!(stats.completion_tokens, 60);
    assert_eq!(stats.total_tokens, 300);
    assert!(stats.summary().contains("Model: gpt-4o-mini"));
}
