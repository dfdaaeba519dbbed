//! Integration test for LLM advisory connectivity.

use std::sync::Arc;
use strictly_guess::{
    AdvisoryBackend, AdvisoryRequest, Hint, LlmClient, LlmConfig, LlmProvider, parse_advisory,
};

async fn ask(provider: LlmProvider, key_var: &str, model: &str) {
    dotenvy::dotenv().ok();

    let api_key = std::env::var(key_var).unwrap_or_else(|_| panic!("{key_var} not set"));
    let client: Arc<dyn AdvisoryBackend> = Arc::new(LlmClient::new(LlmConfig::new(
        provider,
        api_key,
        model.to_string(),
        150,
    )));

    let request = AdvisoryRequest::new(25, 50, vec![25], Hint::Up);
    let text = client.complete(&request).await.expect("Failed to generate");
    let advisory = parse_advisory(&text).expect("Reply should match the schema");

    eprintln!("Advisory: {} {}", advisory.emoji(), advisory.message());
}

#[tokio::test]
#[cfg_attr(not(feature = "api"), ignore)]
async fn test_gemini_advisory() {
    ask(LlmProvider::Gemini, "GEMINI_API_KEY", "gemini-2.5-flash").await;
}

#[tokio::test]
#[cfg_attr(not(feature = "api"), ignore)]
async fn test_openai_advisory() {
    ask(LlmProvider::OpenAI, "OPENAI_API_KEY", "gpt-4o-mini").await;
}

#[tokio::test]
#[cfg_attr(not(feature = "api"), ignore)]
async fn test_anthropic_advisory() {
    ask(LlmProvider::Anthropic, "ANTHROPIC_API_KEY", "claude-3-5-haiku-20241022").await;
}
