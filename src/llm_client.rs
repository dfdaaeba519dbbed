//! LLM API client abstraction for Gemini, OpenAI and Anthropic.
//!
//! Only structured completions are supported: every request carries a JSON
//! schema and the raw JSON text of the reply is handed back to the caller,
//! which owns validation.

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs, ResponseFormat,
        ResponseFormatJsonSchema,
    },
    Client as OpenAIClient,
};
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, info, instrument};

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const ANTHROPIC_URL: &str = "https://api.anthropic.com/v1/messages";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// LLM provider selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    /// Google Gemini.
    Gemini,
    /// OpenAI (GPT models).
    OpenAI,
    /// Anthropic (Claude models).
    Anthropic,
}

/// Configuration for LLM client.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    provider: LlmProvider,
    api_key: String,
    model: String,
    max_tokens: u32,
}

impl LlmConfig {
    /// Creates a new LLM configuration.
    #[instrument(skip(api_key), fields(provider = ?provider, model = %model))]
    pub fn new(provider: LlmProvider, api_key: String, model: String, max_tokens: u32) -> Self {
        debug!("Creating LLM config");
        Self {
            provider,
            api_key,
            model,
            max_tokens,
        }
    }

    /// Gets the provider.
    pub fn provider(&self) -> LlmProvider {
        self.provider
    }

    /// Gets the API key.
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Gets the model name.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Gets the max tokens.
    pub fn max_tokens(&self) -> u32 {
        self.max_tokens
    }
}

/// LLM client that abstracts over multiple providers.
#[derive(Debug, Clone)]
pub struct LlmClient {
    config: LlmConfig,
    http: reqwest::Client,
}

impl LlmClient {
    /// Creates a new LLM client.
    #[instrument(skip(config), fields(provider = ?config.provider()))]
    pub fn new(config: LlmConfig) -> Self {
        info!("Creating LLM client");
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|e| {
                error!(error = ?e, "Failed to build HTTP client, using defaults");
                reqwest::Client::new()
            });
        Self { config, http }
    }

    /// Returns the client configuration.
    pub fn config(&self) -> &LlmConfig {
        &self.config
    }

    /// Generates a completion constrained to the JSON `schema`.
    ///
    /// Returns the raw JSON text of the reply. Conformance to the schema is
    /// requested from the provider, not verified here.
    #[instrument(
        skip(self, system_prompt, user_message, schema),
        fields(provider = ?self.config.provider, model = %self.config.model)
    )]
    pub async fn generate_structured(
        &self,
        system_prompt: &str,
        user_message: &str,
        schema_name: &str,
        schema: &serde_json::Value,
    ) -> Result<String, LlmError> {
        debug!("Generating structured completion");
        match self.config.provider {
            LlmProvider::Gemini => {
                self.generate_gemini(system_prompt, user_message, schema)
                    .await
            }
            LlmProvider::OpenAI => {
                self.generate_openai(system_prompt, user_message, schema_name, schema)
                    .await
            }
            LlmProvider::Anthropic => {
                self.generate_anthropic(system_prompt, user_message, schema)
                    .await
            }
        }
    }

    /// Generates a completion using Google Gemini.
    #[instrument(skip(self, system_prompt, user_message, schema))]
    async fn generate_gemini(
        &self,
        system_prompt: &str,
        user_message: &str,
        schema: &serde_json::Value,
    ) -> Result<String, LlmError> {
        let url = format!("{}/{}:generateContent", GEMINI_BASE_URL, self.config.model);

        debug!("Building Gemini API request");
        let request_body =
            gemini_request_body(system_prompt, user_message, self.config.max_tokens, schema);

        debug!("Sending request to Gemini");
        let response_json = self
            .post_json(
                self.http
                    .post(url)
                    .header("x-goog-api-key", self.config.api_key.clone())
                    .json(&request_body),
                "Gemini",
            )
            .await?;

        let content = response_json["candidates"][0]["content"]["parts"][0]["text"]
            .as_str()
            .ok_or_else(|| {
                error!(response = %response_json, "No text content in Gemini response");
                LlmError::new("No text content in Gemini response".to_string())
            })?
            .to_string();

        info!(content_length = content.len(), "Generated completion");
        Ok(content)
    }

    /// Generates a completion using Anthropic Claude.
    ///
    /// The Messages API has no schema parameter, so the schema is appended to
    /// the system prompt.
    #[instrument(skip(self, system_prompt, user_message, schema))]
    async fn generate_anthropic(
        &self,
        system_prompt: &str,
        user_message: &str,
        schema: &serde_json::Value,
    ) -> Result<String, LlmError> {
        debug!("Building Anthropic API request");
        let system = format!(
            "{}\n\nRespond with only a JSON object matching this JSON schema, without any other text:\n{}",
            system_prompt, schema
        );
        let request_body = serde_json::json!({
            "model": self.config.model,
            "max_tokens": self.config.max_tokens,
            "system": system,
            "messages": [
                {
                    "role": "user",
                    "content": user_message
                }
            ]
        });

        debug!("Sending request to Anthropic");
        let response_json = self
            .post_json(
                self.http
                    .post(ANTHROPIC_URL)
                    .header("x-api-key", self.config.api_key.clone())
                    .header("anthropic-version", "2023-06-01")
                    .header("content-type", "application/json")
                    .json(&request_body),
                "Anthropic",
            )
            .await?;

        let content = response_json["content"][0]["text"]
            .as_str()
            .ok_or_else(|| {
                error!(response = %response_json, "No text content in Anthropic response");
                LlmError::new("No text content in Anthropic response".to_string())
            })?
            .to_string();

        info!(content_length = content.len(), "Generated completion");
        Ok(content)
    }

    /// Sends a prepared request and decodes a JSON body, mapping every
    /// transport, status and decoding failure to [`LlmError`].
    async fn post_json(
        &self,
        request: reqwest::RequestBuilder,
        provider: &str,
    ) -> Result<serde_json::Value, LlmError> {
        let response = request.send().await.map_err(|e| {
            error!(error = ?e, provider, "API request failed");
            LlmError::new(format!("{} API request failed: {}", provider, e))
        })?;

        let status = response.status();
        let response_text = response.text().await.map_err(|e| {
            error!(error = ?e, provider, "Failed to read response");
            LlmError::new(format!("Failed to read response: {}", e))
        })?;

        if !status.is_success() {
            error!(status = %status, response = %response_text, provider, "API error");
            return Err(LlmError::new(format!(
                "{} API error {}: {}",
                provider, status, response_text
            )));
        }

        debug!(response_length = response_text.len(), provider, "Parsing response");
        serde_json::from_str(&response_text).map_err(|e| {
            error!(error = ?e, response = %response_text, provider, "Failed to parse response");
            LlmError::new(format!("Failed to parse response: {}", e))
        })
    }

    /// Generates a completion using OpenAI.
    #[instrument(skip(self, system_prompt, user_message, schema))]
    async fn generate_openai(
        &self,
        system_prompt: &str,
        user_message: &str,
        schema_name: &str,
        schema: &serde_json::Value,
    ) -> Result<String, LlmError> {
        debug!("Creating OpenAI client");

        let client = OpenAIClient::with_config(
            OpenAIConfig::new().with_api_key(self.config.api_key.clone()),
        );

        debug!("Building chat completion request");
        let messages = vec![
            ChatCompletionRequestMessage::System(
                ChatCompletionRequestSystemMessageArgs::default()
                    .content(system_prompt)
                    .build()
                    .map_err(|e| {
                        error!(error = ?e, "Failed to build system message");
                        LlmError::new(format!("Failed to build system message: {}", e))
                    })?,
            ),
            ChatCompletionRequestMessage::User(
                ChatCompletionRequestUserMessageArgs::default()
                    .content(user_message)
                    .build()
                    .map_err(|e| {
                        error!(error = ?e, "Failed to build user message");
                        LlmError::new(format!("Failed to build user message: {}", e))
                    })?,
            ),
        ];

        let response_format = ResponseFormat::JsonSchema {
            json_schema: ResponseFormatJsonSchema {
                description: None,
                name: schema_name.to_string(),
                schema: Some(schema.clone()),
                strict: Some(true),
            },
        };

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.config.model)
            .messages(messages)
            .max_tokens(self.config.max_tokens)
            .response_format(response_format)
            .build()
            .map_err(|e| {
                error!(error = ?e, "Failed to build request");
                LlmError::new(format!("Failed to build request: {}", e))
            })?;

        debug!("Sending request to OpenAI");
        let response = client.chat().create(request).await.map_err(|e| {
            error!(error = ?e, "OpenAI API error");
            LlmError::new(format!("OpenAI API error: {}", e))
        })?;

        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .ok_or_else(|| {
                error!("No content in OpenAI response");
                LlmError::new("No content in OpenAI response".to_string())
            })?;

        info!(content_length = content.len(), "Generated completion");
        Ok(content)
    }
}

/// Rewrites a JSON schema into the subset Gemini's `responseSchema` accepts.
///
/// Gemini rejects `additionalProperties` and expects upper-case type names.
fn gemini_request_body(
    system_prompt: &str,
    user_message: &str,
    max_tokens: u32,
    schema: &serde_json::Value,
) -> serde_json::Value {
    serde_json::json!({
        "systemInstruction": {
            "parts": [{ "text": system_prompt }]
        },
        "contents": [
            {
                "role": "user",
                "parts": [{ "text": user_message }]
            }
        ],
        "generationConfig": {
            "maxOutputTokens": max_tokens,
            "responseMimeType": "application/json",
            "responseSchema": gemini_schema(schema),
            // Thinking tokens count against maxOutputTokens on 2.5 models.
            "thinkingConfig": { "thinkingBudget": 0 }
        }
    })
}

fn gemini_schema(schema: &serde_json::Value) -> serde_json::Value {
    match schema {
        serde_json::Value::Object(map) => map
            .iter()
            .filter(|(key, _)| key.as_str() != "additionalProperties")
            .map(|(key, value)| {
                let value = match (key.as_str(), value) {
                    ("type", serde_json::Value::String(ty)) => {
                        serde_json::Value::String(ty.to_uppercase())
                    }
                    // Property names are user keys, not schema keywords.
                    ("properties", serde_json::Value::Object(props)) => serde_json::Value::Object(
                        props
                            .iter()
                            .map(|(name, prop)| (name.clone(), gemini_schema(prop)))
                            .collect(),
                    ),
                    _ => gemini_schema(value),
                };
                (key.clone(), value)
            })
            .collect::<serde_json::Map<_, _>>()
            .into(),
        serde_json::Value::Array(items) => items.iter().map(gemini_schema).collect(),
        other => other.clone(),
    }
}

/// LLM client error.
#[derive(Debug, Clone, Display, Error)]
#[display("LLM error: {} at {}:{}", message, file, line)]
pub struct LlmError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl LlmError {
    /// Creates a new LLM error.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        error!(error_message = %message, "LLM error created");
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gemini_schema_uppercases_types_and_drops_additional_properties() {
        let schema = serde_json::json!({
            "type": "object",
            "properties": {
                "type": { "type": "string", "description": "a field literally named type" },
                "emoji": { "type": "string" }
            },
            "required": ["type", "emoji"],
            "additionalProperties": false
        });

        let converted = gemini_schema(&schema);

        assert_eq!(converted["type"], "OBJECT");
        assert_eq!(converted["properties"]["type"]["type"], "STRING");
        assert_eq!(converted["properties"]["emoji"]["type"], "STRING");
        assert_eq!(converted["required"], serde_json::json!(["type", "emoji"]));
        assert!(converted.get("additionalProperties").is_none());
    }

    #[test]
    fn gemini_body_disables_thinking() {
        let body = gemini_request_body("system", "user", 150, &serde_json::json!({"type": "object"}));

        let generation = &body["generationConfig"];
        assert_eq!(generation["thinkingConfig"]["thinkingBudget"], 0);
        assert_eq!(generation["maxOutputTokens"], 150);
        assert_eq!(generation["responseMimeType"], "application/json");
        assert_eq!(generation["responseSchema"]["type"], "OBJECT");
        assert_eq!(body["systemInstruction"]["parts"][0]["text"], "system");
        assert_eq!(body["contents"][0]["parts"][0]["text"], "user");
    }

    #[test]
    fn client_keeps_its_config() {
        let config = LlmConfig::new(
            LlmProvider::Anthropic,
            "key".to_string(),
            "claude-3-5-haiku-20241022".to_string(),
            150,
        );
        let client = LlmClient::new(config.clone());
        assert_eq!(client.config().provider(), LlmProvider::Anthropic);
        assert_eq!(client.config().model(), config.model());
    }

    #[test]
    fn provider_names_are_lowercase() {
        let provider: LlmProvider = serde_json::from_str("\"gemini\"").unwrap();
        assert_eq!(provider, LlmProvider::Gemini);
        assert_eq!(
            serde_json::to_string(&LlmProvider::OpenAI).unwrap(),
            "\"openai\""
        );
    }
}
