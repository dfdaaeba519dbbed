//! Best-effort game master commentary for each guess.
//!
//! [`AdvisoryClient::fetch_advisory`] always resolves to a usable
//! [`Advisory`]. Backend errors, timeouts and malformed replies are logged and
//! replaced with a fixed message derived from the hint alone.

use crate::games::guessing::Hint;
use crate::llm_client::{LlmClient, LlmError};
use async_trait::async_trait;
use derive_getters::Getters;
use derive_more::{Display, Error};
use derive_new::new;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Default upper bound on a single advisory round trip.
pub const DEFAULT_ADVISORY_TIMEOUT: Duration = Duration::from_secs(8);

const SYSTEM_PROMPT: &str = "You are the witty Game Master of a number guessing game. \
The player tries to find a secret number between 1 and 100 in at most 10 guesses.";

const SCHEMA_NAME: &str = "game_master_comment";

/// Flavor text shown next to a guess outcome.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct Advisory {
    /// Display message, never blank.
    message: String,
    /// Accompanying emoji.
    emoji: String,
}

impl Advisory {
    /// Creates an advisory from its parts.
    pub fn new(message: impl Into<String>, emoji: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            emoji: emoji.into(),
        }
    }

    /// Greeting shown when a session starts.
    pub fn greeting() -> Self {
        Self::new("자, 제가 생각하는 1에서 100 사이의 숫자를 맞춰보세요!", "🔮")
    }

    /// Feedback for a number that was already guessed.
    pub fn duplicate() -> Self {
        Self::new("이미 입력했던 숫자예요!", "⚠️")
    }

    /// Deterministic stand-in used whenever the backend cannot answer.
    pub fn fallback(hint: Hint) -> Self {
        match hint {
            Hint::Up => Self::new("더 높은 숫자예요!", "💡"),
            Hint::Down => Self::new("더 낮은 숫자예요!", "💡"),
            Hint::Correct => Self::new("정답입니다!", "🎉"),
        }
    }
}

/// Context for one advisory request.
#[derive(Debug, Clone, PartialEq, Eq, Getters, new)]
pub struct AdvisoryRequest {
    /// The guess just submitted.
    guess: u32,
    /// The secret target.
    target: u32,
    /// All guessed values so far, newest first.
    history: Vec<u32>,
    /// Hint computed for `guess`.
    hint: Hint,
}

impl AdvisoryRequest {
    /// Renders the natural-language prompt sent to the generation service.
    pub fn prompt(&self) -> String {
        let history = self
            .history
            .iter()
            .map(u32::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "The user guessed {}. The target number is {}. The hint is {}. \
             Previous guesses: [{}]. Provide a very short, witty, and encouraging \
             comment as a Game Master in Korean.",
            self.guess, self.target, self.hint, history
        )
    }

    /// JSON schema the reply must satisfy.
    pub fn schema() -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "message": {
                    "type": "string",
                    "description": "A witty comment in Korean"
                },
                "emoji": {
                    "type": "string",
                    "description": "A relevant emoji"
                }
            },
            "required": ["message", "emoji"],
            "additionalProperties": false
        })
    }
}

/// A service able to produce raw structured advisory text.
#[async_trait]
pub trait AdvisoryBackend: Send + Sync {
    /// Requests a reply for `request`, returning the raw JSON text.
    async fn complete(&self, request: &AdvisoryRequest) -> Result<String, LlmError>;
}

#[async_trait]
impl AdvisoryBackend for LlmClient {
    #[instrument(skip(self, request), fields(guess = request.guess, hint = %request.hint))]
    async fn complete(&self, request: &AdvisoryRequest) -> Result<String, LlmError> {
        self.generate_structured(
            SYSTEM_PROMPT,
            &request.prompt(),
            SCHEMA_NAME,
            &AdvisoryRequest::schema(),
        )
        .await
    }
}

/// Advisory failure. Never escapes [`AdvisoryClient`]; logged only.
#[derive(Debug, Clone, Display, Error)]
#[display("Advisory error: {} at {}:{}", message, file, line)]
pub struct AdvisoryError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl AdvisoryError {
    /// Creates a new advisory error.
    #[track_caller]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}

impl From<LlmError> for AdvisoryError {
    #[track_caller]
    fn from(err: LlmError) -> Self {
        Self::new(err.message)
    }
}

/// Parses a structured reply into an [`Advisory`].
///
/// Accepts a bare JSON object or one wrapped in a Markdown code fence. A
/// missing field, a non-string field or a blank field fails the whole reply.
///
/// # Errors
///
/// Returns [`AdvisoryError`] when the text does not describe a valid advisory.
pub fn parse_advisory(text: &str) -> Result<Advisory, AdvisoryError> {
    let body = strip_code_fence(text.trim());
    let value: serde_json::Value = serde_json::from_str(body)
        .map_err(|e| AdvisoryError::new(format!("Malformed advisory reply: {}", e)))?;

    // Derived `Deserialize` also accepts a struct written as a sequence.
    let serde_json::Value::Object(map) = value else {
        return Err(AdvisoryError::new("Advisory reply is not a JSON object"));
    };
    let advisory: Advisory = serde_json::from_value(serde_json::Value::Object(map))
        .map_err(|e| AdvisoryError::new(format!("Malformed advisory reply: {}", e)))?;

    if advisory.message.trim().is_empty() {
        return Err(AdvisoryError::new("Advisory message is blank"));
    }
    if advisory.emoji.trim().is_empty() {
        return Err(AdvisoryError::new("Advisory emoji is blank"));
    }

    Ok(Advisory::new(advisory.message.trim(), advisory.emoji.trim()))
}

fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let rest = rest.trim_end();
    let rest = rest.strip_suffix("```").unwrap_or(rest);
    // Drop the info string (`json`) on the opening fence line, if any.
    let body = match rest.split_once('\n') {
        Some((info, body)) if !info.trim_start().starts_with(['{', '[']) => body,
        _ => rest,
    };
    body.trim()
}

/// Stateless request/response wrapper around an [`AdvisoryBackend`].
#[derive(Clone)]
pub struct AdvisoryClient {
    backend: Option<Arc<dyn AdvisoryBackend>>,
    timeout: Duration,
}

impl std::fmt::Debug for AdvisoryClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdvisoryClient")
            .field("online", &self.is_online())
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl AdvisoryClient {
    /// Creates a client backed by `backend`.
    #[instrument(skip(backend))]
    pub fn new(backend: Arc<dyn AdvisoryBackend>, timeout: Duration) -> Self {
        info!("Creating advisory client");
        Self {
            backend: Some(backend),
            timeout,
        }
    }

    /// Creates a client with no backend; every fetch returns the fallback.
    #[instrument]
    pub fn offline() -> Self {
        info!("Creating offline advisory client");
        Self {
            backend: None,
            timeout: DEFAULT_ADVISORY_TIMEOUT,
        }
    }

    /// Returns true if a backend is configured.
    pub fn is_online(&self) -> bool {
        self.backend.is_some()
    }

    /// Returns the per-request timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Fetches commentary for a guess. Never fails.
    #[instrument(skip(self, history))]
    pub async fn fetch_advisory(
        &self,
        guess: u32,
        target: u32,
        history: Vec<u32>,
        hint: Hint,
    ) -> Advisory {
        self.fetch(&AdvisoryRequest::new(guess, target, history, hint))
            .await
    }

    /// Fetches commentary for a prepared request. Never fails.
    #[instrument(skip(self, request), fields(guess = request.guess, hint = %request.hint))]
    pub async fn fetch(&self, request: &AdvisoryRequest) -> Advisory {
        match self.try_fetch(request).await {
            Ok(advisory) => {
                debug!(emoji = %advisory.emoji, "Advisory received");
                advisory
            }
            Err(e) => {
                warn!(error = %e, "Advisory unavailable, using fallback");
                Advisory::fallback(request.hint)
            }
        }
    }

    async fn try_fetch(&self, request: &AdvisoryRequest) -> Result<Advisory, AdvisoryError> {
        let backend = self
            .backend
            .as_ref()
            .ok_or_else(|| AdvisoryError::new("No advisory backend configured"))?;

        let text = tokio::time::timeout(self.timeout, backend.complete(request))
            .await
            .map_err(|_| {
                AdvisoryError::new(format!("Advisory timed out after {:?}", self.timeout))
            })??;

        parse_advisory(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn fallback_is_never_blank() {
        for hint in Hint::iter() {
            let advisory = Advisory::fallback(hint);
            assert!(!advisory.message().is_empty());
            assert!(!advisory.emoji().is_empty());
        }
        assert_eq!(Advisory::fallback(Hint::Correct).emoji(), "🎉");
        assert_eq!(Advisory::fallback(Hint::Up).emoji(), "💡");
    }

    #[test]
    fn parses_plain_json() {
        let advisory = parse_advisory(r#"{"message": "조금만 더!", "emoji": "🔥"}"#).unwrap();
        assert_eq!(advisory, Advisory::new("조금만 더!", "🔥"));
    }

    #[test]
    fn parses_fenced_json() {
        let text = "```json\n{\"message\": \"거의 다 왔어요\", \"emoji\": \"👀\"}\n```";
        let advisory = parse_advisory(text).unwrap();
        assert_eq!(advisory.message(), "거의 다 왔어요");
    }

    #[test]
    fn parses_single_line_fence() {
        let advisory = parse_advisory(r#"```{"message":"a","emoji":"b"}```"#).unwrap();
        assert_eq!(advisory, Advisory::new("a", "b"));
    }

    #[test]
    fn rejects_array_with_advisory_fields() {
        let error = parse_advisory(r#"["hi", "🙂"]"#).unwrap_err();
        assert!(error.message.contains("not a JSON object"));
    }

    #[test]
    fn rejects_shape_mismatches() {
        for text in [
            "",
            "not json",
            r#"{"message": "hi"}"#,
            r#"{"emoji": "🙂"}"#,
            r#"{"message": 3, "emoji": "🙂"}"#,
            r#"{"message": "   ", "emoji": "🙂"}"#,
            r#"{"message": "hi", "emoji": ""}"#,
            r#"["hi", "🙂"]"#,
        ] {
            assert!(parse_advisory(text).is_err(), "accepted {text:?}");
        }
    }

    #[test]
    fn prompt_carries_full_context() {
        let request = AdvisoryRequest::new(75, 50, vec![75, 25], Hint::Down);
        let prompt = request.prompt();
        assert!(prompt.contains("guessed 75"));
        assert!(prompt.contains("target number is 50"));
        assert!(prompt.contains("hint is DOWN"));
        assert!(prompt.contains("[75, 25]"));
    }

    #[test]
    fn schema_requires_both_fields() {
        let schema = AdvisoryRequest::schema();
        assert_eq!(schema["required"], serde_json::json!(["message", "emoji"]));
        assert_eq!(schema["properties"]["message"]["type"], "string");
        assert_eq!(schema["properties"]["emoji"]["type"], "string");
    }
}
