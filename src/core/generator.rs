//! Text generation backends.
//!
//! [`TextGenerator`] is the seam between the analysis client and the hosted
//! model. [`GeminiGenerator`] talks to the Gemini `generateContent` REST
//! endpoint; tests use a scripted generator instead.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

/// Default Gemini REST base URL.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Default model used for analysis.
pub const DEFAULT_MODEL: &str = "gemini-3-flash-preview";

/// Default HTTP timeout for one generation request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Error bodies longer than this are cut before being stored in an error.
const MAX_ERROR_BODY_CHARS: usize = 300;

/// Errors raised when the generation call itself fails.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// No API key was configured.
    #[error("no API key configured (set GEMINI_API_KEY)")]
    MissingApiKey,
    /// The HTTP request could not be built, sent, or read.
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// The service answered with a non-success status.
    #[error("service returned HTTP {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Leading part of the response body.
        body: String,
    },
    /// The response envelope was not valid service JSON.
    #[error("unreadable response envelope: {0}")]
    InvalidEnvelope(#[source] serde_json::Error),
}

/// A single generation request.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    /// Instruction text.
    pub prompt: String,
    /// Requested MIME type of the generated text, if constrained.
    pub response_mime_type: Option<String>,
    /// Structured-output schema, if constrained.
    pub response_schema: Option<Value>,
}

impl GenerationRequest {
    /// Creates a request for JSON output matching `schema`.
    #[must_use]
    pub fn json(prompt: impl Into<String>, schema: Value) -> Self {
        Self {
            prompt: prompt.into(),
            response_mime_type: Some("application/json".to_string()),
            response_schema: Some(schema),
        }
    }
}

/// Backend that turns a prompt into generated text.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Runs one generation and returns the raw generated text.
    ///
    /// # Errors
    ///
    /// Returns an error if the call does not complete with a readable answer.
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError>;

    /// Returns the display name of this backend.
    fn name(&self) -> &str;
}

/// Connection settings for [`GeminiGenerator`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeminiConfig {
    /// API key; `None` makes every request fail with [`GenerationError::MissingApiKey`].
    pub api_key: Option<String>,
    /// Model name, e.g. `gemini-3-flash-preview`.
    pub model: String,
    /// Base URL up to and including `/models`.
    pub base_url: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl GeminiConfig {
    /// Returns the `generateContent` endpoint for the configured model.
    #[must_use]
    pub fn endpoint(&self) -> String {
        format!(
            "{}/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest<'a> {
    contents: Vec<GeminiContent<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GeminiGenerationConfig<'a>>,
}

#[derive(Debug, Serialize)]
struct GeminiContent<'a> {
    role: &'static str,
    parts: Vec<GeminiPart<'a>>,
}

#[derive(Debug, Serialize)]
struct GeminiPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_schema: Option<&'a Value>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    #[serde(default)]
    content: Option<GeminiResponseContent>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponseContent {
    #[serde(default)]
    parts: Vec<GeminiResponsePart>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponsePart {
    #[serde(default)]
    text: Option<String>,
}

/// Builds the JSON body for a `generateContent` call.
fn build_request_body(request: &GenerationRequest) -> GeminiRequest<'_> {
    let has_constraints =
        request.response_mime_type.is_some() || request.response_schema.is_some();

    GeminiRequest {
        contents: vec![GeminiContent {
            role: "user",
            parts: vec![GeminiPart {
                text: &request.prompt,
            }],
        }],
        generation_config: has_constraints.then(|| GeminiGenerationConfig {
            response_mime_type: request.response_mime_type.as_deref(),
            response_schema: request.response_schema.as_ref(),
        }),
    }
}

/// Extracts the generated text from a `generateContent` response envelope.
///
/// Joins the text parts of the first candidate. A response with no candidate
/// text yields an empty string; deciding whether that is usable is left to
/// the caller.
fn extract_candidate_text(envelope: &str) -> Result<String, GenerationError> {
    let response: GeminiResponse =
        serde_json::from_str(envelope).map_err(GenerationError::InvalidEnvelope)?;

    let text = response
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|part| part.text)
                .collect::<String>()
        })
        .unwrap_or_default();

    Ok(text)
}

fn truncate_error_body(body: &str) -> String {
    if body.chars().count() <= MAX_ERROR_BODY_CHARS {
        body.to_string()
    } else {
        let head: String = body.chars().take(MAX_ERROR_BODY_CHARS).collect();
        format!("{head}...")
    }
}

/// Gemini REST client.
#[derive(Debug, Clone)]
pub struct GeminiGenerator {
    config: GeminiConfig,
    client: Client,
}

impl GeminiGenerator {
    /// Creates a client for the given configuration.
    ///
    /// A missing API key is accepted here and reported on the first request.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(config: GeminiConfig) -> Result<Self, GenerationError> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { config, client })
    }
}

#[async_trait]
impl TextGenerator for GeminiGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or(GenerationError::MissingApiKey)?;

        let url = self.config.endpoint();
        debug!(%url, model = %self.config.model, "sending generateContent request");

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(&build_request_body(request))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        debug!(status = status.as_u16(), bytes = body.len(), "generateContent answered");

        if !status.is_success() {
            return Err(GenerationError::Status {
                status: status.as_u16(),
                body: truncate_error_body(&body),
            });
        }

        extract_candidate_text(&body)
    }

    fn name(&self) -> &str {
        &self.config.model
    }
}

/// Generator that replays scripted answers and records every request.
///
/// Answers are used in order; the last one repeats once the script runs out.
/// An `Err` answer fails as an unavailable service with that reason.
#[cfg(test)]
#[derive(Debug)]
pub struct ScriptedGenerator {
    replies: std::sync::Mutex<Vec<Result<String, String>>>,
    requests: std::sync::Mutex<Vec<GenerationRequest>>,
}

#[cfg(test)]
impl ScriptedGenerator {
    /// Answers with each of `replies` in turn.
    pub fn in_sequence(replies: impl IntoIterator<Item = Result<String, String>>) -> Self {
        Self {
            replies: std::sync::Mutex::new(replies.into_iter().collect()),
            requests: std::sync::Mutex::new(Vec::new()),
        }
    }

    /// Always answers with `body`.
    pub fn replying(body: impl Into<String>) -> Self {
        Self::in_sequence([Ok(body.into())])
    }

    /// Always fails as an unavailable service with `reason`.
    pub fn failing(reason: impl Into<String>) -> Self {
        Self::in_sequence([Err(reason.into())])
    }

    /// Returns the requests received so far.
    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    fn next_reply(&self) -> Result<String, String> {
        let mut replies = self
            .replies
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        if replies.len() > 1 {
            replies.remove(0)
        } else {
            replies
                .first()
                .cloned()
                .unwrap_or_else(|| Err("no scripted reply".to_string()))
        }
    }
}

#[cfg(test)]
#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        self.requests
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(request.clone());
        self.next_reply()
            .map_err(|body| GenerationError::Status { status: 503, body })
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serde_json::json;

    mod request_body {
        use super::*;

        #[test]
        fn json_request_sets_mime_type_and_schema() {
            let schema = json!({"type": "OBJECT"});
            let request = GenerationRequest::json("hello", schema.clone());

            let body = serde_json::to_value(build_request_body(&request)).unwrap();

            assert_eq!(body["contents"][0]["role"], "user");
            assert_eq!(body["contents"][0]["parts"][0]["text"], "hello");
            assert_eq!(
                body["generationConfig"]["responseMimeType"],
                "application/json"
            );
            assert_eq!(body["generationConfig"]["responseSchema"], schema);
        }

        #[test]
        fn unconstrained_request_omits_generation_config() {
            let request = GenerationRequest {
                prompt: "free text".to_string(),
                response_mime_type: None,
                response_schema: None,
            };

            let body = serde_json::to_value(build_request_body(&request)).unwrap();

            assert!(body.get("generationConfig").is_none());
        }
    }

    mod envelope {
        use super::*;

        #[test]
        fn joins_parts_of_first_candidate() {
            let envelope = r#"{
                "candidates": [
                    {"content": {"parts": [{"text": "{\"a\":"}, {"text": "1}"}]}},
                    {"content": {"parts": [{"text": "ignored"}]}}
                ]
            }"#;

            assert_eq!(extract_candidate_text(envelope).unwrap(), "{\"a\":1}");
        }

        #[test]
        fn no_candidates_yields_empty_text() {
            assert_eq!(extract_candidate_text("{}").unwrap(), "");
            assert_eq!(extract_candidate_text(r#"{"candidates": []}"#).unwrap(), "");
        }

        #[test]
        fn candidate_without_content_yields_empty_text() {
            let envelope = r#"{"candidates": [{"finishReason": "SAFETY"}]}"#;
            assert_eq!(extract_candidate_text(envelope).unwrap(), "");
        }

        #[test]
        fn non_json_envelope_is_an_error() {
            let err = extract_candidate_text("<html>bad gateway</html>").unwrap_err();
            assert!(matches!(err, GenerationError::InvalidEnvelope(_)));
        }
    }

    mod config {
        use super::*;

        #[test]
        fn default_uses_public_endpoint() {
            let config = GeminiConfig::default();
            assert_eq!(
                config.endpoint(),
                "https://generativelanguage.googleapis.com/v1beta/models/gemini-3-flash-preview:generateContent"
            );
            assert!(config.api_key.is_none());
        }

        #[test]
        fn endpoint_tolerates_trailing_slash() {
            let config = GeminiConfig {
                base_url: "http://localhost:9000/models/".to_string(),
                model: "test-model".to_string(),
                ..GeminiConfig::default()
            };
            assert_eq!(
                config.endpoint(),
                "http://localhost:9000/models/test-model:generateContent"
            );
        }
    }

    #[test]
    fn long_error_bodies_are_truncated() {
        let body = "x".repeat(MAX_ERROR_BODY_CHARS + 50);
        let truncated = truncate_error_body(&body);
        assert_eq!(truncated.chars().count(), MAX_ERROR_BODY_CHARS + 3);
        assert!(truncated.ends_with("..."));
    }

    #[tokio::test]
    async fn missing_api_key_fails_without_network() {
        let generator = GeminiGenerator::new(GeminiConfig::default()).unwrap();
        let request = GenerationRequest::json("x", json!({}));

        let err = generator.generate(&request).await.unwrap_err();

        assert!(matches!(err, GenerationError::MissingApiKey));
    }

    #[tokio::test]
    async fn blank_api_key_counts_as_missing() {
        let generator = GeminiGenerator::new(GeminiConfig {
            api_key: Some("   ".to_string()),
            ..GeminiConfig::default()
        })
        .unwrap();
        let request = GenerationRequest::json("x", json!({}));

        let err = generator.generate(&request).await.unwrap_err();

        assert!(matches!(err, GenerationError::MissingApiKey));
    }

    #[tokio::test]
    async fn scripted_failure_reports_reason() {
        let generator = ScriptedGenerator::failing("connection refused");
        let request = GenerationRequest::json("x", json!({}));

        let err = generator.generate(&request).await.unwrap_err();

        assert!(err.to_string().contains("connection refused"));
        assert_eq!(generator.requests().len(), 1);
    }

    #[tokio::test]
    async fn scripted_sequence_repeats_last_answer() {
        let generator =
            ScriptedGenerator::in_sequence([Err("down".to_string()), Ok("{}".to_string())]);
        let request = GenerationRequest::json("x", json!({}));

        assert!(generator.generate(&request).await.is_err());
        assert_eq!(generator.generate(&request).await.unwrap(), "{}");
        assert_eq!(generator.generate(&request).await.unwrap(), "{}");
    }
}
