//! Generated release copy and the analysis client.
//!
//! The client asks a [`TextGenerator`] for three text fields and reports one
//! of three outcomes:
//!
//! - **`Generated`**: the body parsed as the expected structure.
//! - **`ParseFailure`**: the call succeeded but the body was unusable; the
//!   client substitutes [`AnalysisResult::client_fallback`].
//! - **`TransportFailure`**: the call itself failed; the flow controller
//!   substitutes [`AnalysisResult::controller_fallback`] when settling.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::core::generator::{GenerationRequest, TextGenerator};
use crate::core::prompts::{analysis_prompt, analysis_schema};

/// Release copy produced for an uploaded bundle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub release_notes: String,
    pub security_summary: String,
    pub marketing_copy: String,
}

impl AnalysisResult {
    /// Creates a result from its three fields.
    #[must_use]
    pub fn new(
        release_notes: impl Into<String>,
        security_summary: impl Into<String>,
        marketing_copy: impl Into<String>,
    ) -> Self {
        Self {
            release_notes: release_notes.into(),
            security_summary: security_summary.into(),
            marketing_copy: marketing_copy.into(),
        }
    }

    /// Copy used when the service answered but the body could not be parsed.
    #[must_use]
    pub fn client_fallback() -> Self {
        Self::new(
            "Minor bug fixes and performance improvements.",
            "Safe to install. No harmful permissions detected.",
            "The latest version of your favorite app is here!",
        )
    }

    /// Copy used when the service call never completed.
    #[must_use]
    pub fn controller_fallback() -> Self {
        Self::new(
            "Minor updates and stability improvements.",
            "Scanned for common vulnerabilities.",
            "Download the latest version now.",
        )
    }
}

/// Result of one analysis attempt, tagged by the path that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisOutcome {
    /// The service returned a well-formed result.
    Generated(AnalysisResult),
    /// The service answered with a body that did not match the schema.
    ParseFailure {
        /// Client-level fallback copy.
        fallback: AnalysisResult,
        /// Why parsing failed.
        reason: String,
    },
    /// The service call failed before a body was received.
    TransportFailure {
        /// Description of the transport or service error.
        reason: String,
    },
}

impl AnalysisOutcome {
    /// Returns the copy to display, applying the controller fallback for
    /// transport failures.
    #[must_use]
    pub fn resolve(&self) -> AnalysisResult {
        match self {
            Self::Generated(result) | Self::ParseFailure {
                fallback: result, ..
            } => result.clone(),
            Self::TransportFailure { .. } => AnalysisResult::controller_fallback(),
        }
    }

    /// Short label for logs and the activity pane.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Generated(_) => "generated",
            Self::ParseFailure { .. } => "client fallback",
            Self::TransportFailure { .. } => "controller fallback",
        }
    }

    /// Returns true if the displayed copy came from the service.
    #[must_use]
    pub const fn is_generated(&self) -> bool {
        matches!(self, Self::Generated(_))
    }
}

/// Parses a raw response body into an [`AnalysisResult`].
///
/// All three fields are required and must be strings.
///
/// # Errors
///
/// Returns the JSON error for empty, non-JSON, or mis-shaped bodies.
pub fn parse_analysis(body: &str) -> Result<AnalysisResult, serde_json::Error> {
    serde_json::from_str(body.trim())
}

/// Requests release copy for `file_name` from `generator`.
///
/// Never fails: every fault is folded into the returned outcome.
pub async fn analyze(generator: &dyn TextGenerator, file_name: &str) -> AnalysisOutcome {
    let request = GenerationRequest::json(analysis_prompt(file_name), analysis_schema());

    let body = match generator.generate(&request).await {
        Ok(body) => body,
        Err(e) => {
            warn!(error = %e, file = file_name, "analysis request failed");
            return AnalysisOutcome::TransportFailure {
                reason: e.to_string(),
            };
        }
    };

    match parse_analysis(&body) {
        Ok(result) => {
            info!(file = file_name, "analysis generated");
            AnalysisOutcome::Generated(result)
        }
        Err(e) => {
            warn!(error = %e, file = file_name, "failed to parse analysis response");
            AnalysisOutcome::ParseFailure {
                fallback: AnalysisResult::client_fallback(),
                reason: e.to_string(),
            }
        }
    }
}
