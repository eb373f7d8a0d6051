//! Prompt and response schema for bundle analysis.
//!
//! The schema uses the Gemini `responseSchema` dialect (upper-case OpenAPI
//! type names) and requires exactly the three fields of
//! [`crate::core::AnalysisResult`].

use serde_json::{Value, json};

/// JSON field names the service must return.
pub const ANALYSIS_FIELDS: [&str; 3] = ["releaseNotes", "securitySummary", "marketingCopy"];

/// Builds the instruction sent for `file_name`.
#[must_use]
pub fn analysis_prompt(file_name: &str) -> String {
    format!(
        "Analyze this mobile app file name: \"{file_name}\".\n\
         Provide a professional JSON response with:\n\
         1. A set of suggested Release Notes for this version (assuming it's a new update).\n\
         2. A brief security check summary (hypothetical, based on standard app practices).\n\
         3. A short marketing tagline and description."
    )
}

/// Returns the structured-output schema for the analysis response.
#[must_use]
pub fn analysis_schema() -> Value {
    let properties: serde_json::Map<String, Value> = ANALYSIS_FIELDS
        .iter()
        .map(|field| ((*field).to_string(), json!({ "type": "STRING" })))
        .collect();

    json!({
        "type": "OBJECT",
        "properties": properties,
        "required": ANALYSIS_FIELDS,
    })
}
