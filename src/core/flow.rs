//! Upload flow state machine.
//!
//! [`FlowState`] is an immutable-style value: every transition borrows the
//! current state and returns the next one, so a rejected transition leaves
//! the caller's state untouched.

use std::borrow::Cow;

use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::core::analysis::{AnalysisOutcome, AnalysisResult};
use crate::core::metadata::FileMetadata;

/// Steps of the upload flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadStep {
    /// Waiting for a file.
    #[default]
    Idle,
    /// Simulated transfer in progress.
    Uploading,
    /// Waiting for generated release copy.
    Analyzing,
    /// Metadata and analysis are available.
    Success,
}

impl UploadStep {
    /// Returns a human-readable description of the step.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Idle => "Waiting for a bundle",
            Self::Uploading => "Uploading",
            Self::Analyzing => "Analyzing with AI",
            Self::Success => "Ready to share",
        }
    }

    /// Returns true while a flow is in flight.
    #[must_use]
    pub const fn is_busy(self) -> bool {
        matches!(self, Self::Uploading | Self::Analyzing)
    }
}

/// Where the displayed analysis came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum AnalysisSource {
    /// Parsed from the service response.
    Generated,
    /// The response did not parse.
    ClientFallback,
    /// The service call failed.
    ControllerFallback,
}

impl AnalysisSource {
    fn of(outcome: &AnalysisOutcome) -> Self {
        match outcome {
            AnalysisOutcome::Generated(_) => Self::Generated,
            AnalysisOutcome::ParseFailure { .. } => Self::ClientFallback,
            AnalysisOutcome::TransportFailure { .. } => Self::ControllerFallback,
        }
    }
}

/// Errors from applying a transition in the wrong step.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FlowError {
    /// The transition is not valid from the current step.
    #[error("cannot {action} while {step:?}")]
    InvalidTransition {
        /// Name of the rejected transition.
        action: &'static str,
        /// Step the state was in.
        step: UploadStep,
    },
}

/// State of the upload flow.
///
/// `metadata` and `analysis` are both present exactly when the step is
/// [`UploadStep::Success`]. Metadata derived during analysis is held back
/// until the flow settles.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowState {
    step: UploadStep,
    file_name: Option<String>,
    metadata: Option<FileMetadata>,
    analysis: Option<AnalysisResult>,
    analysis_source: Option<AnalysisSource>,
    error: Option<String>,
    #[serde(skip)]
    pending_metadata: Option<FileMetadata>,
}

impl FlowState {
    /// Creates an idle state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current step.
    #[must_use]
    pub const fn step(&self) -> UploadStep {
        self.step
    }

    /// Name of the file being processed or shown, if any.
    #[must_use]
    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    /// Published metadata. `Some` only in [`UploadStep::Success`].
    #[must_use]
    pub const fn metadata(&self) -> Option<&FileMetadata> {
        self.metadata.as_ref()
    }

    /// Published analysis. `Some` only in [`UploadStep::Success`].
    #[must_use]
    pub const fn analysis(&self) -> Option<&AnalysisResult> {
        self.analysis.as_ref()
    }

    /// Which path produced the published analysis.
    #[must_use]
    pub const fn analysis_source(&self) -> Option<AnalysisSource> {
        self.analysis_source
    }

    /// User-visible error, if any.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Starts a new upload of `file_name` from any step.
    ///
    /// Clears the error and drops any previous metadata and analysis.
    #[must_use]
    pub fn select_file(&self, file_name: impl Into<String>) -> Self {
        let file_name = file_name.into();
        debug!(from = ?self.step, file = %file_name, "selection starts upload");
        Self {
            step: UploadStep::Uploading,
            file_name: Some(file_name),
            ..Self::default()
        }
    }

    /// Records derived metadata and moves to [`UploadStep::Analyzing`].
    ///
    /// # Errors
    ///
    /// Returns [`FlowError::InvalidTransition`] unless the step is
    /// [`UploadStep::Uploading`].
    pub fn finish_upload(&self, metadata: FileMetadata) -> Result<Self, FlowError> {
        if self.step != UploadStep::Uploading {
            return Err(FlowError::InvalidTransition {
                action: "finish upload",
                step: self.step,
            });
        }
        Ok(Self {
            step: UploadStep::Analyzing,
            pending_metadata: Some(metadata),
            ..self.clone()
        })
    }

    /// Publishes metadata together with the analysis chosen from `outcome`.
    ///
    /// Transport failures settle with the controller fallback copy.
    ///
    /// # Errors
    ///
    /// Returns [`FlowError::InvalidTransition`] unless the step is
    /// [`UploadStep::Analyzing`].
    pub fn settle(&self, outcome: &AnalysisOutcome) -> Result<Self, FlowError> {
        let Some(metadata) = self
            .pending_metadata
            .clone()
            .filter(|_| self.step == UploadStep::Analyzing)
        else {
            return Err(FlowError::InvalidTransition {
                action: "settle",
                step: self.step,
            });
        };
        Ok(Self {
            step: UploadStep::Success,
            file_name: self.file_name.clone(),
            metadata: Some(metadata),
            analysis: Some(outcome.resolve()),
            analysis_source: Some(AnalysisSource::of(outcome)),
            error: None,
            pending_metadata: None,
        })
    }

    /// Returns to [`UploadStep::Idle`] with everything cleared.
    #[must_use]
    pub fn reset(&self) -> Self {
        debug!(from = ?self.step, "flow reset");
        Self::default()
    }

    /// Returns an idle state carrying a selection error.
    ///
    /// Used when a chosen path cannot be read, before any upload begins.
    #[must_use]
    pub fn reject_selection(&self, reason: impl Into<String>) -> Self {
        let reason = reason.into();
        debug!(from = ?self.step, %reason, "selection rejected");
        Self {
            error: Some(reason),
            ..Self::default()
        }
    }

    /// Returns a one-line status for the activity pane and status bar.
    #[must_use]
    pub fn status_line(&self) -> Cow<'static, str> {
        match (&self.step, &self.file_name) {
            (UploadStep::Uploading | UploadStep::Analyzing, Some(name)) => {
                Cow::Owned(format!("{} {name}", self.step.description()))
            }
            _ => Cow::Borrowed(self.step.description()),
        }
    }
}
