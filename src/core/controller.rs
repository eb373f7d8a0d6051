//! Upload flow controller.
//!
//! Drives one upload at a time through the pure [`FlowState`] transitions:
//! simulated delay, metadata derivation, analysis, settle. Every new state
//! is published to an optional observer channel so the UI can follow along.

use std::sync::Arc;
use std::time::Duration;

use chrono::{Local, NaiveDate};
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::app::FlowEvent;
use crate::core::analysis::{AnalysisOutcome, analyze};
use crate::core::flow::{FlowError, FlowState};
use crate::core::generator::TextGenerator;
use crate::core::metadata::{BundleFile, FileMetadata};
use crate::tui::widgets::OutputLine;

/// Default simulated upload time.
pub const DEFAULT_UPLOAD_DELAY: Duration = Duration::from_millis(2000);

/// Returns the local calendar date.
#[must_use]
pub fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

/// Tunables for a controller.
#[derive(Debug, Clone, Copy)]
pub struct UploadOptions {
    /// How long the simulated transfer takes.
    pub upload_delay: Duration,
    /// Clock used to stamp the upload date.
    pub today: fn() -> NaiveDate,
}

impl Default for UploadOptions {
    fn default() -> Self {
        Self {
            upload_delay: DEFAULT_UPLOAD_DELAY,
            today: local_today,
        }
    }
}

/// Owns the flow state and runs uploads against a [`TextGenerator`].
pub struct UploadController {
    state: FlowState,
    generator: Arc<dyn TextGenerator>,
    options: UploadOptions,
    events: Option<mpsc::Sender<FlowEvent>>,
}

impl UploadController {
    /// Creates an idle controller.
    #[must_use]
    pub fn new(generator: Arc<dyn TextGenerator>, options: UploadOptions) -> Self {
        Self {
            state: FlowState::new(),
            generator,
            options,
            events: None,
        }
    }

    /// Publishes every state change and activity line to `tx`.
    #[must_use]
    pub fn with_events(mut self, tx: mpsc::Sender<FlowEvent>) -> Self {
        self.events = Some(tx);
        self
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> &FlowState {
        &self.state
    }

    /// Consumes the controller, returning its final state.
    #[must_use]
    pub fn into_state(self) -> FlowState {
        self.state
    }

    /// Runs a full upload of `file` and returns the settled state.
    ///
    /// Analysis faults never fail the flow: a transport failure settles with
    /// the controller fallback and is only logged.
    ///
    /// # Errors
    ///
    /// Returns [`FlowError`] only if a transition is applied out of order,
    /// which the sequence below never does.
    pub async fn select_file(&mut self, file: &BundleFile) -> Result<&FlowState, FlowError> {
        info!(file = %file.name, bytes = file.size, "upload started");
        self.apply(self.state.select_file(&file.name)).await;
        self.emit(OutputLine::running(format!("Uploading {}...", file.name)))
            .await;

        tokio::time::sleep(self.options.upload_delay).await;

        let metadata = FileMetadata::derive(file, (self.options.today)());
        self.emit(OutputLine::info(format!(
            "Uploaded {} ({}, .{})",
            metadata.name, metadata.size, metadata.file_type
        )))
        .await;
        self.apply(self.state.finish_upload(metadata)?).await;
        let backend = self.generator.name().to_string();
        info!(%backend, "requesting analysis");
        self.emit(OutputLine::running(format!(
            "Generating release notes with {backend}..."
        )))
        .await;

        let outcome = analyze(self.generator.as_ref(), &file.name).await;
        match &outcome {
            AnalysisOutcome::Generated(_) => {
                self.emit(OutputLine::success("Release copy generated")).await;
            }
            AnalysisOutcome::ParseFailure { reason, .. } => {
                self.emit(OutputLine::warning(format!(
                    "Unreadable AI response, using default copy: {reason}"
                )))
                .await;
            }
            AnalysisOutcome::TransportFailure { reason } => {
                warn!(%reason, "analysis unavailable, settling with fallback copy");
                self.emit(OutputLine::warning(format!(
                    "AI analysis unavailable, using default copy: {reason}"
                )))
                .await;
            }
        }

        self.apply(self.state.settle(&outcome)?).await;
        info!(file = %file.name, source = outcome.label(), "upload settled");
        Ok(&self.state)
    }

    /// Returns to idle, clearing metadata, analysis, and error.
    pub async fn reset(&mut self) {
        self.apply(self.state.reset()).await;
    }

    async fn apply(&mut self, next: FlowState) {
        self.state = next;
        if let Some(tx) = &self.events {
            tx.send(FlowEvent::StateChanged(self.state.clone()))
                .await
                .ok();
        }
    }

    async fn emit(&self, line: OutputLine) {
        if let Some(tx) = &self.events {
            tx.send(FlowEvent::Output(line)).await.ok();
        }
    }
}
