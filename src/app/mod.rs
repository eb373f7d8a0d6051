//! Main application state and logic.
//!
//! Submodules:
//! - `state` - state structures and the UI event type
//! - `layout` - per-frame layout calculation
//! - `events` - key, paste and flow event handling
//! - `render` - drawing both screens
//!
//! ## Screens
//!
//! - **`Upload`**: path input with a fuzzy bundle picker, the current step,
//!   a progress gauge and the activity log. New selections are ignored while
//!   an upload is in flight.
//! - **`Result`**: shown once the flow settles. Metadata, generated copy and
//!   a share link. Enter resets the flow and returns to `Upload`.

pub mod events;
mod layout;
mod render;
pub mod state;

#[cfg(test)]
mod tests;

pub use layout::{ResultLayout, UploadLayout, calculate_result_layout, calculate_upload_layout};

use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use ratatui::layout::Rect;
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::bundle_search::{BundleMatch, search_bundles};
use crate::cli::Args;
use crate::core::{
    BundleFile, FlowState, GeminiGenerator, TextGenerator, UploadController, UploadOptions,
};
use crate::fs::{AppPaths, PersistedSettings};
use crate::tui::Theme;
use crate::tui::widgets::{OutputLine, PopupState};

pub use self::state::{
    AppMode, FlowEvent, FlowUiState, LayoutState, PATH_PLACEHOLDER, PathInputState, ScrollState,
    SearchQuery,
};

/// Channel buffer size for flow events.
const EVENT_CHANNEL_SIZE: usize = 1000;

/// Minimum time between two searches for the same query.
const BUNDLE_SEARCH_DEBOUNCE_MS: u64 = 50;

/// Main application state.
pub struct App {
    pub(crate) paths: AppPaths,
    /// Effective settings (persisted values with CLI overrides applied).
    pub(crate) settings: PersistedSettings,
    generator: Arc<dyn TextGenerator>,
    pub(crate) upload_options: UploadOptions,
    /// Latest flow snapshot received from the upload task.
    pub(crate) flow: FlowState,
    /// Link generated when the flow settles.
    pub(crate) share_link: Option<String>,
    pub(crate) theme: Theme,
    pub(crate) mode: AppMode,
    should_quit: bool,
    /// True from spawning an upload until its `Done` event.
    is_running: bool,

    event_rx: mpsc::Receiver<FlowEvent>,
    event_tx: mpsc::Sender<FlowEvent>,

    pub(crate) path_input: PathInputState,
    pub(crate) flow_ui: FlowUiState,
    pub(crate) layout: LayoutState,
}

/// Runs bundle searches off the UI thread.
///
/// The `ignore` walker blocks, so each query runs on the blocking pool. Every
/// result carries its query's generation; the UI drops stale ones.
fn spawn_search_task(
    mut search_rx: mpsc::Receiver<SearchQuery>,
    event_tx: mpsc::Sender<FlowEvent>,
) {
    tokio::spawn(async move {
        while let Some(query) = search_rx.recv().await {
            let generation = query.generation;
            let search =
                tokio::task::spawn_blocking(move || search_bundles(&query.query, &query.root))
                    .await;

            if let Ok(result) = search {
                let _ = event_tx
                    .send(FlowEvent::SearchResult { generation, result })
                    .await;
            }
        }
    });
}

impl App {
    /// Creates the application rooted at `paths`.
    ///
    /// Settings are loaded (and written on first run); a broken settings file
    /// is reported in the activity log and defaults are used. If `args` names
    /// a bundle, its upload starts immediately.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new_with_paths(args: &Args, paths: AppPaths) -> Result<Self> {
        let (persisted, settings_error) = match paths.load_or_init_settings() {
            Ok(settings) => (settings, None),
            Err(e) => {
                let detail = format!("{e:#}");
                warn!(error = %detail, "settings unusable, using defaults");
                (PersistedSettings::default(), Some(e))
            }
        };
        let settings = persisted.overridden_by(args.setting_overrides());
        let generator = Arc::new(GeminiGenerator::new(args.gemini_config(&settings))?);

        let mut app = Self::with_generator(paths, settings, generator);
        if let Some(e) = settings_error {
            app.flow_ui.push(OutputLine::warning(format!(
                "Failed to load settings, using defaults: {e:#}"
            )));
        }
        if args.resolved_api_key().is_none() {
            app.flow_ui.push(OutputLine::warning(
                "No API key set (GEMINI_API_KEY); uploads will use default release copy",
            ));
        }
        if let Some(bundle) = &args.bundle {
            app.submit_path(bundle);
        }
        Ok(app)
    }

    /// Creates the application with an explicit generator.
    ///
    /// Must be called inside a tokio runtime (the bundle search task is
    /// spawned here).
    #[must_use]
    pub fn with_generator(
        paths: AppPaths,
        settings: PersistedSettings,
        generator: Arc<dyn TextGenerator>,
    ) -> Self {
        let (event_tx, event_rx) = mpsc::channel(EVENT_CHANNEL_SIZE);
        let (search_tx, search_rx) = mpsc::channel(16);
        spawn_search_task(search_rx, event_tx.clone());

        let upload_options = UploadOptions {
            upload_delay: settings.upload_delay(),
            ..UploadOptions::default()
        };

        Self {
            paths,
            settings,
            generator,
            upload_options,
            flow: FlowState::new(),
            share_link: None,
            theme: Theme::default(),
            mode: AppMode::Upload,
            should_quit: false,
            is_running: false,
            event_rx,
            event_tx,
            path_input: PathInputState::new(search_tx),
            flow_ui: FlowUiState::default(),
            layout: LayoutState::default(),
        }
    }

    #[must_use]
    pub const fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Returns true while an upload task is in flight.
    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.is_running
    }

    #[must_use]
    pub const fn mode(&self) -> AppMode {
        self.mode
    }

    /// Latest flow snapshot.
    #[must_use]
    pub const fn flow(&self) -> &FlowState {
        &self.flow
    }

    /// Share link of the settled upload, if any.
    #[must_use]
    pub fn share_link(&self) -> Option<&str> {
        self.share_link.as_deref()
    }

    /// Computes and caches both screen layouts. Call once per frame.
    pub fn update_layout(&mut self, terminal_area: Rect) {
        self.layout.upload = calculate_upload_layout(terminal_area);
        self.layout.result = calculate_result_layout(terminal_area);
    }

    // =========================================================================
    // Upload
    // =========================================================================

    /// Submits whatever is in the path input.
    pub(crate) fn submit_path_input(&mut self) {
        let text = self.path_input.text();
        if text.is_empty() {
            return;
        }
        self.path_input.clear();
        self.submit_path(Path::new(&text));
    }

    /// Selects the file at `path` for upload.
    ///
    /// Relative paths resolve against the base directory. A path that cannot
    /// be read as a file leaves the flow idle with a visible error. Files
    /// without an accepted extension are uploaded anyway, with a notice.
    /// Ignored while an upload is in flight.
    pub fn submit_path(&mut self, path: &Path) {
        if self.is_running {
            return;
        }

        let resolved = if path.is_relative() {
            self.paths.base().join(path)
        } else {
            path.to_path_buf()
        };

        match BundleFile::inspect(&resolved) {
            Ok(file) => {
                if !file.has_accepted_extension() {
                    self.flow_ui.push(OutputLine::info(format!(
                        "{} is not an .apk, .ipa or .zip; uploading anyway",
                        file.name
                    )));
                }
                self.start_upload(file);
            }
            Err(e) => {
                let reason = format!("{e:#}");
                warn!(path = %resolved.display(), %reason, "selection rejected");
                self.flow = self.flow.reject_selection(reason.clone());
                self.flow_ui.push(OutputLine::error(reason));
            }
        }
    }

    /// Spawns a controller for `file` on its own task.
    fn start_upload(&mut self, file: BundleFile) {
        info!(file = %file.name, "starting upload");
        self.is_running = true;
        self.share_link = None;

        let tx = self.event_tx.clone();
        let generator = Arc::clone(&self.generator);
        let options = self.upload_options;
        tokio::spawn(async move {
            let mut controller = UploadController::new(generator, options).with_events(tx.clone());
            if let Err(e) = controller.select_file(&file).await {
                let _ = tx.send(FlowEvent::Output(OutputLine::error(e.to_string()))).await;
            }
            let _ = tx.send(FlowEvent::Done).await;
        });
    }

    /// Clears the settled upload and returns to the upload screen.
    pub(crate) fn reset_to_upload(&mut self) {
        self.flow = self.flow.reset();
        self.share_link = None;
        self.mode = AppMode::Upload;
        self.flow_ui = FlowUiState::default();
        self.path_input.clear();
    }

    // =========================================================================
    // Bundle Picker
    // =========================================================================

    /// Re-runs the picker search after the input changed.
    ///
    /// An empty input hides the picker; use [`Self::open_bundle_picker`] to
    /// browse without typing.
    pub(crate) fn update_bundle_search(&mut self) {
        let query = self.path_input.text();
        if query.is_empty() {
            self.path_input.dismiss_popup();
            return;
        }

        let should_search = match (
            &self.path_input.last_search_query,
            self.path_input.last_search_time,
        ) {
            (Some(last_query), Some(last_time)) => {
                last_query != &query
                    || last_time.elapsed() >= Duration::from_millis(BUNDLE_SEARCH_DEBOUNCE_MS)
            }
            _ => true,
        };
        if should_search {
            self.perform_bundle_search(&query);
        }
    }

    /// Opens the picker for the current input, listing bundles first.
    pub(crate) fn open_bundle_picker(&mut self) {
        let query = self.path_input.text();
        self.perform_bundle_search(&query);
    }

    /// Sends `query` to the search task and shows the loading state.
    pub(crate) fn perform_bundle_search(&mut self, query: &str) {
        if self.path_input.last_search_query.as_deref() != Some(query)
            && let PopupState::Showing { selected, .. } = &mut self.path_input.popup_state
        {
            *selected = 0;
        }

        self.path_input.last_search_query = Some(query.to_string());
        self.path_input.last_search_time = Some(Instant::now());
        self.path_input.search_generation = self.path_input.search_generation.wrapping_add(1);
        if !matches!(self.path_input.popup_state, PopupState::Showing { .. }) {
            self.path_input.popup_state = PopupState::Loading;
        }

        // A full channel drops the query; the next keystroke sends a newer one.
        let _ = self.path_input.search_tx.try_send(SearchQuery {
            query: query.to_string(),
            root: self.paths.base().to_path_buf(),
            generation: self.path_input.search_generation,
        });
    }

    /// Returns true if the picker is on screen.
    #[must_use]
    pub fn bundle_popup_visible(&self) -> bool {
        self.path_input.popup_state.is_visible()
    }

    /// Returns the highlighted picker entry.
    #[must_use]
    pub fn selected_bundle(&self) -> Option<&BundleMatch> {
        self.path_input.popup_state.selected_match()
    }

    /// Copies the highlighted entry into the input without submitting.
    pub(crate) fn fill_from_popup(&mut self) {
        let Some(path) = self.selected_bundle().map(|m| m.path.display().to_string()) else {
            return;
        };
        self.path_input.set_text(&path);
        self.path_input.dismiss_popup();
    }

    /// Uploads the highlighted entry.
    pub(crate) fn submit_from_popup(&mut self) {
        let Some(path) = self.selected_bundle().map(|m| m.path.clone()) else {
            return;
        };
        self.path_input.clear();
        self.submit_path(&path);
    }
}
