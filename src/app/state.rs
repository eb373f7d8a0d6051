//! Application state structures.
//!
//! - **`PathInputState`**: the single-line path input and the bundle picker
//! - **`FlowUiState`**: activity log and its scroll position
//! - **`LayoutState`**: layouts computed once per frame

use std::path::PathBuf;
use std::time::Instant;

use tokio::sync::mpsc;
use tui_textarea::{CursorMove, TextArea};

use crate::app::layout::{ResultLayout, UploadLayout};
use crate::bundle_search::SearchResult;
use crate::core::FlowState;
use crate::tui::widgets::{MAX_OUTPUT_LINES, OutputLine, PopupState};

/// Placeholder shown in the empty path input.
pub const PATH_PLACEHOLDER: &str = "Path to an .apk, .ipa or .zip (Tab to browse)";

/// Events delivered to the UI thread.
#[derive(Debug, Clone)]
pub enum FlowEvent {
    /// The upload flow moved to a new state.
    StateChanged(FlowState),
    /// A line for the activity log.
    Output(OutputLine),
    /// The upload task finished.
    Done,
    /// Bundle picker results from the background search task.
    SearchResult {
        /// Generation of the query that produced this result.
        generation: u64,
        result: SearchResult,
    },
}

/// Query sent to the background bundle search task.
#[derive(Debug, Clone)]
pub struct SearchQuery {
    pub query: String,
    /// Directory to search.
    pub root: PathBuf,
    /// Results for older generations are dropped.
    pub generation: u64,
}

/// Which screen is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AppMode {
    /// Path input, progress and activity log.
    #[default]
    Upload,
    /// Metadata, generated copy and share link of a settled upload.
    Result,
}

/// Path input and bundle picker.
pub struct PathInputState {
    pub textarea: TextArea<'static>,
    pub popup_state: PopupState,
    /// Last query sent to the search task (for debouncing).
    pub(crate) last_search_query: Option<String>,
    pub(crate) last_search_time: Option<Instant>,
    pub(crate) search_tx: mpsc::Sender<SearchQuery>,
    pub(crate) search_generation: u64,
}

fn empty_textarea() -> TextArea<'static> {
    let mut textarea = TextArea::default();
    textarea.set_placeholder_text(PATH_PLACEHOLDER);
    textarea
}

impl PathInputState {
    #[must_use]
    pub fn new(search_tx: mpsc::Sender<SearchQuery>) -> Self {
        Self {
            textarea: empty_textarea(),
            popup_state: PopupState::default(),
            last_search_query: None,
            last_search_time: None,
            search_tx,
            search_generation: 0,
        }
    }

    /// The typed path, trimmed.
    #[must_use]
    pub fn text(&self) -> String {
        self.textarea
            .lines()
            .first()
            .map(|line| line.trim().to_string())
            .unwrap_or_default()
    }

    /// Replaces the input with `text` and moves the cursor to the end.
    pub fn set_text(&mut self, text: &str) {
        let mut textarea = TextArea::new(vec![text.to_string()]);
        textarea.set_placeholder_text(PATH_PLACEHOLDER);
        textarea.move_cursor(CursorMove::End);
        self.textarea = textarea;
    }

    /// Empties the input and hides the picker. The search channel is kept.
    pub fn clear(&mut self) {
        self.textarea = empty_textarea();
        self.dismiss_popup();
    }

    /// Hides the picker and forgets the last query.
    pub fn dismiss_popup(&mut self) {
        self.popup_state = PopupState::Hidden;
        self.last_search_query = None;
        self.last_search_time = None;
    }
}

/// Activity log state.
#[derive(Debug)]
pub struct FlowUiState {
    pub output: Vec<OutputLine>,
    pub(crate) output_scroll: ScrollState,
    /// True once lines have been dropped to stay under [`MAX_OUTPUT_LINES`].
    pub output_truncated: bool,
}

impl Default for FlowUiState {
    fn default() -> Self {
        Self {
            output: Vec::new(),
            output_scroll: ScrollState::new(),
            output_truncated: false,
        }
    }
}

impl FlowUiState {
    /// Appends a line, dropping the oldest lines past [`MAX_OUTPUT_LINES`].
    pub fn push(&mut self, line: OutputLine) {
        self.output.push(line);
        if self.output.len() > MAX_OUTPUT_LINES {
            let drain_count = self.output.len() - MAX_OUTPUT_LINES;
            self.output.drain(0..drain_count);
            self.output_scroll.offset = self.output_scroll.offset.saturating_sub(drain_count);
            self.output_truncated = true;
        }
    }
}

/// Layouts cached by `App::update_layout`, read by rendering and scrolling.
#[derive(Debug, Clone, Copy, Default)]
pub struct LayoutState {
    pub upload: UploadLayout,
    pub result: ResultLayout,
}

impl LayoutState {
    /// Rows available inside the activity log.
    #[must_use]
    pub const fn output_visible_height(&self) -> usize {
        self.upload.activity_visible_height
    }

    /// Columns available for activity text (borders and scrollbar excluded).
    #[must_use]
    pub const fn output_content_width(&self) -> usize {
        self.upload.activity_content_width
    }
}

/// Scroll position of a panel plus whether it follows new content.
#[derive(Debug, Clone, Default)]
pub struct ScrollState {
    pub offset: usize,
    /// Cleared when the user scrolls up, set again at the bottom.
    pub auto_scroll: bool,
}

impl ScrollState {
    #[must_use]
    pub fn new() -> Self {
        Self {
            offset: 0,
            auto_scroll: true,
        }
    }

    pub fn scroll_up(&mut self) {
        self.offset = self.offset.saturating_sub(1);
        self.auto_scroll = false;
    }

    pub fn scroll_down(&mut self, content_len: usize, visible_height: usize) {
        self.page_down(content_len, visible_height, 1);
    }

    pub fn page_up(&mut self, page_size: usize) {
        self.offset = self.offset.saturating_sub(page_size);
        self.auto_scroll = false;
    }

    pub fn page_down(&mut self, content_len: usize, visible_height: usize, page_size: usize) {
        let max_scroll = content_len.saturating_sub(visible_height);
        self.offset = (self.offset + page_size).min(max_scroll);
        self.auto_scroll = self.offset >= max_scroll;
    }

    pub fn scroll_to_top(&mut self) {
        self.offset = 0;
        self.auto_scroll = false;
    }

    pub fn scroll_to_bottom(&mut self, content_len: usize, visible_height: usize) {
        self.offset = content_len.saturating_sub(visible_height);
        self.auto_scroll = true;
    }

    /// Follows new content if auto-scroll is on.
    pub fn auto_scroll_if_enabled(&mut self, content_len: usize, visible_height: usize) {
        if self.auto_scroll {
            self.offset = content_len.saturating_sub(visible_height);
        }
    }
}

#[cfg(test)]
mod path_input_tests {
    use super::*;

    fn input() -> PathInputState {
        PathInputState::new(mpsc::channel(1).0)
    }

    #[test]
    fn text_is_trimmed_first_line() {
        let mut state = input();
        state.set_text("  build/app.apk  ");
        assert_eq!(state.text(), "build/app.apk");
    }

    #[test]
    fn set_text_puts_cursor_at_end() {
        let mut state = input();
        state.set_text("game.ipa");
        assert_eq!(state.textarea.cursor(), (0, 8));
    }

    #[test]
    fn clear_hides_popup_and_empties_input() {
        let mut state = input();
        state.set_text("x");
        state.popup_state = PopupState::Loading;
        state.last_search_query = Some("x".to_string());

        state.clear();

        assert_eq!(state.text(), "");
        assert!(!state.popup_state.is_visible());
        assert!(state.last_search_query.is_none());
    }
}
