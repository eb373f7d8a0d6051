//! Event handling logic for the App.

use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::debug;

use super::App;
use crate::app::{AppMode, FlowEvent};
use crate::bundle_search::SearchResult;
use crate::core::{FlowState, UploadStep, share_link};
use crate::tui::widgets::{OutputLine, PopupState, calculate_visual_line_count};

/// Scroll page size for the activity log.
const SCROLL_PAGE_SIZE: usize = 10;

/// Turns pasted text into a path.
///
/// Terminals paste dropped files as a single line that may be quoted, end in
/// a newline, or escape spaces with backslashes. Returns `None` when nothing
/// usable is left.
#[must_use]
pub fn normalize_pasted_path(text: &str) -> Option<String> {
    let line = text.lines().map(str::trim).find(|line| !line.is_empty())?;

    let unquoted = ['"', '\'']
        .iter()
        .find_map(|quote| {
            line.strip_prefix(*quote)
                .and_then(|rest| rest.strip_suffix(*quote))
        })
        .unwrap_or(line);

    let path: String = unquoted
        .replace("\\ ", " ")
        .chars()
        .filter(|c| !c.is_control())
        .collect();

    (!path.is_empty()).then_some(path)
}

impl App {
    /// Handles text from bracketed paste.
    ///
    /// Only the first non-empty line is used, so pasting can never submit.
    pub fn handle_paste(&mut self, text: &str) {
        if self.mode != AppMode::Upload || self.is_running() {
            return;
        }
        let Some(path) = normalize_pasted_path(text) else {
            return;
        };
        self.path_input.textarea.insert_str(&path);
        self.update_bundle_search();
    }

    /// Handles a key press.
    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }

        match self.mode {
            AppMode::Upload => self.handle_upload_key(key),
            AppMode::Result => self.handle_result_key(key),
        }
    }

    /// Key handling on the upload screen, in priority order:
    /// 1. Picker navigation (when the picker is visible)
    /// 2. Activity log scrolling
    /// 3. Path editing and submission (ignored while uploading)
    fn handle_upload_key(&mut self, key: KeyEvent) {
        if !self.is_running() && self.bundle_popup_visible() {
            match key.code {
                KeyCode::Up => {
                    self.path_input.popup_state.select_previous();
                    return;
                }
                KeyCode::Down => {
                    self.path_input.popup_state.select_next();
                    return;
                }
                KeyCode::Tab => {
                    self.fill_from_popup();
                    return;
                }
                KeyCode::Enter if self.selected_bundle().is_some() => {
                    self.submit_from_popup();
                    return;
                }
                KeyCode::Esc => {
                    self.path_input.dismiss_popup();
                    return;
                }
                _ => {}
            }
        }

        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Up => return self.scroll_output_up(),
                KeyCode::Down => return self.scroll_output_down(),
                KeyCode::Home => return self.flow_ui.output_scroll.scroll_to_top(),
                KeyCode::End => return self.scroll_output_to_bottom(),
                _ => {}
            }
        }
        match key.code {
            KeyCode::PageUp => return self.flow_ui.output_scroll.page_up(SCROLL_PAGE_SIZE),
            KeyCode::PageDown => return self.page_down_output(),
            _ => {}
        }

        if self.is_running() {
            return;
        }

        match key.code {
            KeyCode::Enter => self.submit_path_input(),
            KeyCode::Tab => self.open_bundle_picker(),
            KeyCode::Esc => {}
            _ => {
                let before = self.path_input.text();
                self.path_input.textarea.input(key);
                if self.path_input.text() != before {
                    self.update_bundle_search();
                }
            }
        }
    }

    /// Key handling on the result screen.
    fn handle_result_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter => self.reset_to_upload(),
            KeyCode::Char('q') => self.should_quit = true,
            _ => {}
        }
    }

    fn scroll_output_up(&mut self) {
        self.flow_ui.output_scroll.scroll_up();
    }

    fn scroll_output_down(&mut self) {
        let content_len = self.output_visual_line_count();
        self.flow_ui
            .output_scroll
            .scroll_down(content_len, self.layout.output_visible_height());
    }

    fn scroll_output_to_bottom(&mut self) {
        let content_len = self.output_visual_line_count();
        self.flow_ui
            .output_scroll
            .scroll_to_bottom(content_len, self.layout.output_visible_height());
    }

    fn page_down_output(&mut self) {
        let content_len = self.output_visual_line_count();
        self.flow_ui.output_scroll.page_down(
            content_len,
            self.layout.output_visible_height(),
            SCROLL_PAGE_SIZE,
        );
    }

    /// Drains pending events from the upload and search tasks.
    pub fn process_events(&mut self) {
        while let Ok(event) = self.event_rx.try_recv() {
            match event {
                FlowEvent::StateChanged(state) => self.apply_flow_state(state),
                FlowEvent::Output(line) => self.push_output(line),
                FlowEvent::Done => {
                    self.is_running = false;
                }
                FlowEvent::SearchResult { generation, result } => {
                    self.handle_search_result(generation, result);
                }
            }
        }
    }

    /// Adopts a new flow snapshot. Settling generates the share link and
    /// switches to the result screen.
    fn apply_flow_state(&mut self, state: FlowState) {
        let settled = state.step() == UploadStep::Success;
        self.flow = state;
        if settled {
            let link = share_link(self.settings.share_host(), &mut rand::thread_rng());
            debug!(%link, "share link generated");
            self.push_output(OutputLine::success(format!("Share link: {link}")));
            self.share_link = Some(link);
            self.path_input.dismiss_popup();
            self.mode = AppMode::Result;
        }
    }

    /// Appends to the activity log, following the bottom if auto-scroll is on.
    pub(crate) fn push_output(&mut self, line: OutputLine) {
        self.flow_ui.push(line);
        let content_len = self.output_visual_line_count();
        self.flow_ui
            .output_scroll
            .auto_scroll_if_enabled(content_len, self.layout.output_visible_height());
    }

    /// Applies a picker result unless a newer query has been sent since.
    fn handle_search_result(&mut self, generation: u64, result: SearchResult) {
        if generation != self.path_input.search_generation
            || self.path_input.last_search_query.is_none()
        {
            return;
        }

        let matches = result.matches;
        self.path_input.popup_state = if matches.is_empty() {
            PopupState::NoMatches
        } else {
            let selected = match &self.path_input.popup_state {
                PopupState::Showing { selected, .. } => {
                    (*selected).min(matches.len().saturating_sub(1))
                }
                _ => 0,
            };
            PopupState::Showing { matches, selected }
        };
    }

    fn output_visual_line_count(&self) -> usize {
        calculate_visual_line_count(&self.flow_ui.output, self.layout.output_content_width())
    }
}
