//! Rendering methods for the App.
//!
//! - **Upload screen**: header, hero, path input, status, progress, activity log, footer
//! - **Result screen**: metadata, share link and generated copy of a settled upload

mod result;
mod upload;

use ratatui::Frame;

use super::{App, AppMode};

impl App {
    /// Renders the screen for the current mode.
    ///
    /// Uses the layouts cached by [`App::update_layout`].
    pub fn render(&self, frame: &mut Frame) {
        match self.mode {
            AppMode::Upload => self.render_upload(frame),
            AppMode::Result => self.render_result(frame),
        }
    }
}
