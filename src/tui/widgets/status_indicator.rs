//! Compact status indicator for the upload screen.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

use crate::core::{FlowState, UploadStep};
use crate::tui::Theme;

/// A two-line status: step icon with description, then a hint.
pub struct StatusIndicatorWidget<'a> {
    state: &'a FlowState,
    /// Model name shown while analyzing.
    model: &'a str,
    theme: &'a Theme,
}

impl<'a> StatusIndicatorWidget<'a> {
    #[must_use]
    pub const fn new(state: &'a FlowState, model: &'a str, theme: &'a Theme) -> Self {
        Self {
            state,
            model,
            theme,
        }
    }

    fn icon(&self) -> &'static str {
        match self.state.step() {
            UploadStep::Idle if self.state.error().is_some() => "✗",
            UploadStep::Idle => "·",
            UploadStep::Uploading | UploadStep::Analyzing => "▶",
            UploadStep::Success => "✓",
        }
    }

    fn icon_style(&self) -> Style {
        match self.state.step() {
            UploadStep::Idle if self.state.error().is_some() => self.theme.error_style(),
            UploadStep::Idle => self.theme.muted_style(),
            UploadStep::Uploading | UploadStep::Analyzing => self.theme.highlight_style(),
            UploadStep::Success => self.theme.success_style(),
        }
    }

    fn secondary_status(&self) -> String {
        match self.state.step() {
            UploadStep::Idle => match self.state.error() {
                Some(error) => error.to_string(),
                None => "Type a path or pick a bundle below".to_string(),
            },
            UploadStep::Uploading => "Transferring bundle...".to_string(),
            UploadStep::Analyzing => format!("Asking {} for release notes...", self.model),
            UploadStep::Success => "Share link ready".to_string(),
        }
    }
}

/// Fraction of the flow completed at `step`, for the progress gauge.
#[must_use]
pub const fn step_progress(step: UploadStep) -> (u8, u8) {
    match step {
        UploadStep::Idle => (0, 3),
        UploadStep::Uploading => (1, 3),
        UploadStep::Analyzing => (2, 3),
        UploadStep::Success => (3, 3),
    }
}

impl Widget for StatusIndicatorWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let primary = Line::from(vec![
            Span::styled(format!(" {} ", self.icon()), self.icon_style()),
            Span::styled(self.state.status_line().into_owned(), self.theme.normal_style()),
        ]);

        if area.height < 2 {
            Paragraph::new(primary).render(area, buf);
            return;
        }

        let secondary_style = if self.state.error().is_some() {
            self.theme.error_style()
        } else {
            self.theme.muted_style()
        };
        let secondary = Line::from(vec![
            Span::raw("   "),
            Span::styled(self.secondary_status(), secondary_style),
        ]);

        Paragraph::new(vec![primary, secondary]).render(area, buf);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::core::{BundleFile, FileMetadata};
    use chrono::NaiveDate;

    fn analyzing() -> FlowState {
        let metadata = FileMetadata::derive(
            &BundleFile::new("Game.ipa", 2048),
            NaiveDate::from_ymd_opt(2026, 3, 9).unwrap(),
        );
        FlowState::new()
            .select_file("Game.ipa")
            .finish_upload(metadata)
            .unwrap()
    }

    #[test]
    fn idle_invites_a_selection() {
        let theme = Theme::default();
        let state = FlowState::new();
        let widget = StatusIndicatorWidget::new(&state, "gemini-test", &theme);

        assert_eq!(widget.icon(), "·");
        assert_eq!(widget.secondary_status(), "Type a path or pick a bundle below");
    }

    #[test]
    fn rejected_selection_shows_the_error() {
        let theme = Theme::default();
        let state = FlowState::new().reject_selection("Cannot read missing.apk");
        let widget = StatusIndicatorWidget::new(&state, "gemini-test", &theme);

        assert_eq!(widget.icon(), "✗");
        assert_eq!(widget.secondary_status(), "Cannot read missing.apk");
    }

    #[test]
    fn analyzing_names_the_model() {
        let theme = Theme::default();
        let state = analyzing();
        let widget = StatusIndicatorWidget::new(&state, "gemini-test", &theme);

        assert_eq!(widget.icon(), "▶");
        assert_eq!(
            widget.secondary_status(),
            "Asking gemini-test for release notes..."
        );
    }

    #[test]
    fn progress_advances_with_each_step() {
        assert_eq!(step_progress(UploadStep::Idle), (0, 3));
        assert_eq!(step_progress(UploadStep::Uploading), (1, 3));
        assert_eq!(step_progress(UploadStep::Analyzing), (2, 3));
        assert_eq!(step_progress(UploadStep::Success), (3, 3));
    }

    #[test]
    fn renders_status_line_and_hint() -> anyhow::Result<()> {
        use ratatui::{Terminal, backend::TestBackend};

        let theme = Theme::default();
        let state = analyzing();
        let mut terminal = Terminal::new(TestBackend::new(50, 2))?;

        terminal.draw(|frame| {
            frame.render_widget(
                StatusIndicatorWidget::new(&state, "gemini-test", &theme),
                frame.area(),
            );
        })?;

        let buffer = terminal.backend().buffer();
        let first: String = (0..50).map(|x| buffer[(x, 0)].symbol()).collect();
        let second: String = (0..50).map(|x| buffer[(x, 1)].symbol()).collect();
        assert!(first.contains("Analyzing with AI Game.ipa"));
        assert!(second.contains("Asking gemini-test"));
        Ok(())
    }
}
