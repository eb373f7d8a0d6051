//! Activity log widget.
//!
//! The upload screen keeps a running log of what the flow did: the transfer,
//! the derived metadata, which copy was used, and any rejected selections.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{
        Block, Borders, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState, StatefulWidget,
        Widget,
    },
};
use unicode_width::UnicodeWidthChar;

use crate::tui::Theme;

/// Maximum number of lines kept in the log. Older lines are dropped first.
pub const MAX_OUTPUT_LINES: usize = 500;

/// Kind of activity line, used for the prefix and colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputLineType {
    #[default]
    Info,
    Success,
    Warning,
    Error,
    Running,
}

impl OutputLineType {
    /// Marker printed before the text.
    #[must_use]
    pub const fn marker(self) -> &'static str {
        match self {
            Self::Info => " ",
            Self::Success => "✓",
            Self::Warning => "!",
            Self::Error => "✗",
            Self::Running => "›",
        }
    }

    fn style(self, theme: &Theme) -> Style {
        match self {
            Self::Info => theme.muted_style(),
            Self::Success => theme.success_style(),
            Self::Warning => theme.warning_style(),
            Self::Error => theme.error_style(),
            Self::Running => theme.highlight_style(),
        }
    }
}

/// One line of the activity log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLine {
    /// Message text, without the marker.
    pub text: String,
    /// Kind of line.
    pub line_type: OutputLineType,
}

impl OutputLine {
    fn with_type(text: impl Into<String>, line_type: OutputLineType) -> Self {
        Self {
            text: text.into(),
            line_type,
        }
    }

    #[must_use]
    pub fn info(text: impl Into<String>) -> Self {
        Self::with_type(text, OutputLineType::Info)
    }

    #[must_use]
    pub fn success(text: impl Into<String>) -> Self {
        Self::with_type(text, OutputLineType::Success)
    }

    #[must_use]
    pub fn warning(text: impl Into<String>) -> Self {
        Self::with_type(text, OutputLineType::Warning)
    }

    #[must_use]
    pub fn error(text: impl Into<String>) -> Self {
        Self::with_type(text, OutputLineType::Error)
    }

    #[must_use]
    pub fn running(text: impl Into<String>) -> Self {
        Self::with_type(text, OutputLineType::Running)
    }

    /// Text as displayed, marker included.
    #[must_use]
    pub fn display_text(&self) -> String {
        format!("{} {}", self.line_type.marker(), self.text)
    }
}

/// Counts the rows `lines` occupy once wrapped to `content_width` columns.
#[must_use]
pub fn calculate_visual_line_count(lines: &[OutputLine], content_width: usize) -> usize {
    if content_width == 0 {
        return lines.len();
    }
    lines
        .iter()
        .map(|line| wrap_to_width(&line.display_text(), content_width).len())
        .sum()
}

/// Splits `text` into rows no wider than `width` display columns.
fn wrap_to_width(text: &str, width: usize) -> Vec<String> {
    if width == 0 || text.is_empty() {
        return vec![String::new()];
    }

    let mut rows = Vec::new();
    let mut row = String::new();
    let mut row_width = 0;
    for ch in text.chars() {
        let ch_width = ch.width().unwrap_or(0);
        if row_width + ch_width > width {
            rows.push(std::mem::take(&mut row));
            row_width = 0;
        }
        row.push(ch);
        row_width += ch_width;
    }
    rows.push(row);
    rows
}

/// Scrollable, bordered activity log.
pub struct ActivityLogWidget<'a> {
    lines: &'a [OutputLine],
    scroll_offset: usize,
    title: &'a str,
    theme: &'a Theme,
    is_truncated: bool,
}

impl<'a> ActivityLogWidget<'a> {
    #[must_use]
    pub const fn new(
        lines: &'a [OutputLine],
        scroll_offset: usize,
        title: &'a str,
        theme: &'a Theme,
    ) -> Self {
        Self {
            lines,
            scroll_offset,
            title,
            theme,
            is_truncated: false,
        }
    }

    /// Marks the log as having dropped its oldest lines.
    #[must_use]
    pub const fn truncated(mut self, is_truncated: bool) -> Self {
        self.is_truncated = is_truncated;
        self
    }
}

impl Widget for ActivityLogWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let inner = Block::default().borders(Borders::ALL).inner(area);
        let visible_height = inner.height as usize;
        // One column is reserved for the scrollbar.
        let content_width = inner.width.saturating_sub(1) as usize;

        let rows: Vec<(String, OutputLineType)> = self
            .lines
            .iter()
            .flat_map(|line| {
                wrap_to_width(&line.display_text(), content_width)
                    .into_iter()
                    .map(move |row| (row, line.line_type))
            })
            .collect();
        let total_rows = rows.len();

        let mut title = self.title.to_string();
        if self.is_truncated {
            title.push_str(" [older lines dropped]");
        }
        if total_rows > visible_height {
            title.push_str(&format!(
                " ({}-{}/{})",
                self.scroll_offset + 1,
                (self.scroll_offset + visible_height).min(total_rows),
                total_rows
            ));
        }

        Block::default()
            .title(Span::styled(format!(" {title} "), self.theme.header_style()))
            .borders(Borders::ALL)
            .border_style(self.theme.border_style())
            .render(area, buf);

        if rows.is_empty() {
            Paragraph::new(Line::from(Span::styled(
                "No activity yet",
                self.theme.placeholder_style(),
            )))
            .render(inner, buf);
            return;
        }

        let visible: Vec<Line> = rows
            .into_iter()
            .skip(self.scroll_offset)
            .take(visible_height)
            .map(|(row, line_type)| Line::from(Span::styled(row, line_type.style(self.theme))))
            .collect();
        Paragraph::new(visible).render(inner, buf);

        if total_rows > visible_height {
            let mut scrollbar_state = ScrollbarState::new(total_rows)
                .position(self.scroll_offset)
                .viewport_content_length(visible_height);
            Scrollbar::new(ScrollbarOrientation::VerticalRight)
                .begin_symbol(None)
                .end_symbol(None)
                .track_style(self.theme.scrollbar_track_style())
                .thumb_style(self.theme.scrollbar_thumb_style())
                .render(inner, buf, &mut scrollbar_state);
        }
    }
}
