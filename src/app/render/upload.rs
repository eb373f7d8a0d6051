//! Upload screen rendering.

use std::path::Path;

use ratatui::{
    Frame,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, LineGauge, Paragraph},
};
use tui_textarea::TextArea;

use crate::app::App;
use crate::core::{ACCEPTED_EXTENSIONS, is_accepted_bundle};
use crate::tui::widgets::{ActivityLogWidget, BundlePopup, StatusIndicatorWidget, step_progress};

impl App {
    /// Renders the upload screen.
    ///
    /// Top to bottom: header, hero, path input, status, progress gauge,
    /// activity log and footer. The bundle picker is drawn last, below the
    /// input.
    pub(crate) fn render_upload(&self, frame: &mut Frame) {
        let layout = self.layout.upload;

        self.render_header(frame, layout.header);
        self.render_hero(frame, layout.hero);
        self.render_path_input(frame, layout.input);

        let status = StatusIndicatorWidget::new(&self.flow, self.settings.model(), &self.theme);
        frame.render_widget(status, layout.status);

        self.render_progress(frame, layout.progress);

        let activity = ActivityLogWidget::new(
            &self.flow_ui.output,
            self.flow_ui.output_scroll.offset,
            "Activity",
            &self.theme,
        )
        .truncated(self.flow_ui.output_truncated);
        frame.render_widget(activity, layout.activity);

        self.render_upload_footer(frame, layout.footer);
        self.render_bundle_popup(frame, layout.input);
    }

    /// Single-line title bar, shared by both screens.
    pub(crate) fn render_header(&self, frame: &mut Frame, area: Rect) {
        let header = Line::from(vec![
            Span::styled(" App On The Go ", self.theme.header_style()),
            Span::styled("[", self.theme.muted_style()),
            Span::styled(self.settings.model(), self.theme.normal_style()),
            Span::styled("]", self.theme.muted_style()),
        ]);
        frame.render_widget(Paragraph::new(header), area);
    }

    fn render_hero(&self, frame: &mut Frame, area: Rect) {
        let formats = ACCEPTED_EXTENSIONS
            .iter()
            .map(|ext| format!(".{ext}"))
            .collect::<Vec<_>>()
            .join(" ");

        let typed = self.path_input.text();
        let hint = if !typed.is_empty()
            && Path::new(&typed).extension().is_some()
            && !is_accepted_bundle(&typed)
        {
            Line::from(vec![
                Span::styled(" ! ", self.theme.warning_style()),
                Span::styled(
                    format!("Not one of {formats}; it will be uploaded anyway"),
                    self.theme.warning_style(),
                ),
            ])
        } else {
            Line::from(vec![
                Span::styled(" Accepted: ", self.theme.muted_style()),
                Span::styled(formats, self.theme.label_style()),
            ])
        };

        let hero = vec![
            Line::styled(
                " Drop a build, get a share link and release notes.",
                self.theme.normal_style(),
            ),
            hint,
        ];
        frame.render_widget(Paragraph::new(hero), area);
    }

    /// While an upload runs the input shows the selected file read-only.
    fn render_path_input(&self, frame: &mut Frame, area: Rect) {
        let title = if self.is_running() {
            " Bundle (uploading) "
        } else {
            " Bundle Path "
        };
        let block = Block::bordered()
            .title(title)
            .title_style(self.theme.header_style())
            .border_style(self.theme.border_style());

        let mut textarea = if self.is_running() {
            TextArea::new(vec![self.flow.file_name().unwrap_or_default().to_string()])
        } else {
            self.path_input.textarea.clone()
        };
        textarea.set_block(block);
        textarea.set_style(self.theme.normal_style());
        textarea.set_cursor_line_style(Style::default());
        textarea.set_placeholder_style(self.theme.placeholder_style());
        if self.is_running() {
            textarea.set_cursor_style(Style::default());
        }

        frame.render_widget(&textarea, area);
    }

    fn render_progress(&self, frame: &mut Frame, area: Rect) {
        let (current, total) = step_progress(self.flow.step());
        let ratio = f64::from(current) / f64::from(total);

        let gauge = LineGauge::default()
            .ratio(ratio)
            .label(format!(" {current}/{total} "))
            .filled_style(self.theme.success_style())
            .unfilled_style(self.theme.muted_style());
        frame.render_widget(gauge, area);
    }

    fn render_upload_footer(&self, frame: &mut Frame, area: Rect) {
        let key = |text: &'static str| Span::styled(text, self.theme.highlight_style());
        let label = |text: &'static str| Span::styled(text, self.theme.muted_style());

        let content = if self.is_running() {
            vec![
                key(" [PgUp/PgDn] "),
                label("Scroll  "),
                key("[Ctrl+C] "),
                label("Quit"),
            ]
        } else if self.bundle_popup_visible() {
            vec![
                key(" [↑/↓] "),
                label("Navigate  "),
                key("[Tab] "),
                label("Fill  "),
                key("[Enter] "),
                label("Upload  "),
                key("[Esc] "),
                label("Dismiss"),
            ]
        } else {
            vec![
                key(" [Enter] "),
                label("Upload  "),
                key("[Tab] "),
                label("Browse  "),
                key("[PgUp/PgDn] "),
                label("Scroll  "),
                key("[Ctrl+C] "),
                label("Quit"),
            ]
        };
        frame.render_widget(Paragraph::new(Line::from(content)), area);
    }

    fn render_bundle_popup(&self, frame: &mut Frame, input_area: Rect) {
        if self.is_running() || !self.bundle_popup_visible() {
            return;
        }

        let query = self.path_input.text();
        let popup = BundlePopup::new(&self.path_input.popup_state, &query, &self.theme);
        let (width, height) = popup.preferred_size();
        if height == 0 {
            return;
        }

        let anchor = (input_area.x + 1, input_area.y + input_area.height);
        let area = popup_area(anchor, (width, height), frame.area());
        frame.render_widget(popup, area);
    }
}

/// Places a popup of `size` with its top-left corner at `anchor`.
///
/// The popup is shifted left to stay on screen; if there is not enough room
/// below the anchor it is drawn above it instead, and it is clipped to the
/// screen as a last resort.
pub(crate) fn popup_area(anchor: (u16, u16), size: (u16, u16), screen: Rect) -> Rect {
    let (anchor_x, anchor_y) = anchor;
    let width = size.0.min(screen.width);
    let height = size.1.min(screen.height);

    let x = anchor_x.min(screen.right().saturating_sub(width));
    let y = if anchor_y + height <= screen.bottom() {
        anchor_y
    } else {
        anchor_y
            .saturating_sub(height)
            .max(screen.y)
            .min(screen.bottom().saturating_sub(height))
    };

    Rect::new(x, y, width, height)
}
