//! Result screen rendering.

use ratatui::{
    Frame,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Paragraph, Wrap},
};

use crate::app::App;
use crate::core::qr_placeholder;

/// Width of the labels in the metadata panel.
const LABEL_WIDTH: usize = 10;

impl App {
    /// Renders the result screen of a settled upload.
    pub(crate) fn render_result(&self, frame: &mut Frame) {
        let layout = self.layout.result;

        self.render_header(frame, layout.header);
        self.render_metadata(frame, layout.metadata);
        self.render_share(frame, layout.share);
        self.render_analysis(frame, layout.analysis);

        let footer = Line::from(vec![
            Span::styled(" [Enter] ", self.theme.highlight_style()),
            Span::styled("Upload another app  ", self.theme.muted_style()),
            Span::styled("[q] ", self.theme.highlight_style()),
            Span::styled("Quit", self.theme.muted_style()),
        ]);
        frame.render_widget(Paragraph::new(footer), layout.footer);
    }

    fn panel(&self, title: &'static str) -> Block<'static> {
        Block::bordered()
            .title(title)
            .title_style(self.theme.header_style())
            .border_style(self.theme.border_style())
    }

    fn render_metadata(&self, frame: &mut Frame, area: Rect) {
        let lines: Vec<Line> = match self.flow.metadata() {
            Some(meta) => [
                ("Name", meta.name.as_str()),
                ("Version", meta.version.as_str()),
                ("Size", meta.size.as_str()),
                ("Type", meta.file_type.as_str()),
                ("Uploaded", meta.upload_date.as_str()),
            ]
            .into_iter()
            .map(|(label, value)| {
                Line::from(vec![
                    Span::styled(
                        format!("{label:<width$}", width = LABEL_WIDTH),
                        self.theme.label_style(),
                    ),
                    Span::styled(value.to_string(), self.theme.normal_style()),
                ])
            })
            .collect(),
            None => vec![Line::styled("No file uploaded", self.theme.muted_style())],
        };

        let paragraph = Paragraph::new(lines).block(self.panel(" Bundle "));
        frame.render_widget(paragraph, area);
    }

    fn render_share(&self, frame: &mut Frame, area: Rect) {
        let Some(link) = self.share_link() else {
            let paragraph = Paragraph::new(Line::styled("No link yet", self.theme.muted_style()))
                .block(self.panel(" Share "));
            frame.render_widget(paragraph, area);
            return;
        };

        let mut lines = vec![
            Line::styled(link.to_string(), self.theme.link_style()),
            Line::default(),
        ];
        lines.extend(
            qr_placeholder(link)
                .into_iter()
                .map(|line| Line::styled(line, self.theme.muted_style())),
        );

        let paragraph = Paragraph::new(lines)
            .block(self.panel(" Share "))
            .wrap(Wrap { trim: false });
        frame.render_widget(paragraph, area);
    }

    fn render_analysis(&self, frame: &mut Frame, area: Rect) {
        let Some(analysis) = self.flow.analysis() else {
            let paragraph = Paragraph::new(Line::styled("No analysis", self.theme.muted_style()))
                .block(self.panel(" Analysis "));
            frame.render_widget(paragraph, area);
            return;
        };

        let mut lines = Vec::new();
        for (heading, body) in [
            ("Release notes", &analysis.release_notes),
            ("Security", &analysis.security_summary),
            ("Marketing", &analysis.marketing_copy),
        ] {
            if !lines.is_empty() {
                lines.push(Line::default());
            }
            lines.push(Line::styled(heading, self.theme.label_style()));
            lines.push(Line::styled(body.clone(), self.theme.normal_style()));
        }

        let paragraph = Paragraph::new(lines)
            .block(self.panel(" Analysis "))
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
    }
}
