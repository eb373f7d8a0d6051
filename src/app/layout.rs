//! Layout calculation for both screens.
//!
//! Layouts are computed once per frame in `App::update_layout` and shared by
//! rendering and scroll handling, so both always agree on panel sizes.

use ratatui::layout::{Constraint, Layout, Rect};

/// Areas of the upload screen.
#[derive(Debug, Clone, Copy, Default)]
pub struct UploadLayout {
    /// Title bar (1 line).
    pub header: Rect,
    /// Tagline and accepted-format hint (2 lines).
    pub hero: Rect,
    /// Bordered path input (3 lines).
    pub input: Rect,
    /// Step icon, description and hint (2 lines).
    pub status: Rect,
    /// Step progress gauge (1 line).
    pub progress: Rect,
    /// Activity log, takes the remaining space.
    pub activity: Rect,
    /// Key hints (1 line).
    pub footer: Rect,
    /// Rows inside the activity log borders.
    pub activity_visible_height: usize,
    /// Columns inside the activity log borders minus the scrollbar.
    pub activity_content_width: usize,
}

const UPLOAD_CONSTRAINTS: [Constraint; 7] = [
    Constraint::Length(1),
    Constraint::Length(2),
    Constraint::Length(3),
    Constraint::Length(2),
    Constraint::Length(1),
    Constraint::Min(3),
    Constraint::Length(1),
];

/// Calculates the upload screen layout.
#[must_use]
pub fn calculate_upload_layout(area: Rect) -> UploadLayout {
    let [header, hero, input, status, progress, activity, footer] =
        Layout::vertical(UPLOAD_CONSTRAINTS).areas(area);

    UploadLayout {
        header,
        hero,
        input,
        status,
        progress,
        activity,
        footer,
        activity_visible_height: activity.height.saturating_sub(2) as usize,
        activity_content_width: activity.width.saturating_sub(3) as usize,
    }
}

/// Areas of the result screen.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResultLayout {
    /// Title bar (1 line).
    pub header: Rect,
    /// File metadata panel, top left.
    pub metadata: Rect,
    /// Share link and QR placeholder, top right.
    pub share: Rect,
    /// Release notes, security summary and marketing copy.
    pub analysis: Rect,
    /// Key hints (1 line).
    pub footer: Rect,
}

/// Height of the metadata and share row: five fields or the QR block plus borders.
const RESULT_TOP_ROW_HEIGHT: u16 = 11;

/// Calculates the result screen layout.
#[must_use]
pub fn calculate_result_layout(area: Rect) -> ResultLayout {
    let [header, top, analysis, footer] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(RESULT_TOP_ROW_HEIGHT),
        Constraint::Min(5),
        Constraint::Length(1),
    ])
    .areas(area);
    let [metadata, share] =
        Layout::horizontal([Constraint::Percentage(45), Constraint::Percentage(55)]).areas(top);

    ResultLayout {
        header,
        metadata,
        share,
        analysis,
        footer,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upload_layout_fixed_rows() {
        let layout = calculate_upload_layout(Rect::new(0, 0, 80, 24));

        assert_eq!(layout.header.height, 1);
        assert_eq!(layout.hero.height, 2);
        assert_eq!(layout.input.height, 3);
        assert_eq!(layout.status.height, 2);
        assert_eq!(layout.progress.height, 1);
        assert_eq!(layout.footer.height, 1);
        // 24 - (1 + 2 + 3 + 2 + 1 + 1)
        assert_eq!(layout.activity.height, 14);
        assert_eq!(layout.activity_visible_height, 12);
        assert_eq!(layout.activity_content_width, 77);
    }

    #[test]
    fn upload_layout_stacks_top_to_bottom() {
        let layout = calculate_upload_layout(Rect::new(0, 0, 100, 30));

        let order = [
            layout.header,
            layout.hero,
            layout.input,
            layout.status,
            layout.progress,
            layout.activity,
            layout.footer,
        ];
        for pair in order.windows(2) {
            assert_eq!(pair[1].y, pair[0].y + pair[0].height);
        }
        assert!(order.iter().all(|area| area.width == 100));
        assert_eq!(layout.footer.y, 29);
    }

    #[test]
    fn upload_layout_tiny_terminal_does_not_panic() {
        let layout = calculate_upload_layout(Rect::new(0, 0, 20, 8));
        assert!(layout.activity_visible_height <= 1);
    }

    #[test]
    fn result_layout_splits_top_row() {
        let layout = calculate_result_layout(Rect::new(0, 0, 100, 30));

        assert_eq!(layout.header.height, 1);
        assert_eq!(layout.metadata.height, RESULT_TOP_ROW_HEIGHT);
        assert_eq!(layout.metadata.y, layout.share.y);
        assert_eq!(layout.metadata.width + layout.share.width, 100);
        assert_eq!(layout.analysis.y, 1 + RESULT_TOP_ROW_HEIGHT);
        // 30 - (1 + 11 + 1)
        assert_eq!(layout.analysis.height, 17);
        assert_eq!(layout.footer.y, 29);
    }
}
