//! Bundle picker popup shown under the path input.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Widget},
};

use crate::bundle_search::{BundleMatch, MAX_BUNDLE_MATCHES};
use crate::tui::Theme;

/// Width of the popup in cells.
const POPUP_WIDTH: u16 = 56;

/// What the picker is currently showing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PopupState {
    #[default]
    Hidden,
    /// A search is in flight.
    Loading,
    /// The last search found nothing.
    NoMatches,
    Showing {
        matches: Vec<BundleMatch>,
        /// Index into `matches`.
        selected: usize,
    },
}

impl PopupState {
    #[must_use]
    pub const fn is_visible(&self) -> bool {
        !matches!(self, Self::Hidden)
    }

    /// Returns the highlighted match, if any.
    #[must_use]
    pub fn selected_match(&self) -> Option<&BundleMatch> {
        match self {
            Self::Showing { matches, selected } => matches.get(*selected),
            _ => None,
        }
    }

    /// Moves the highlight up one row, stopping at the top.
    pub fn select_previous(&mut self) {
        if let Self::Showing { selected, .. } = self {
            *selected = selected.saturating_sub(1);
        }
    }

    /// Moves the highlight down one row, stopping at the last match.
    pub fn select_next(&mut self) {
        if let Self::Showing { matches, selected } = self {
            *selected = (*selected + 1).min(matches.len().saturating_sub(1));
        }
    }
}

/// Renders a [`PopupState`].
pub struct BundlePopup<'a> {
    state: &'a PopupState,
    query: &'a str,
    theme: &'a Theme,
}

impl<'a> BundlePopup<'a> {
    #[must_use]
    pub const fn new(state: &'a PopupState, query: &'a str, theme: &'a Theme) -> Self {
        Self {
            state,
            query,
            theme,
        }
    }

    /// Returns (width, height) in cells, borders included.
    #[must_use]
    pub fn preferred_size(&self) -> (u16, u16) {
        let height = match self.state {
            PopupState::Hidden => 0,
            PopupState::Loading | PopupState::NoMatches => 3,
            PopupState::Showing { matches, .. } => {
                // At most MAX_BUNDLE_MATCHES rows, which fits in u16.
                #[allow(clippy::cast_possible_truncation)]
                let rows = matches.len().min(MAX_BUNDLE_MATCHES) as u16;
                rows + 2
            }
        };
        (POPUP_WIDTH, height)
    }
}

impl Widget for BundlePopup<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if !self.state.is_visible() {
            return;
        }
        Clear.render(area, buf);

        let title = if self.query.is_empty() {
            " Bundles ".to_string()
        } else {
            format!(" Matching \"{}\" ", self.query)
        };
        let block = Block::default()
            .title(title)
            .title_style(self.theme.header_style())
            .borders(Borders::ALL)
            .border_style(self.theme.border_style());
        let inner = block.inner(area);
        block.render(area, buf);

        match self.state {
            PopupState::Hidden => {}
            PopupState::Loading => {
                Line::styled("Searching...", self.theme.muted_style()).render(inner, buf);
            }
            PopupState::NoMatches => {
                Line::styled("No matching files", self.theme.muted_style()).render(inner, buf);
            }
            PopupState::Showing { matches, selected } => {
                let items: Vec<ListItem> = matches
                    .iter()
                    .take(MAX_BUNDLE_MATCHES)
                    .enumerate()
                    .map(|(i, candidate)| {
                        let is_selected = i == *selected;
                        let style = if is_selected {
                            self.theme.highlight_style()
                        } else if candidate.is_bundle {
                            self.theme.normal_style()
                        } else {
                            self.theme.muted_style()
                        };
                        let prefix = if is_selected { "> " } else { "  " };
                        ListItem::new(Line::from(vec![
                            Span::styled(prefix, style),
                            Span::styled(candidate.path.display().to_string(), style),
                        ]))
                    })
                    .collect();
                Widget::render(List::new(items), inner, buf);
            }
        }
    }
}
