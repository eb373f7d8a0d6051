//! Terminal presentation: palette, widgets and terminal mode setup.

pub mod setup;
pub mod theme;
pub mod widgets;

pub use setup::TerminalEventGuard;
pub use theme::Theme;
