//! Terminal mode setup.

use std::io::stdout;

use ratatui::crossterm::event::{DisableBracketedPaste, EnableBracketedPaste};
use ratatui::crossterm::execute;
use tracing::{debug, warn};

/// Enables bracketed paste for the lifetime of the guard.
///
/// With bracketed paste a pasted path arrives as one `Event::Paste` instead of
/// a burst of key presses, so a trailing newline cannot submit it early.
/// The mode is switched off again on drop, including during unwinding.
pub struct TerminalEventGuard {
    bracketed_paste_enabled: bool,
}

impl TerminalEventGuard {
    #[must_use]
    pub fn new() -> Self {
        let bracketed_paste_enabled = match execute!(stdout(), EnableBracketedPaste) {
            Ok(()) => {
                debug!("bracketed paste enabled");
                true
            }
            Err(e) => {
                warn!(error = %e, "could not enable bracketed paste; pasted paths arrive as keys");
                false
            }
        };
        Self {
            bracketed_paste_enabled,
        }
    }
}

impl Default for TerminalEventGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for TerminalEventGuard {
    fn drop(&mut self) {
        if self.bracketed_paste_enabled {
            let _ = execute!(stdout(), DisableBracketedPaste);
        }
    }
}
