//! Shared test utilities for the app module.
//!
//! - `TestApp` - an `App` rooted in a temporary directory with a scripted generator
//! - `create_test_files` - creates bundle files with a given size
//! - `render_app_to_terminal` / `screen_text` - render to a `TestBackend` and read it back
//! - `settle` / `wait_for_picker` - drive background tasks to completion
//! - Key event helpers (`key`, `char_key`, `ctrl_key`, `type_text`)

use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use chrono::NaiveDate;
use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyEventState, KeyModifiers};
use ratatui::{Terminal, backend::TestBackend, layout::Rect};
use tempfile::TempDir;

use crate::app::App;
use crate::core::generator::ScriptedGenerator;
use crate::fs::{AppPaths, PersistedSettings};
use crate::tui::widgets::PopupState;

/// A well-formed analysis body.
pub const GOOD_REPLY: &str = r#"{"releaseNotes":"Adds offline mode.","securitySummary":"No risky permissions.","marketingCopy":"Play anywhere."}"#;

/// Fixed clock so metadata dates are predictable.
pub fn fixed_today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 9).unwrap_or_default()
}

/// An [`App`] whose base directory lives as long as the struct.
pub struct TestApp {
    pub app: App,
    pub generator: Arc<ScriptedGenerator>,
    pub dir: TempDir,
}

/// Creates an app over a fresh temp dir, answering analysis with `generator`.
///
/// Uploads finish instantly and are stamped with [`fixed_today`].
pub fn create_test_app(generator: ScriptedGenerator) -> TestApp {
    let dir = TempDir::new().unwrap();
    let generator = Arc::new(generator);
    let mut app = App::with_generator(
        AppPaths::new(dir.path()),
        PersistedSettings::defaults(),
        generator.clone(),
    );
    app.upload_options.upload_delay = Duration::ZERO;
    app.upload_options.today = fixed_today;
    TestApp {
        app,
        generator,
        dir,
    }
}

/// Creates an app whose analysis call succeeds with [`GOOD_REPLY`].
pub fn create_replying_app() -> TestApp {
    create_test_app(ScriptedGenerator::replying(GOOD_REPLY))
}

/// Creates files of `size` bytes under `dir`, making parent directories.
///
/// # Errors
///
/// Returns an error if a directory or file cannot be written.
pub fn create_test_files(dir: &Path, files: &[&str], size: usize) -> Result<()> {
    for file in files {
        let path = dir.join(file);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, vec![0_u8; size])?;
    }
    Ok(())
}

/// Processes events until the upload task has finished.
pub async fn settle(app: &mut App) {
    for _ in 0..2500 {
        app.process_events();
        if !app.is_running() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(2)).await;
    }
    panic!("upload did not finish");
}

/// Processes events until the picker leaves the loading state.
pub async fn wait_for_picker(app: &mut App) {
    for _ in 0..500 {
        app.process_events();
        if !matches!(app.path_input.popup_state, PopupState::Loading) {
            return;
        }
        tokio::time::sleep(Duration::from_millis(2)).await;
    }
    panic!("bundle search did not answer");
}

pub fn key(code: KeyCode) -> KeyEvent {
    KeyEvent {
        code,
        modifiers: KeyModifiers::NONE,
        kind: KeyEventKind::Press,
        state: KeyEventState::NONE,
    }
}

pub fn char_key(c: char) -> KeyEvent {
    key(KeyCode::Char(c))
}

pub fn ctrl_key(code: KeyCode) -> KeyEvent {
    KeyEvent {
        modifiers: KeyModifiers::CONTROL,
        ..key(code)
    }
}

/// Types `text` one key at a time.
pub fn type_text(app: &mut App, text: &str) {
    for c in text.chars() {
        app.handle_key(char_key(c));
    }
}

/// Renders the app to a `TestBackend` terminal.
///
/// Calls `update_layout()` first, as the main loop does.
///
/// # Errors
///
/// Returns an error if terminal creation or rendering fails.
pub fn render_app_to_terminal(
    app: &mut App,
    width: u16,
    height: u16,
) -> Result<Terminal<TestBackend>> {
    let backend = TestBackend::new(width, height);
    let mut terminal = Terminal::new(backend)?;
    app.update_layout(Rect::new(0, 0, width, height));
    terminal.draw(|f| app.render(f))?;
    Ok(terminal)
}

/// Returns the rendered screen as one string per row.
#[must_use]
pub fn screen_text(terminal: &Terminal<TestBackend>) -> Vec<String> {
    let buffer = terminal.backend().buffer();
    let area = *buffer.area();
    (0..area.height)
        .map(|y| {
            (0..area.width)
                .map(|x| buffer[(x, y)].symbol())
                .collect::<String>()
        })
        .collect()
}

/// Returns true if any rendered row contains `needle`.
#[must_use]
pub fn screen_contains(terminal: &Terminal<TestBackend>, needle: &str) -> bool {
    screen_text(terminal).iter().any(|row| row.contains(needle))
}
