//! `App On The Go` - simulated mobile build distribution
//!
//! Entry point for the application.

use std::fs::OpenOptions;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use ratatui::crossterm::event::{self, Event, KeyEventKind};
use serde::Serialize;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::MakeWriter;

use apponthego::app::App;
use apponthego::cli::Args;
use apponthego::core::{
    BundleFile, FlowState, GeminiGenerator, UploadController, UploadOptions, UploadStep, share_link,
};
use apponthego::fs::{AppPaths, PersistedSettings};
use apponthego::tui::TerminalEventGuard;

/// Environment variable holding the log filter.
const LOG_ENV: &str = "APPONTHEGO_LOG";

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let paths = AppPaths::from_cwd()?;

    if args.headless {
        init_logging(std::io::stderr)?;
        return run_headless(&args, &paths).await;
    }

    paths.ensure_app_dir()?;
    let log_path = paths.log_file();
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open log file: {}", log_path.display()))?;
    init_logging(Mutex::new(log_file))?;

    let mut terminal = ratatui::init();
    let result = run_app(&mut terminal, &args, paths);
    ratatui::restore();

    result
}

/// Installs the global subscriber, filtered by `APPONTHEGO_LOG` (default `info`).
fn init_logging<W>(writer: W) -> Result<()>
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!(e))
}

fn run_app(terminal: &mut ratatui::DefaultTerminal, args: &Args, paths: AppPaths) -> Result<()> {
    // Must be set up after ratatui::init, which resets terminal modes.
    let _event_guard = TerminalEventGuard::new();

    let mut app = App::new_with_paths(args, paths)?;
    info!("upload screen ready");

    loop {
        terminal.draw(|frame| {
            app.update_layout(frame.area());
            app.render(frame);
        })?;

        if event::poll(Duration::from_millis(50))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => app.handle_key(key),
                Event::Paste(text) => app.handle_paste(&text),
                _ => {}
            }
        }

        app.process_events();

        if app.should_quit() {
            break;
        }
    }

    Ok(())
}

/// JSON printed by `--headless`.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HeadlessReport<'a> {
    #[serde(flatten)]
    state: &'a FlowState,
    share_link: Option<String>,
}

/// Runs one upload without the TUI and prints the settled state.
async fn run_headless(args: &Args, paths: &AppPaths) -> Result<()> {
    let bundle = args
        .bundle
        .as_deref()
        .context("--headless needs a bundle path")?;

    let persisted = paths.load_settings().unwrap_or_else(|e| {
        let detail = format!("{e:#}");
        warn!(error = %detail, "settings unusable, using defaults");
        PersistedSettings::default()
    });
    let settings = persisted.overridden_by(args.setting_overrides());
    if args.resolved_api_key().is_none() {
        warn!("no API key set, analysis will use default copy");
    }

    let file = BundleFile::inspect(&paths.base().join(bundle))?;
    let generator = Arc::new(GeminiGenerator::new(args.gemini_config(&settings))?);
    let options = UploadOptions {
        upload_delay: settings.upload_delay(),
        ..UploadOptions::default()
    };

    let mut controller = UploadController::new(generator, options);
    let state = controller.select_file(&file).await?;

    let link = (state.step() == UploadStep::Success)
        .then(|| share_link(settings.share_host(), &mut rand::thread_rng()));
    let report = HeadlessReport {
        state,
        share_link: link,
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
