use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use chatwidget_core::{Config, HttpBackend};
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod app;
mod handler;
mod tui;
mod ui;

use app::App;
use tui::{EventHandler, Tui};

#[derive(Parser, Debug)]
#[command(name = "chatwidget")]
#[command(about = "Terminal chat widget that forwards prompts to a chat backend")]
#[command(version)]
struct Cli {
    /// Chat endpoint URL (overrides CHATWIDGET_ENDPOINT and the config file)
    #[arg(short, long)]
    endpoint: Option<String>,

    /// Config file to read instead of the default location
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Where to write logs (the terminal itself is owned by the UI)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Err(e) = init_logging(cli.log_file.clone()) {
        eprintln!("warning: logging disabled: {e:#}");
    }

    let config = match &cli.config {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("failed to read config {}", path.display()))?,
        None => Config::load().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "ignoring unreadable config file");
            Config::new()
        }),
    };

    let endpoint = config.resolve_endpoint(cli.endpoint.as_deref());
    tracing::info!(%endpoint, "starting chat widget");

    let app = App::new(&config, Arc::new(HttpBackend::new(&endpoint)));

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let result = run(&mut terminal, app).await;
    tui::restore()?;

    result
}

async fn run(terminal: &mut Tui, mut app: App) -> Result<()> {
    let mut events = EventHandler::new();

    while !app.should_quit {
        terminal.draw(|frame| ui::render(&mut app, frame))?;

        tokio::select! {
            Some(event) = events.next() => handler::handle_event(&mut app, event),
            outcome = app.exchange_finished() => app.finish_exchange(outcome),
            else => break,
        }
    }

    Ok(())
}

fn default_log_path() -> Option<PathBuf> {
    dirs::cache_dir().map(|dir| dir.join("chatwidget").join("chatwidget.log"))
}

/// Send tracing output to a file, filtered by RUST_LOG (default `info`).
fn init_logging(path: Option<PathBuf>) -> Result<()> {
    let path = path
        .or_else(default_log_path)
        .context("could not determine a log file location")?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("failed to open log file {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();

    Ok(())
}
