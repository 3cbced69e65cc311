use std::fs::{self, OpenOptions};
use std::sync::{Arc, Mutex};

use anyhow::Result;
use clap::Parser;
use moodchat_core::{Config, HttpChatClient};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod app;
mod handler;
mod tui;
mod ui;

use app::App;
use tui::EventHandler;

#[derive(Parser)]
#[command(name = "moodchat")]
#[command(about = "Chat with a mood-based music recommender from your terminal")]
#[command(version)]
struct Cli {
    /// Chat service endpoint (POST, JSON)
    #[arg(short, long, env = "MOODCHAT_ENDPOINT")]
    endpoint: Option<String>,

    /// Save the endpoint in use to the config file
    #[arg(long)]
    remember: bool,
}

/// Send logs to a file; the terminal belongs to the UI.
fn init_logging() {
    let Ok(path) = Config::log_path() else {
        return;
    };
    if let Some(parent) = path.parent() {
        if fs::create_dir_all(parent).is_err() {
            return;
        }
    }
    let Ok(file) = OpenOptions::new().create(true).append(true).open(&path) else {
        return;
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging();

    let config = Config::load().unwrap_or_else(|err| {
        warn!(error = %err, "unreadable config, using defaults");
        Config::new()
    });
    let endpoint = config.resolve_endpoint(cli.endpoint.as_deref());
    if cli.remember {
        Config::save_endpoint(&endpoint)?;
    }
    info!(%endpoint, "starting chat");

    tui::install_panic_hook();
    let mut terminal = tui::init()?;

    let result = run(&mut terminal, endpoint).await;

    tui::restore()?;
    result
}

async fn run(terminal: &mut tui::Tui, endpoint: String) -> Result<()> {
    let mut events = EventHandler::new();
    let backend = Arc::new(HttpChatClient::new(&endpoint));
    let mut app = App::new(backend, endpoint, events.sender());

    while !app.should_quit {
        terminal.draw(|frame| ui::render(&mut app, frame))?;

        let Some(event) = events.next().await else {
            break;
        };
        handler::handle_event(&mut app, event);
    }

    Ok(())
}
