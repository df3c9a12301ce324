use std::time::Instant;

use anyhow::Result;
use clap::Parser;
use ragpage_core::{connection, Config, ConnectionState};

mod app;
mod cli;
mod content;
mod handler;
mod logging;
mod tui;
mod ui;

use app::App;
use cli::{Cli, Commands};
use tui::{AppEvent, EventHandler};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load()
        .unwrap_or_else(|e| {
            eprintln!("Ignoring unreadable config: {e}");
            Config::new()
        })
        .with_env();
    if let Some(url) = &cli.api_url {
        config.api_url = Some(url.clone());
    }

    match cli.command {
        Some(Commands::Config { show, path, reset }) => {
            cli::handle_config(&config, show, path, reset)
        }
        Some(Commands::Ask { ref question }) => {
            logging::init_stderr(config.log_level())?;
            let probe_client = config.probe_client()?;
            cli::handle_ask(&probe_client, config.chat_client(), question, !cli.no_probe).await
        }
        None => run_tui(&cli, &config).await,
    }
}

async fn run_tui(cli: &Cli, config: &Config) -> Result<()> {
    let log_dir = cli.log_dir.clone().unwrap_or_else(logging::default_log_dir);
    // Dropping the guard flushes pending log lines
    let _guard = logging::init_file(&log_dir, config.log_level())?;
    tracing::info!(api_url = config.api_url(), "Starting ragpage");

    let probe_client = config.probe_client()?;

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = EventHandler::new();
    let mut app = App::new(config, config.chat_client(), events.sender());

    if cli.no_probe {
        app.apply_probe(ConnectionState::Demo);
    } else {
        let tx = events.sender();
        tokio::spawn(async move {
            let state = connection::probe(&probe_client).await;
            let _ = tx.send(AppEvent::Probed(state));
        });
    }

    let result = async {
        while !app.should_quit {
            terminal.draw(|frame| ui::render(&mut app, frame, Instant::now()))?;
            match events.next().await {
                Some(event) => handler::handle_event(&mut app, event)?,
                None => break,
            }
        }
        Ok::<_, anyhow::Error>(())
    }
    .await;

    tui::restore()?;
    tracing::info!("Exiting ragpage");
    result
}
