// CLI module - command-line argument parsing and one-shot commands
//
// With no subcommand the interactive page starts. Subcommands:
// - ask: send one question and print the reply
// - config: show, locate or reset the config file

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use ragpage_core::markdown::{self, Segment};
use ragpage_core::{connection, ChatSession, Config, RagClient};

/// Demo page and chat client for a WordPress RAG API
#[derive(Parser)]
#[command(name = "ragpage")]
#[command(version)]
#[command(about = "Terminal demo page for a RAG question-answering API", long_about = None)]
pub struct Cli {
    /// Base URL of the RAG API (overrides config and RAGPAGE_API_URL)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Directory for log files
    #[arg(long, global = true)]
    pub log_dir: Option<PathBuf>,

    /// Skip the startup health check and stay in demo mode
    #[arg(long, global = true)]
    pub no_probe: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Ask a single question and print the reply
    Ask {
        /// Your question
        question: String,
    },
    /// Manage configuration
    Config {
        /// Show effective configuration
        #[arg(long)]
        show: bool,

        /// Show config file path
        #[arg(long)]
        path: bool,

        /// Reset config file to defaults
        #[arg(long)]
        reset: bool,
    },
}

pub fn handle_config(config: &Config, show: bool, path: bool, reset: bool) -> Result<()> {
    if path {
        println!("{}", Config::get_config_path()?.display());
    } else if reset {
        Config::new().save()?;
        println!("Config reset: {}", Config::get_config_path()?.display());
    } else if show {
        println!("{}", serde_json::to_string_pretty(config)?);
    } else {
        println!("Usage: ragpage config [--show|--path|--reset]");
    }
    Ok(())
}

/// Strip `**` markers for plain terminal output
fn plain_text(text: &str) -> String {
    text.lines()
        .map(|line| {
            markdown::segments(line)
                .into_iter()
                .map(|segment| match segment {
                    Segment::Plain(s) | Segment::Strong(s) => s,
                })
                .collect::<String>()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Probe once, send one question, print the reply
pub async fn handle_ask(
    probe_client: &RagClient,
    client: RagClient,
    question: &str,
    probe: bool,
) -> Result<()> {
    let state = if probe {
        connection::probe(probe_client).await
    } else {
        Default::default()
    };
    eprintln!("[{}]", state.label());

    let mut session = ChatSession::new(client, state);
    for c in question.chars() {
        session.insert_char(c);
    }
    if !session.submit().await {
        eprintln!("Nothing to ask.");
        return Ok(());
    }

    if let Some(reply) = session.messages().last() {
        println!("{}", plain_text(&reply.content));
        if let Some(sources) = reply.visible_sources() {
            println!("\nSources:");
            for source in sources {
                println!("  • {}", markdown::format_source(source));
            }
        }
    }
    Ok(())
}
