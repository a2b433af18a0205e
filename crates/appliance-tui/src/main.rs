use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use appliance_core::{Config, HttpSearchClient};
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod app;
mod handler;
mod plain;
mod tui;
mod ui;

use app::App;
use plain::SearchAnswers;

const LOG_ENV: &str = "APPLIANCE_LOG";
const DEFAULT_LOG_FILTER: &str = "appliance_core=info,appliance_chat=info";

#[derive(Parser)]
#[command(name = "appliance-chat")]
#[command(version, about = "Chat with an appliance research service to find replacement products")]
struct Cli {
    /// Base URL of the search service, e.g. http://localhost:5001/api
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the interactive conversation (default)
    Chat,
    /// Answer every question from flags and print the transcript
    Search {
        /// range, dishwasher, refrigerator or microwave
        #[arg(long)]
        appliance_type: String,
        #[arg(long)]
        brand: String,
        #[arg(long)]
        model: String,
        /// Only show replacements from the same brand
        #[arg(long)]
        brand_for_brand: bool,
        /// Maximum price in dollars
        #[arg(long)]
        limit: Option<f64>,
    },
    /// Check that the search service is reachable
    Health,
    /// Remember a search service URL in the config file
    SetUrl {
        url: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let interactive = matches!(cli.command, None | Some(Commands::Chat));
    init_logging(interactive)?;

    // A broken config file should not keep the app from starting
    let config = Config::load().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Ignoring unreadable config file");
        Config::new()
    });
    let api_url = config.resolve_api_url(cli.api_url.as_deref());
    tracing::info!(%api_url, "Using search service");

    match cli.command {
        None | Some(Commands::Chat) => run_tui(api_url).await,
        Some(Commands::Search {
            appliance_type,
            brand,
            model,
            brand_for_brand,
            limit,
        }) => {
            let gateway = HttpSearchClient::new(&api_url);
            let answers = SearchAnswers {
                appliance_type,
                brand,
                model,
                brand_for_brand,
                dollar_limit: limit,
            };
            plain::run_search(&gateway, answers, std::io::stdout()).await?;
            Ok(())
        }
        Some(Commands::Health) => {
            let gateway = HttpSearchClient::new(&api_url);
            let health = gateway.health_check().await?;
            println!(
                "{} {} ({}) at {}",
                health.service.as_deref().unwrap_or("search service"),
                health.version.as_deref().unwrap_or("unknown version"),
                health.status,
                gateway.base_url()
            );
            Ok(())
        }
        Some(Commands::SetUrl { url }) => {
            let path = Config::save_api_url(&url)?;
            println!("Saved search service URL to {}", path.display());
            Ok(())
        }
    }
}

/// Logs go to a file while the terminal belongs to the TUI, otherwise to stderr
fn init_logging(interactive: bool) -> Result<()> {
    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    if interactive {
        let Some(path) = log_file_path() else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_ansi(false).with_writer(Arc::new(file)))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }
    Ok(())
}

fn log_file_path() -> Option<PathBuf> {
    Config::config_dir().ok().map(|dir| dir.join("appliance-chat.log"))
}

async fn run_tui(api_url: String) -> Result<()> {
    // Install panic hook to restore terminal on crash
    tui::install_panic_hook();

    let mut terminal = tui::init()?;
    let mut events = tui::EventHandler::new();

    let gateway = Arc::new(HttpSearchClient::new(&api_url));
    let mut app = App::new(gateway, api_url, events.sender());

    let result = run_app(&mut terminal, &mut app, &mut events).await;

    // Restore terminal
    tui::restore()?;

    result
}

async fn run_app(
    terminal: &mut tui::Tui,
    app: &mut App,
    events: &mut tui::EventHandler,
) -> Result<()> {
    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        match events.next().await {
            Some(event) => handler::handle_event(app, event),
            None => break,
        }
    }
    Ok(())
}
