mod commands;
mod logging;
mod render;

use anyhow::{Context, Result};
use calgrid_core::config::Config;
use calgrid_core::remote::HttpRemote;
use calgrid_core::{EventStore, Month};
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "calgrid")]
#[command(about = "Browse a month of calendar events and keep them in sync with your event service")]
struct Cli {
    /// Event service URL (overrides config and $CALGRID_SERVER)
    #[arg(long, global = true)]
    server: Option<String>,

    /// Show debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the month grid
    Month {
        /// Month to show (YYYY-MM), defaults to the current month
        month: Option<Month>,

        /// Move this many months forward
        #[arg(long, conflicts_with = "prev", default_value_t = 0)]
        next: u16,

        /// Move this many months back
        #[arg(long, conflicts_with = "next", default_value_t = 0)]
        prev: u16,
    },
    /// List every event known to the service
    List,
    /// Create a new event
    New {
        /// Event title
        title: String,

        /// Day of the event (YYYY-MM-DD)
        #[arg(short, long)]
        date: String,

        /// Event description
        #[arg(long, default_value = "")]
        description: String,
    },
    /// Edit an existing event
    Update {
        /// Remote id of the event (see `calgrid list`)
        id: String,

        /// New title
        title: String,

        /// New day (YYYY-MM-DD)
        #[arg(short, long)]
        date: String,

        /// New description
        #[arg(long, default_value = "")]
        description: String,
    },
    /// Delete an event
    Delete {
        /// Remote id of the event (see `calgrid list`)
        id: String,
    },
    /// Inspect or create the config file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print where the config file lives
    Path,
    /// Write a commented default config file
    Init,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose)?;

    match cli.command {
        Commands::Config { action } => match action {
            ConfigAction::Path => commands::config::path(),
            ConfigAction::Init => commands::config::init(),
        },
        Commands::Month { month, next, prev } => {
            let store = connect(cli.server)?;
            let base = month.unwrap_or_else(Month::current);
            let target = base.offset(i32::from(next) - i32::from(prev));
            commands::month::run(&store, target).await
        }
        Commands::List => {
            let store = connect(cli.server)?;
            commands::list::run(&store).await
        }
        Commands::New { title, date, description } => {
            let store = connect(cli.server)?;
            commands::new::run(&store, title, &date, description).await
        }
        Commands::Update { id, title, date, description } => {
            let store = connect(cli.server)?;
            commands::update::run(&store, &id, title, &date, description).await
        }
        Commands::Delete { id } => {
            let store = connect(cli.server)?;
            commands::delete::run(&store, &id).await
        }
    }
}

/// Build a store backed by the configured event service.
fn connect(server: Option<String>) -> Result<EventStore<HttpRemote>> {
    let mut config = Config::load().context("Failed to load calgrid config")?;
    if let Some(server) = server {
        config.server_url = server;
    }

    let remote = HttpRemote::from_config(&config).context("Failed to set up HTTP client")?;
    Ok(EventStore::new(remote))
}
