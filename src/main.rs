//! Binary entrypoint for the Playerbase CLI.
//!
//! Commands:
//! - `init` - create a starter `config.toml` and an empty player file
//! - `create <nick>` - register a player and print its id
//! - `delete <id>` - remove a player and print the removed record
//! - `add-points <id> <points>` - credit points and print the new total
//! - `get <id>` - print one player
//! - `list [--json]` - print every player in registry order
//!
//! See the library crate docs for module-level details: `playerbase::`.
use std::path::Path;

use anyhow::Result;
use clap::{Parser, Subcommand};
use log::{info, warn};

use playerbase::config::Config;
use playerbase::registry::PlayerRegistry;
use playerbase::storage::PlayerStore;
use playerbase::PlayerId;

#[derive(Parser)]
#[command(name = "playerbase")]
#[command(about = "Manage a file-backed registry of game players")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path (can be used before or after subcommand)
    #[arg(short, long, default_value = "config.toml", global = true)]
    config: String,

    /// Player data file; overrides `storage.data_file` from the config
    #[arg(long, global = true)]
    data: Option<String>,

    /// Verbose logging (-v, -vv for more; may appear before or after subcommand)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default config and an empty player file if they are missing
    Init,
    /// Register a new player
    Create {
        /// Nickname (must be unique)
        nick: String,
    },
    /// Delete a player by id
    Delete { id: PlayerId },
    /// Credit points to a player
    AddPoints {
        id: PlayerId,
        /// Points to add; negative values are rejected
        #[arg(allow_hyphen_values = true)]
        points: i64,
    },
    /// Show one player
    Get { id: PlayerId },
    /// List all players
    List {
        /// Print the players as a JSON array
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config_present = Path::new(&cli.config).exists();
    let mut config = if config_present {
        Config::load(&cli.config).await?
    } else {
        Config::default()
    };
    if let Some(data) = cli.data {
        config.storage.data_file = data;
    }
    init_logging(&config, cli.verbose);
    if !config_present && !matches!(cli.command, Commands::Init) {
        warn!("Config file {} not found; using defaults", cli.config);
    }

    match cli.command {
        Commands::Init => {
            if config_present {
                info!("Config file {} already exists; leaving it", cli.config);
            } else {
                Config::create_default(&cli.config).await?;
                info!("Configuration file created at {}", cli.config);
            }
            let store = PlayerStore::from_config(&config.storage);
            if store.path().exists() {
                info!("Player file {} already exists; leaving it", store.path().display());
            } else {
                store.save(&[]).await?;
                info!("Initialized empty player file at {}", store.path().display());
            }
            if config.storage.lock {
                info!(
                    "Saves take a lock on {}.lock next to the player file",
                    store.path().display()
                );
            }
        }
        Commands::Create { nick } => {
            let mut registry = PlayerRegistry::from_config(&config).await?;
            let id = registry.create_player(&nick).await?;
            println!("{}", id);
        }
        Commands::Delete { id } => {
            let mut registry = PlayerRegistry::from_config(&config).await?;
            let removed = registry.delete_player(id).await?;
            println!("{}", removed);
        }
        Commands::AddPoints { id, points } => {
            let mut registry = PlayerRegistry::from_config(&config).await?;
            let total = registry.add_points(id, points).await?;
            println!("{}", total);
        }
        Commands::Get { id } => {
            let registry = PlayerRegistry::from_config(&config).await?;
            println!("{}", registry.get_player_by_id(id)?);
        }
        Commands::List { json } => {
            let registry = PlayerRegistry::from_config(&config).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(registry.list_players())?);
            } else {
                for player in registry.list_players() {
                    println!("{}", player);
                }
            }
        }
    }

    Ok(())
}

fn init_logging(config: &Config, verbosity: u8) {
    use std::io::Write;
    let mut builder = env_logger::Builder::new();
    // CLI verbosity overrides the configured level
    let base_level = match verbosity {
        0 => config.logging.level_filter(),
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    builder.filter_level(base_level);

    let log_file = config.logging.file.as_ref().and_then(|file| {
        std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(file)
            .ok()
    });

    if let Some(f) = log_file {
        let write_mutex = std::sync::Arc::new(std::sync::Mutex::new(f));
        // Echo to the console only when attached to a terminal
        let is_tty = atty::is(atty::Stream::Stdout);
        builder.format(move |fmt, record| {
            let ts = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
            let line = format!("{} [{}] {}", ts, record.level(), record.args());
            if let Ok(mut guard) = write_mutex.lock() {
                let _ = writeln!(guard, "{}", line);
            }
            if is_tty {
                writeln!(fmt, "{}", line)
            } else {
                Ok(())
            }
        });
    } else {
        builder.format(|fmt, record| {
            let ts = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
            writeln!(fmt, "{} [{}] {}", ts, record.level(), record.args())
        });
    }
    let _ = builder.try_init();
}
