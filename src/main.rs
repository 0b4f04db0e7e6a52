//! WikiGaia server: community problem voting with milestones, workflow
//! advancement, and a realtime vote stream.
//!
//! Main entry point that loads configuration and starts the server.

use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt};

use wikigaia_core::config::AppConfig;
use wikigaia_core::error::AppError;
use wikigaia_database::Stores;
use wikigaia_database::connection::open_pool;

/// WikiGaia server
#[derive(Debug, Parser)]
#[command(name = "wikigaia-server", version, about)]
struct Cli {
    /// Configuration environment overlay (`config/<env>.toml`)
    #[arg(long, env = "WIKIGAIA_ENV", default_value = "development")]
    env: String,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP server (default)
    Serve,
    /// Apply pending PostgreSQL migrations and exit
    Migrate,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match AppConfig::load(&cli.env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);

    let result = match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(config).await,
        Command::Migrate => migrate(config).await,
    };

    if let Err(e) = result {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

async fn serve(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting WikiGaia v{}", env!("CARGO_PKG_VERSION"));

    let stores = Stores::connect(&config.database).await?;
    wikigaia_api::run_server(config, stores).await
}

async fn migrate(config: AppConfig) -> Result<(), AppError> {
    let mut database = config.database;
    database.run_migrations = true;
    let pool = open_pool(&database).await?;
    pool.close().await;
    tracing::info!("All migrations applied");
    Ok(())
}
