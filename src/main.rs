use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use player_stats::api::{build_router, state::AppState};
use player_stats::config::{AppConfig, DatabaseConfig};
use player_stats::store::{MemoryPlayerStore, MongoPlayerStore, PlayerStore, StoreHandle};

#[derive(Parser)]
#[command(name = "player-stats")]
#[command(about = "Read-only player statistics API")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(long, default_value = "./config.toml")]
    config: PathBuf,

    /// Log level (trace, debug, info, warn, error); overrides the config file
    #[arg(long)]
    log_level: Option<String>,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the API server
    Serve {
        /// Bind address
        #[arg(long)]
        host: Option<String>,

        /// Port number
        #[arg(long)]
        port: Option<u16>,

        /// Serve from a JSONL snapshot instead of MongoDB
        #[arg(long)]
        players_file: Option<PathBuf>,
    },

    /// Connect to the configured store, ping it and exit
    CheckStore,
}

/// Open the configured store: a JSONL snapshot if one is set, MongoDB otherwise.
async fn open_store(config: &DatabaseConfig) -> Result<Arc<dyn PlayerStore>> {
    match &config.players_file {
        Some(path) => {
            let store = MemoryPlayerStore::from_jsonl(path)
                .with_context(|| format!("Failed to load players from {:?}", path))?;
            Ok(Arc::new(store))
        }
        None => {
            let store = MongoPlayerStore::connect(config)
                .await
                .context("Failed to connect to MongoDB")?;
            Ok(Arc::new(store))
        }
    }
}

/// Connect in the background and install the store once ready.
/// A failed connection terminates the process.
async fn connect_store(config: DatabaseConfig, handle: StoreHandle) {
    match open_store(&config).await {
        Ok(store) => {
            tracing::info!("Store '{}' ready", store.name());
            handle.install(store);
        }
        Err(e) => {
            tracing::error!("Store connection failed: {:#}", e);
            std::process::exit(1);
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    dotenvy::dotenv().ok();
    let mut config = AppConfig::load(&cli.config).context("Failed to load configuration")?;

    // Initialize tracing
    let level = cli.log_level.clone().unwrap_or_else(|| config.log_level.clone());
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&level));

    tracing_subscriber::registry()
        .with(filter)
        .with(cli.json_logs.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!cli.json_logs).then(tracing_subscriber::fmt::layer))
        .init();

    tracing::info!("Starting player-stats v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Serve {
            host,
            port,
            players_file,
        } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            if players_file.is_some() {
                config.database.players_file = players_file;
            }
            config.validate()?;

            let handle = StoreHandle::pending();
            let app = build_router(AppState::new(handle.clone()));

            let addr = format!("{}:{}", config.server.host, config.server.port);
            let listener = tokio::net::TcpListener::bind(&addr)
                .await
                .with_context(|| format!("Failed to bind {}", addr))?;
            tracing::info!("Backend running at http://{}", addr);

            tokio::spawn(connect_store(config.database.clone(), handle));
            axum::serve(listener, app).await?;
        }
        Commands::CheckStore => {
            let store = open_store(&config.database).await?;
            store.health_check().await?;
            match &config.database.players_file {
                Some(path) => tracing::info!(
                    "Store '{}' reachable (snapshot {})",
                    store.name(),
                    path.display()
                ),
                None => tracing::info!(
                    "Store '{}' reachable (database '{}', collection '{}')",
                    store.name(),
                    config.database.database,
                    config.database.collection
                ),
            }
        }
    }

    Ok(())
}
