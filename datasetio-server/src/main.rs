mod config;
use clap::{Parser, Subcommand};
use config::Config;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

mod server;
use server::run_server;

#[derive(Parser)]
#[command(name = "datasetio")]
#[command(about = "Dataset management service for owner- and project-scoped CSV files")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server
    Server {
        /// Path to configuration file
        #[arg(short, long, default_value = "config.yaml")]
        config: String,
    },
    /// Initialize the data directory
    Init {
        /// Path to configuration file
        #[arg(short, long, default_value = "config.yaml")]
        config: String,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "datasetio=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Server { config } => {
            tracing::info!("Starting Datasetio server with config: {}", config);

            let cfg = match Config::from_file(&config) {
                Ok(c) => c,
                Err(e) => {
                    tracing::error!("Failed to load config: {}", e);
                    std::process::exit(1);
                }
            };

            if let Err(e) = run_server(cfg).await {
                tracing::error!("Server error: {}", e);
                std::process::exit(1);
            }
        }
        Commands::Init { config } => {
            tracing::info!("Initializing Datasetio data directory with config: {}", config);

            let cfg = match Config::from_file(&config) {
                Ok(c) => c,
                Err(e) => {
                    tracing::error!("Failed to load config: {}", e);
                    std::process::exit(1);
                }
            };

            let storage_root = cfg.storage.storage_root();
            if let Err(e) = std::fs::create_dir_all(&storage_root) {
                tracing::error!("Failed to create storage root {:?}: {}", storage_root, e);
                std::process::exit(1);
            }
            tracing::info!("Created storage root: {:?}", storage_root);

            match datasetio_core::MetadataStore::open(cfg.storage.metadata_db_path()) {
                Ok(_) => tracing::info!(
                    "Metadata store ready at {:?}",
                    cfg.storage.metadata_db_path()
                ),
                Err(e) => {
                    tracing::error!("Failed to initialize metadata store: {}", e);
                    std::process::exit(1);
                }
            }

            tracing::info!("Data directory initialized at {:?}", cfg.storage.data_dir);
        }
    }
}
