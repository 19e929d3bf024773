use anyhow::Context;
use cla_backend::config::{Config, DEFAULT_CONFIG_PATH};
use cla_backend::logging;
use cla_backend::observability;
use cla_backend::server::{self, AppState};
use cla_backend::storage::{DocumentStore, InMemoryDocumentStore};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info, warn};

#[derive(Parser)]
#[command(name = "cla_backend")]
#[command(about = "CLA management backend: companies, invites, signatures and metrics")]
#[command(version)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// JSON snapshot of the document store, loaded at start and saved on exit
    #[arg(long, global = true)]
    data_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API server
    Server {
        /// Port to listen on (overrides the config file)
        #[arg(long)]
        port: Option<u16>,
        /// Allow every CORS origin and resolve projects locally
        #[arg(long)]
        local: bool,
    },
    /// Recompute the stored metric documents and exit
    CalculateMetrics,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load(&cli.config)
        .with_context(|| format!("loading configuration from {}", cli.config.display()))?;
    if let Some(data_file) = cli.data_file {
        config.data_file = Some(data_file);
    }

    let _guard = logging::init_logging(&config.log_dir);
    if let Err(e) = observability::init() {
        warn!("metrics disabled: {}", e);
    }

    let store = Arc::new(
        InMemoryDocumentStore::for_stage(&config.stage, config.scan_page_size)
            .context("creating document store")?,
    );
    if let Some(path) = config.data_file.as_deref() {
        load_snapshot(&store, path)?;
    }

    match cli.command {
        Commands::Server { port, local } => {
            if let Some(port) = port {
                config.port = port;
            }
            config.local_mode |= local;
            info!(
                "starting cla backend, stage: {}, local mode: {}",
                config.stage, config.local_mode
            );

            let dyn_store: Arc<dyn DocumentStore> = store.clone();
            let state = AppState::new(dyn_store, &config);
            if config.calculate_metrics_on_start {
                if let Err(e) = state.calculator.calculate_and_store().await {
                    error!("initial metrics calculation failed: {}", e);
                }
            }
            let result = server::start_server(state, &config).await;
            save_snapshot(&store, config.data_file.as_deref());
            result.context("running HTTP server")?;
        }
        Commands::CalculateMetrics => {
            let dyn_store: Arc<dyn DocumentStore> = store.clone();
            let state = AppState::new(dyn_store, &config);
            let computed = state
                .calculator
                .calculate_and_store()
                .await
                .context("calculating metrics")?;
            info!(
                "stored metrics: {} companies, {} projects",
                computed.companies.len(),
                computed.projects.len()
            );
            save_snapshot(&store, config.data_file.as_deref());
        }
    }

    Ok(())
}

fn load_snapshot(store: &InMemoryDocumentStore, path: &Path) -> anyhow::Result<()> {
    if !path.exists() {
        info!("data file {} not found, starting empty", path.display());
        return Ok(());
    }
    store
        .load_snapshot(path)
        .with_context(|| format!("loading data file {}", path.display()))
}

fn save_snapshot(store: &InMemoryDocumentStore, path: Option<&Path>) {
    let Some(path) = path else {
        return;
    };
    match store.save_snapshot(path) {
        Ok(()) => info!("saved data file {}", path.display()),
        Err(e) => error!("unable to save data file {}: {}", path.display(), e),
    }
}
