use anyhow::{Context, Result};
use clap::Parser;
use std::{net::SocketAddr, path::PathBuf};
use tracing::{info, warn};

use olympic_medals::{
    api,
    config::{DataSource, ServerConfig, DEFAULT_DATA_PATH},
    DatasetStore, LoadState,
};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Dataset location: a JSON file path or an http(s) URL
    #[arg(short, long, env = "OLYMPIC_DATA", default_value = DEFAULT_DATA_PATH)]
    data: DataSource,

    /// Address to run the web server on
    #[arg(short, long, env = "OLYMPIC_BIND", default_value = "127.0.0.1:3000")]
    bind: SocketAddr,

    /// Directory of frontend files to serve
    #[arg(long, env = "OLYMPIC_STATIC_DIR")]
    static_dir: Option<PathBuf>,
}

impl From<Args> for ServerConfig {
    fn from(args: Args) -> Self {
        Self {
            bind: args.bind,
            data_source: args.data,
            static_dir: args.static_dir,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(
                    "olympic_medals=info"
                        .parse::<tracing_subscriber::filter::Directive>()
                        .context("Invalid log directive")?,
                ),
        )
        .init();

    let config = ServerConfig::from(Args::parse());

    info!("Starting Olympic medals server");
    info!("Data source: {}", config.data_source);
    info!("Bind: {}", config.bind);

    let store = DatasetStore::new(config.data_source.loader());
    store.load();

    // Report the first load outcome without blocking startup
    let mut load_state = store.load_state();
    tokio::spawn(async move {
        match load_state.wait_for(LoadState::is_settled).await {
            Some(LoadState::Failed { reason }) => warn!("Initial load failed: {}", reason),
            Some(_) => info!("Initial load complete"),
            None => {}
        }
    });

    let app = api::router(store, config.static_dir.as_deref());

    info!("Server running at http://{}", config.bind);

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind))?;
    axum::serve(listener, app).await?;

    Ok(())
}
