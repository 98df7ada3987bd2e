use anyhow::{bail, Result};
use clap::Parser;
use olympic_medals::{
    api::{DetailResponse, HomeResponse},
    config::{DataSource, DEFAULT_DATA_PATH},
    DatasetStore, LoadState,
};

/// Load the dataset once and print the home or country view as JSON
#[derive(Parser, Debug)]
#[command(name = "medal-summary")]
struct Args {
    /// Dataset location: a JSON file path or an http(s) URL
    #[arg(short, long, env = "OLYMPIC_DATA", default_value = DEFAULT_DATA_PATH)]
    data: DataSource,

    /// Print this country's detail instead of the home view
    #[arg(short, long)]
    country: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let store = DatasetStore::new(args.data.loader());
    let mut snapshots = store.snapshot();
    store.load();

    let Some(snapshot) = snapshots.wait_for(|s| s.state().is_settled()).await else {
        bail!("Store closed before the load settled");
    };
    if let LoadState::Failed { reason } = snapshot.state() {
        bail!("Failed to load {}: {}", args.data, reason);
    }

    let output = match args.country {
        Some(country) => match DetailResponse::from_snapshot(&snapshot, &country) {
            Some(detail) => serde_json::to_string_pretty(&detail)?,
            None => bail!("Country not found: {}", country),
        },
        None => serde_json::to_string_pretty(&HomeResponse::from_snapshot(&snapshot))?,
    };

    println!("{}", output);
    Ok(())
}
