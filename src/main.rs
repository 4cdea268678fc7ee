use anyhow::Result;
use clap::{Parser, Subcommand};
use feedstash::{config::Config, trigger};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

/// Run one collection pass and print the response payload.
#[derive(Parser, Debug)]
#[command(name = "feedstash")]
struct Args {
    #[command(subcommand)]
    pipeline: Pipeline,
}

#[derive(Subcommand, Debug)]
enum Pipeline {
    /// Save one snapshot of a vehicle-location feed
    Vehicle {
        /// URL of the vehicle-location feed
        #[arg(long)]
        data: Option<String>,
    },
    /// Append the current weather of every configured city
    Weather,
}

#[tokio::main]
async fn main() -> Result<()> {
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = Config::from_env()?;
    info!(store = %config.store.url, "startup");

    let response = match args.pipeline {
        Pipeline::Vehicle { data } => trigger::vehicle_location(&config, data).await,
        Pipeline::Weather => trigger::weather(&config).await,
    };

    println!("{}", serde_json::to_string_pretty(&response)?);
    if !response.is_success() {
        std::process::exit(1);
    }
    Ok(())
}
