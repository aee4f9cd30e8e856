use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use triplog::{
    config::Config,
    pipeline::ArchivalPipeline,
    services::{
        EnrichmentService, GoogleSheetsSink, NominatimGeocoder, OpenWeatherProvider,
        OverpassDirectory, SupabaseVerifier,
    },
    storage::{R2ObjectStore, StagingArea},
    web::{AppState, WebServer},
};

#[derive(Parser)]
#[command(name = "triplog")]
#[command(version = "0.1.0")]
#[command(about = "Travel photo log: EXIF extraction, enrichment and archival")]
#[command(long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Listening IP address
    #[arg(short = 'H', long, value_name = "IP")]
    host: Option<String>,

    /// Listening port
    #[arg(short, long, value_name = "PORT")]
    port: Option<u16>,

    /// Log level
    #[arg(short = 'v', long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Collaborator secrets live in .env during development
    dotenvy::dotenv().ok();

    let log_filter = if cli.log_level == "trace" {
        format!("triplog={},tower_http=trace", cli.log_level)
    } else {
        format!("triplog={}", cli.log_level)
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting triplog v{}", env!("CARGO_PKG_VERSION"));

    std::env::set_var("CONFIG_FILE", &cli.config);
    let mut config = Config::load()?;
    info!("Configuration loaded from: {}", cli.config);

    if let Some(host) = cli.host {
        config.web.host = host;
    }
    if let Some(port) = cli.port {
        config.web.port = port;
    }

    let staging = StagingArea::new(config.storage.upload_path.clone());
    staging.ensure_dirs().await?;
    info!("Upload staging area ready at {}", config.storage.upload_path.display());

    let geocoder = Arc::new(NominatimGeocoder::new(&config.geocoding)?);
    let weather = Arc::new(OpenWeatherProvider::new(&config.weather)?);
    let places = Arc::new(OverpassDirectory::new(&config.places)?);
    let records = Arc::new(GoogleSheetsSink::from_env(&config.sheets)?);
    let sessions = Arc::new(SupabaseVerifier::from_env(&config.auth)?);
    let store = Arc::new(R2ObjectStore::from_env().await?);
    info!("Collaborator clients initialized");

    let enrichment =
        EnrichmentService::new(geocoder.clone(), weather.clone(), places.clone());
    let pipeline = ArchivalPipeline::new(store);

    let state = AppState {
        config,
        staging,
        geocoder,
        weather,
        places,
        records,
        sessions,
        enrichment,
        pipeline,
    };

    let web_server = WebServer::new(state)?;
    info!(
        "Starting web server on {}:{}",
        web_server.host(),
        web_server.port()
    );
    web_server.serve().await?;

    Ok(())
}
