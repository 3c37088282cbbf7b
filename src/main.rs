use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use agromap::{
    config::{AppConfig, ConfigLoader},
    geodata::{CountryCollection, GeoDataLoader, GeoPoint},
    resolver::PointResolver,
    web::{self, WebServerConfig},
};

#[derive(Debug, Parser)]
#[command(author, version, about = "Country picker and crop simulation map")]
struct Cli {
    /// Path to a YAML config file (built-in defaults when omitted)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Fetch country boundaries from this URL
    #[arg(long, global = true, conflicts_with = "geojson_file")]
    geojson_url: Option<String>,

    /// Read country boundaries from a local GeoJSON file
    #[arg(long, global = true)]
    geojson_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Serve the web UI (default)
    Serve {
        #[arg(long)]
        host: Option<String>,
        #[arg(long)]
        port: Option<u16>,
        /// Seed for the simulation RNG
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Resolve a single coordinate to a country and exit
    Resolve {
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,
        #[arg(long, allow_negative_numbers = true)]
        lng: f64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = match &cli.config {
        Some(path) => ConfigLoader::new(".").load(path)?,
        None => AppConfig::default(),
    };
    apply_overrides(&cli, &mut config);

    init_tracing(&config.logging.level)?;

    match cli.command {
        None | Some(Command::Serve { .. }) => web::run(WebServerConfig { config }).await,
        Some(Command::Resolve { lat, lng }) => {
            let loader = GeoDataLoader::new(config.geodata.source(), config.geodata.timeout());
            let collection = loader
                .load()
                .await
                .with_context(|| format!("Failed to load geodata from {}", loader.source()))?;
            println!("{}", resolve_name(&collection, lat, lng));
            Ok(())
        }
    }
}

/// Command-line flags win over the config file. A URL clears any configured
/// file so the URL is what gets fetched.
fn apply_overrides(cli: &Cli, config: &mut AppConfig) {
    if let Some(url) = &cli.geojson_url {
        config.geodata.url = url.clone();
        config.geodata.path = None;
    }
    if let Some(path) = &cli.geojson_file {
        config.geodata.path = Some(path.clone());
    }
    if let Some(Command::Serve { host, port, seed }) = &cli.command {
        if let Some(host) = host {
            config.server.host = host.clone();
        }
        if let Some(port) = port {
            config.server.port = *port;
        }
        if seed.is_some() {
            config.simulation.seed = *seed;
        }
    }
}

fn resolve_name(collection: &CountryCollection, lat: f64, lng: f64) -> String {
    PointResolver::new()
        .find(collection, GeoPoint::new(lng, lat))
        .map(|country| country.name.clone())
        .unwrap_or_else(|| "none".to_string())
}

fn init_tracing(default_level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .context("invalid log level")?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .map_err(|err| anyhow::anyhow!("failed to install tracing subscriber: {err}"))
}
