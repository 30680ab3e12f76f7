//! enviro-station — main entry point

use clap::Parser;
use enviro_station::api::{self, AppState};
use enviro_station::clock::SystemTimeSource;
use enviro_station::config::{DriverKind, SensorConfig};
use enviro_station::history::HistoryStore;
use enviro_station::sampling::SamplingCache;
use enviro_station::sensor::{SensorDriver, SimulatedSensor, SysfsSensor};
use enviro_station::{Result, StationConfig};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Environmental telemetry station
#[derive(Parser, Debug)]
#[command(name = "enviro-station")]
#[command(about = "Temperature/humidity telemetry with an HTTP API and per-day history")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    /// Configuration file (TOML)
    #[arg(long, env = "ENVIRO_CONFIG")]
    config: Option<PathBuf>,

    /// Port to listen on (overrides the config file)
    #[arg(short, long, env = "ENVIRO_PORT")]
    port: Option<u16>,

    /// History document path (overrides the config file)
    #[arg(long, env = "ENVIRO_DATA_FILE")]
    data_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,
}

impl Cli {
    /// Initialize logging from the debug flag, RUST_LOG, or the config level
    fn initialize_logging(&self, configured_level: &str) {
        let filter = if self.debug {
            EnvFilter::new("debug")
        } else {
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(configured_level.to_string()))
        };

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().compact())
            .init();
    }
}

fn build_driver(sensor: &SensorConfig) -> Arc<dyn SensorDriver> {
    match sensor.driver {
        DriverKind::Sysfs => Arc::new(SysfsSensor::new(
            sensor.temperature_path.clone(),
            sensor.humidity_path.clone(),
        )),
        DriverKind::Simulated => Arc::new(SimulatedSensor::new()),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = StationConfig::load(cli.config.as_deref())?;
    if let Some(port) = cli.port {
        config.http.port = port;
    }
    if let Some(data_file) = cli.data_file.clone() {
        config.storage.data_file = data_file;
    }

    cli.initialize_logging(&config.logging.level);
    info!("Starting enviro-station v{}", env!("CARGO_PKG_VERSION"));

    let driver = build_driver(&config.sensor);
    info!(
        driver = driver.name(),
        min_interval = ?config.sensor.min_interval,
        on_failure = ?config.sensor.on_failure,
        "Sensor configured"
    );

    let history = Arc::new(HistoryStore::new(config.storage.data_file.clone()));
    info!(document = %history.path().display(), "History store configured");

    let cache = Arc::new(SamplingCache::new(
        driver,
        history.clone(),
        Arc::new(SystemTimeSource::new()),
        config.sensor.min_interval,
    ));

    let state = AppState {
        cache,
        history,
        started_at: Instant::now(),
        on_failure: config.sensor.on_failure,
    };
    let app = api::router(state, config.http.enable_cors);

    let listener = TcpListener::bind((config.http.host.as_str(), config.http.port)).await?;
    info!("HTTP server listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("Shutdown requested");
}
