use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use skycast::api::ApiState;
use skycast::config::LoggingConfig;
use skycast::{
    ConfiguredPosition, Dashboard, LocationQuery, OpenWeatherIcons, SkycastConfig,
    TerminalDisplay, UpdateOutcome, WeatherService, web,
};

#[derive(Parser)]
#[command(name = "skycast")]
#[command(author, version, about = "Current weather and a five-day forecast preview", long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file (default: <config dir>/skycast/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show weather for a place name or "lat,lon"
    Weather {
        /// Place name, e.g. "Paris" or "52.52,13.40"
        location: Option<String>,

        /// Latitude in decimal degrees
        #[arg(long, requires = "lon", conflicts_with = "location", allow_negative_numbers = true)]
        lat: Option<f64>,

        /// Longitude in decimal degrees
        #[arg(long, requires = "lat", allow_negative_numbers = true)]
        lon: Option<f64>,
    },

    /// Show weather at the configured position
    Local,

    /// Serve weather lookups over HTTP
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,
    },
}

fn init_tracing(logging: &LoggingConfig, verbose: bool) {
    let level = if verbose { "debug" } else { logging.level.as_str() };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("skycast={level}")));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if logging.format == "json" {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let config = SkycastConfig::load_from_path(cli.config.clone())
        .context("Failed to load configuration")?;
    init_tracing(&config.logging, cli.verbose);

    tracing::debug!(
        base_url = %config.weather.base_url,
        timezone = %config.display.timezone,
        forecast_limit = config.display.forecast_limit,
        "Configuration loaded"
    );

    let convention = config.display.day_convention()?;
    let service = WeatherService::new(&config.weather)?;

    let dashboard = Dashboard::new(
        service.clone(),
        Arc::new(TerminalDisplay),
        Arc::new(OpenWeatherIcons),
        convention,
        config.display.forecast_limit,
    );

    let outcome = match cli.command {
        Commands::Weather {
            location: Some(location),
            ..
        } => dashboard.search_parsed(&location).await,
        Commands::Weather {
            lat: Some(lat),
            lon: Some(lon),
            ..
        } => {
            skycast::LocationParser::validate_coordinates(lat, lon)?;
            dashboard
                .update(LocationQuery::by_coordinates(lat, lon))
                .await
        }
        Commands::Weather { .. } => {
            anyhow::bail!("Provide a location or both --lat and --lon");
        }
        Commands::Local => {
            let provider = ConfiguredPosition::new(config.location.position());
            dashboard.update_from_geolocation(&provider).await
        }
        Commands::Serve { port } => {
            let state = ApiState {
                service,
                icons: Arc::new(OpenWeatherIcons),
                convention,
                forecast_limit: config.display.forecast_limit,
            };
            web::run(port, state).await?;
            return Ok(ExitCode::SUCCESS);
        }
    };

    Ok(match outcome {
        UpdateOutcome::Displayed => ExitCode::SUCCESS,
        UpdateOutcome::Ignored => {
            eprintln!("Location cannot be empty");
            ExitCode::from(2)
        }
        UpdateOutcome::Failed(_) | UpdateOutcome::Superseded => ExitCode::FAILURE,
    })
}
