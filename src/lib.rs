//! `skycast` - current conditions and a five-day forecast preview
//!
//! This library fetches the OpenWeatherMap current-conditions and forecast
//! endpoints as one combined lookup, reduces the forecast to one sample per
//! calendar day and renders both into display fragments.

pub mod api;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod models;
pub mod render;
pub mod request;
pub mod weather;
pub mod web;

// Re-export core types for public API
pub use config::{FORECAST_LIMIT, SkycastConfig};
pub use dashboard::{ConfiguredPosition, Dashboard, GeolocationProvider, UpdateOutcome};
pub use error::{LocationUnavailableReason, SkycastError};
pub use models::{
    CurrentConditions, DayConvention, ForecastSample, LocationParser, LocationQuery,
    WeatherSnapshot, reduce_by_day,
};
pub use render::{DisplayTarget, IconResolver, OpenWeatherIcons, TerminalDisplay};
pub use request::{EndpointKind, RequestBuilder};
pub use weather::{FetchError, HttpWeatherSource, WeatherService, WeatherSource};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, SkycastError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
