//! Configuration management for `skycast`
//!
//! Handles loading configuration from files, environment variables,
//! and provides validation for all configuration settings.

use crate::SkycastError;
use crate::models::DayConvention;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Number of forecast days shown in the preview unless configured otherwise
pub const FORECAST_LIMIT: usize = 5;

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkycastConfig {
    /// Weather API configuration
    #[serde(default)]
    pub weather: WeatherConfig,
    /// Display conventions
    #[serde(default)]
    pub display: DisplayConfig,
    /// Fixed position handed out by the configured geolocation provider
    #[serde(default)]
    pub location: LocationConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Weather API configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    /// OpenWeatherMap API key, sent as `appid`
    #[serde(default)]
    pub api_key: String,
    /// Base URL for weather API
    #[serde(default = "default_weather_base_url")]
    pub base_url: String,
    /// Request timeout in seconds
    #[serde(default = "default_weather_timeout")]
    pub timeout_seconds: u32,
}

/// How dates are derived and labelled
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Maximum number of days in the forecast preview
    #[serde(default = "default_forecast_limit")]
    pub forecast_limit: usize,
    /// IANA timezone used to split samples into calendar days
    #[serde(default = "default_timezone")]
    pub timezone: String,
    /// Locale for weekday and month labels, e.g. `en_US`
    #[serde(default = "default_locale")]
    pub locale: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LocationConfig {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty or json)
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
fn default_weather_base_url() -> String {
    "https://api.openweathermap.org/data/2.5".to_string()
}

fn default_weather_timeout() -> u32 {
    30
}

fn default_forecast_limit() -> usize {
    FORECAST_LIMIT
}

fn default_timezone() -> String {
    "UTC".to_string()
}

fn default_locale() -> String {
    "en_US".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_weather_base_url(),
            timeout_seconds: default_weather_timeout(),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            forecast_limit: default_forecast_limit(),
            timezone: default_timezone(),
            locale: default_locale(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Default for SkycastConfig {
    fn default() -> Self {
        Self {
            weather: WeatherConfig::default(),
            display: DisplayConfig::default(),
            location: LocationConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl DisplayConfig {
    /// Resolve the configured timezone and locale names
    pub fn day_convention(&self) -> std::result::Result<DayConvention, SkycastError> {
        DayConvention::parse(&self.timezone, &self.locale)
    }
}

impl LocationConfig {
    #[must_use]
    pub fn position(&self) -> Option<(f64, f64)> {
        self.latitude.zip(self.longitude)
    }
}

impl SkycastConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path(None)
    }

    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        // Load from file if path is provided or use default location
        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path().unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // SKYCAST_WEATHER__API_KEY -> weather.api_key
        builder = builder.add_source(
            Environment::with_prefix("SKYCAST")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: SkycastConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("skycast").join("config.toml"))
    }

    /// Apply default values to missing configuration fields
    pub fn apply_defaults(&mut self) {
        if self.weather.base_url.is_empty() {
            self.weather.base_url = default_weather_base_url();
        }
        if self.weather.timeout_seconds == 0 {
            self.weather.timeout_seconds = default_weather_timeout();
        }
        if self.display.forecast_limit == 0 {
            self.display.forecast_limit = default_forecast_limit();
        }
        if self.display.timezone.is_empty() {
            self.display.timezone = default_timezone();
        }
        if self.display.locale.is_empty() {
            self.display.locale = default_locale();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_api_key()?;
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    /// Validate the API credential
    pub fn validate_api_key(&self) -> Result<()> {
        let api_key = &self.weather.api_key;
        if api_key.is_empty() {
            return Err(SkycastError::config(
                "Weather API key is required. Set weather.api_key or SKYCAST_WEATHER__API_KEY.",
            )
            .into());
        }

        if api_key.len() < 8 {
            return Err(SkycastError::config(
                "Weather API key appears to be invalid (too short). Please check your API key.",
            )
            .into());
        }

        if api_key.len() > 100 {
            return Err(SkycastError::config(
                "Weather API key appears to be invalid (too long). Please check your API key.",
            )
            .into());
        }

        Ok(())
    }

    /// Validate numeric configuration ranges
    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.weather.timeout_seconds > 300 {
            return Err(
                SkycastError::config("Weather API timeout cannot exceed 300 seconds").into(),
            );
        }

        // the forecast endpoint returns 40 samples, so more days cannot exist
        if !(1..=40).contains(&self.display.forecast_limit) {
            return Err(SkycastError::config("Forecast limit must be between 1 and 40").into());
        }

        if let Some(latitude) = self.location.latitude
            && !(-90.0..=90.0).contains(&latitude)
        {
            return Err(SkycastError::config(format!(
                "Latitude must be between -90 and 90, got: {latitude}"
            ))
            .into());
        }

        if let Some(longitude) = self.location.longitude
            && !(-180.0..=180.0).contains(&longitude)
        {
            return Err(SkycastError::config(format!(
                "Longitude must be between -180 and 180, got: {longitude}"
            ))
            .into());
        }

        Ok(())
    }

    /// Validate string configuration values
    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(SkycastError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(SkycastError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        if !self.weather.base_url.starts_with("http://")
            && !self.weather.base_url.starts_with("https://")
        {
            return Err(SkycastError::config(
                "Weather API base URL must be a valid HTTP or HTTPS URL",
            )
            .into());
        }

        self.display.day_convention()?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn valid_config() -> SkycastConfig {
        let mut config = SkycastConfig::default();
        config.weather.api_key = "valid_api_key_123".to_string();
        config
    }

    #[test]
    fn test_default_config() {
        let config = SkycastConfig::default();
        assert_eq!(
            config.weather.base_url,
            "https://api.openweathermap.org/data/2.5"
        );
        assert_eq!(config.weather.timeout_seconds, 30);
        assert_eq!(config.display.forecast_limit, 5);
        assert_eq!(config.display.timezone, "UTC");
        assert_eq!(config.logging.level, "info");
        assert!(config.location.position().is_none());
    }

    #[test]
    fn test_config_validation_missing_api_key() {
        let config = SkycastConfig::default();
        let result = config.validate_api_key();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("API key is required"));
    }

    #[test]
    fn test_config_validation_valid() {
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn test_config_validation_invalid_log_level() {
        let mut config = valid_config();
        config.logging.level = "invalid".to_string();
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Invalid log level"));
    }

    #[test]
    fn test_config_validation_numeric_ranges() {
        let mut config = valid_config();
        config.weather.timeout_seconds = 500;
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("timeout cannot exceed"));

        let mut config = valid_config();
        config.display.forecast_limit = 41;
        assert!(config.validate().is_err());

        let mut config = valid_config();
        config.location.latitude = Some(91.0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_unknown_timezone() {
        let mut config = valid_config();
        config.display.timezone = "Mars/Olympus_Mons".to_string();
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("timezone"));
    }

    #[test]
    fn test_apply_defaults_fills_blanks() {
        let mut config = valid_config();
        config.weather.base_url.clear();
        config.display.forecast_limit = 0;
        config.logging.format.clear();
        config.apply_defaults();
        assert_eq!(config.weather.base_url, default_weather_base_url());
        assert_eq!(config.display.forecast_limit, FORECAST_LIMIT);
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join(format!("skycast-test-{}.toml", std::process::id()));
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            r#"
[weather]
api_key = "file_api_key_123"
base_url = "http://localhost:9999"

[display]
forecast_limit = 3
timezone = "Europe/Berlin"

[location]
latitude = 52.52
longitude = 13.405
"#
        )
        .unwrap();

        let config = SkycastConfig::load_from_path(Some(path.clone())).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(config.weather.api_key, "file_api_key_123");
        assert_eq!(config.weather.base_url, "http://localhost:9999");
        assert_eq!(config.display.forecast_limit, 3);
        assert_eq!(config.display.locale, "en_US");
        assert_eq!(config.location.position(), Some((52.52, 13.405)));
    }

    #[test]
    fn test_config_path_generation() {
        if let Some(path) = SkycastConfig::get_config_path() {
            assert!(path.to_string_lossy().contains("skycast"));
            assert!(path.to_string_lossy().contains("config.toml"));
        }
    }
}
