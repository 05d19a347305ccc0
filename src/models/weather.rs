//! Current conditions model and display methods

use serde::{Deserialize, Serialize};

const COMPASS_POINTS: [&str; 16] = [
    "N", "NNE", "NE", "ENE", "E", "ESE", "SE", "SSE", "S", "SSW", "SW", "WSW", "W", "WNW", "NW",
    "NNW",
];

/// Observed weather at the queried location
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CurrentConditions {
    /// Place name as resolved by the weather service
    pub place: String,
    /// Country code (ISO 3166-1 alpha-2), empty when the service omits it
    pub country: String,
    /// Temperature in Celsius
    pub temperature: f64,
    /// Relative humidity in percent
    pub humidity: u8,
    /// Wind speed in m/s
    pub wind_speed: f64,
    /// Wind direction in degrees (0-360, where 0/360 is North)
    pub wind_direction: f64,
    /// Atmospheric pressure in hPa
    pub pressure: u32,
    /// Weather condition icon code, e.g. "04d"
    pub condition_code: String,
    /// Human-readable description of weather conditions
    pub description: String,
}

/// Convert wind direction from degrees to one of 16 compass points
#[must_use]
pub fn wind_direction_to_cardinal(degrees: f64) -> &'static str {
    let sector = (degrees.rem_euclid(360.0) / 22.5).round() as usize % COMPASS_POINTS.len();
    COMPASS_POINTS[sector]
}

impl CurrentConditions {
    /// Temperature rounded to whole degrees
    #[must_use]
    pub fn format_temperature(&self) -> String {
        format!("{}°C", round_display(self.temperature))
    }

    /// Wind speed rounded to whole m/s with its compass direction
    #[must_use]
    pub fn format_wind(&self) -> String {
        format!(
            "{} m/s {}",
            round_display(self.wind_speed),
            wind_direction_to_cardinal(self.wind_direction)
        )
    }

    #[must_use]
    pub fn format_humidity(&self) -> String {
        format!("{}%", self.humidity)
    }

    /// Format atmospheric pressure with unit
    #[must_use]
    pub fn format_pressure(&self) -> String {
        format!("{} hPa", self.pressure)
    }

    /// "Place, CC", or just the place when no country is known
    #[must_use]
    pub fn format_place(&self) -> String {
        if self.country.is_empty() {
            self.place.clone()
        } else {
            format!("{}, {}", self.place, self.country)
        }
    }
}

/// Whole-number display value, halves rounded up (-2.5 becomes -2)
pub(crate) fn round_display(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}
