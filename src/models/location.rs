//! Location queries and parsing of free-text location input

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::SkycastError;

/// What a single weather lookup is about
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LocationQuery {
    /// Place name, e.g. "Berlin" or "Paris,FR"
    ByName(String),
    /// Coordinates in decimal degrees
    ByCoordinates { lat: f64, lon: f64 },
}

impl LocationQuery {
    #[must_use]
    pub fn by_name<S: Into<String>>(name: S) -> Self {
        Self::ByName(name.into())
    }

    #[must_use]
    pub fn by_coordinates(lat: f64, lon: f64) -> Self {
        Self::ByCoordinates { lat, lon }
    }
}

impl fmt::Display for LocationQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ByName(name) => write!(f, "{name}"),
            Self::ByCoordinates { lat, lon } => write!(f, "{lat:.4}, {lon:.4}"),
        }
    }
}

/// Location parsing utilities
pub struct LocationParser;

impl LocationParser {
    /// Parse location input: "lat,lon" pairs become coordinates, anything else a name
    pub fn parse(input: &str) -> Result<LocationQuery, SkycastError> {
        let input = input.trim();

        if input.is_empty() {
            return Err(SkycastError::validation("Location cannot be empty"));
        }

        // a numeric pair is always a coordinate query, in range or not
        if let Some((lat, lon)) = Self::parse_coordinates(input) {
            Self::validate_coordinates(lat, lon)?;
            return Ok(LocationQuery::by_coordinates(lat, lon));
        }

        Ok(LocationQuery::by_name(input))
    }

    /// Parse a numeric pair like "46.8182,8.2275" or "46.8182 8.2275"
    fn parse_coordinates(input: &str) -> Option<(f64, f64)> {
        let parts: Vec<&str> = input
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|s| !s.is_empty())
            .collect();

        match parts.as_slice() {
            [lat, lon] => Some((lat.parse::<f64>().ok()?, lon.parse::<f64>().ok()?)),
            _ => None,
        }
    }

    /// Check coordinate ranges
    pub fn validate_coordinates(lat: f64, lon: f64) -> Result<(), SkycastError> {
        if !(-90.0..=90.0).contains(&lat) {
            return Err(SkycastError::validation(format!(
                "Latitude must be between -90 and 90, got: {lat}"
            )));
        }

        if !(-180.0..=180.0).contains(&lon) {
            return Err(SkycastError::validation(format!(
                "Longitude must be between -180 and 180, got: {lon}"
            )));
        }

        Ok(())
    }
}
