//! Data models for skycast
//!
//! This module contains the core domain models organized by concern:
//! - Location: what the user asked for
//! - Weather: current conditions at that location
//! - Forecast: forecast samples, the combined snapshot and day reduction

pub mod forecast;
pub mod location;
pub mod weather;

// Re-export all public types for convenient access
pub use forecast::{DayConvention, ForecastSample, WeatherSnapshot, reduce_by_day};
pub use location::{LocationParser, LocationQuery};
pub use weather::CurrentConditions;
