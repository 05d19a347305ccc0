//! Forecast samples, the combined snapshot and distinct-day reduction

use std::collections::HashSet;

use chrono::{DateTime, Locale, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use super::CurrentConditions;
use crate::SkycastError;

/// One forecast data point
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ForecastSample {
    /// Time the sample is valid for
    pub timestamp: DateTime<Utc>,
    /// Temperature in Celsius
    pub temperature: f64,
    /// Weather condition icon code, e.g. "10n"
    pub condition_code: String,
    pub description: String,
}

/// Current conditions plus the forecast samples for the same query
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct WeatherSnapshot {
    pub current: CurrentConditions,
    /// Forecast samples in chronological order
    pub forecast: Vec<ForecastSample>,
}

impl WeatherSnapshot {
    #[must_use]
    pub fn new(current: CurrentConditions, forecast: Vec<ForecastSample>) -> Self {
        Self { current, forecast }
    }

    /// One sample per calendar day, at most `limit` of them
    #[must_use]
    pub fn forecast_preview(&self, limit: usize, convention: &DayConvention) -> Vec<ForecastSample> {
        reduce_by_day(&self.forecast, limit, convention)
    }

    /// Same snapshot with its forecast already reduced
    #[must_use]
    pub fn into_preview(self, limit: usize, convention: &DayConvention) -> Self {
        let forecast = reduce_by_day(&self.forecast, limit, convention);
        Self {
            current: self.current,
            forecast,
        }
    }
}

/// Timezone and locale used for every day boundary and date label.
///
/// Day reduction and date display must agree on where a day starts, so both
/// take the same convention instead of reading the host's defaults.
#[derive(Debug, Clone, Copy)]
pub struct DayConvention {
    pub timezone: Tz,
    pub locale: Locale,
}

impl Default for DayConvention {
    fn default() -> Self {
        Self {
            timezone: Tz::UTC,
            locale: Locale::en_US,
        }
    }
}

impl DayConvention {
    #[must_use]
    pub fn new(timezone: Tz, locale: Locale) -> Self {
        Self { timezone, locale }
    }

    /// Build a convention from an IANA timezone name and a POSIX locale name
    pub fn parse(timezone: &str, locale: &str) -> Result<Self, SkycastError> {
        let tz = timezone
            .parse::<Tz>()
            .map_err(|e| SkycastError::config(format!("Unknown timezone '{timezone}': {e}")))?;
        let locale = Locale::try_from(locale)
            .map_err(|_| SkycastError::config(format!("Unknown locale '{locale}'")))?;
        Ok(Self::new(tz, locale))
    }

    /// Calendar day the timestamp falls on in this convention's timezone
    #[must_use]
    pub fn calendar_day(&self, timestamp: DateTime<Utc>) -> NaiveDate {
        timestamp.with_timezone(&self.timezone).date_naive()
    }

    /// Short weekday label, e.g. "Mon"
    #[must_use]
    pub fn weekday_label(&self, timestamp: DateTime<Utc>) -> String {
        timestamp
            .with_timezone(&self.timezone)
            .format_localized("%a", self.locale)
            .to_string()
    }

    /// Short date label, e.g. "Mon, Jan 15"
    #[must_use]
    pub fn date_label(&self, timestamp: DateTime<Utc>) -> String {
        timestamp
            .with_timezone(&self.timezone)
            .format_localized("%a, %b %d", self.locale)
            .to_string()
    }
}

/// Keep the first sample of each calendar day, stopping after `limit` days.
///
/// Input order is preserved. Samples are expected in chronological order, but
/// the distinct-day guarantee holds for any order.
#[must_use]
pub fn reduce_by_day(
    samples: &[ForecastSample],
    limit: usize,
    convention: &DayConvention,
) -> Vec<ForecastSample> {
    let capacity = limit.min(samples.len());
    let mut seen_days: HashSet<NaiveDate> = HashSet::with_capacity(capacity);
    let mut kept = Vec::with_capacity(capacity);

    for sample in samples {
        if kept.len() >= limit {
            break;
        }
        if seen_days.insert(convention.calendar_day(sample.timestamp)) {
            kept.push(sample.clone());
        }
    }

    kept
}
