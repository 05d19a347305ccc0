//! Text fragments for a weather snapshot and the collaborators that show them

use std::fmt::{self, Display};
use std::io::Write;

use chrono::{DateTime, Utc};

use crate::models::weather::round_display;
use crate::models::{CurrentConditions, DayConvention, ForecastSample, WeatherSnapshot};

pub const LOADING_MESSAGE: &str = "Fetching weather data...";

/// Maps a condition code to something displayable
pub trait IconResolver: Send + Sync {
    fn icon_for(&self, condition_code: &str) -> String;
}

/// OpenWeatherMap's hosted condition icons
#[derive(Debug, Clone, Default)]
pub struct OpenWeatherIcons;

impl IconResolver for OpenWeatherIcons {
    fn icon_for(&self, condition_code: &str) -> String {
        format!("https://openweathermap.org/img/wn/{condition_code}@2x.png")
    }
}

/// Where finished fragments end up
pub trait DisplayTarget: Send + Sync {
    /// Replace whatever is currently displayed with `content`
    fn show(&self, content: &str);
}

/// Writes each fragment to stdout
#[derive(Debug, Default)]
pub struct TerminalDisplay;

impl DisplayTarget for TerminalDisplay {
    fn show(&self, content: &str) {
        let mut stdout = std::io::stdout().lock();
        if let Err(e) = writeln!(stdout, "{content}") {
            tracing::error!("Failed to write to stdout: {}", e);
        }
    }
}

/// Everything a fragment needs to turn data into text
pub struct RenderContext<'a> {
    pub convention: &'a DayConvention,
    pub icons: &'a dyn IconResolver,
}

struct CurrentView<'a> {
    current: &'a CurrentConditions,
    now: DateTime<Utc>,
    ctx: &'a RenderContext<'a>,
}

impl Display for CurrentView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let current = self.current;
        writeln!(
            f,
            "📍 {}   {}",
            current.format_place(),
            self.ctx.convention.date_label(self.now)
        )?;
        writeln!(
            f,
            "   {}  {}",
            current.format_temperature(),
            current.description
        )?;
        writeln!(
            f,
            "   🖼️ {}",
            self.ctx.icons.icon_for(&current.condition_code)
        )?;
        writeln!(f, "   💧 {}  Humidity", current.format_humidity())?;
        writeln!(f, "   🌬️ {}", current.format_wind())?;
        writeln!(f, "   🧭 {}  Pressure", current.format_pressure())
    }
}

struct ForecastPreview<'a> {
    samples: &'a [ForecastSample],
    ctx: &'a RenderContext<'a>,
}

impl Display for ForecastPreview<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "📅 Forecast")?;
        for sample in self.samples {
            writeln!(
                f,
                "   {}   {:>4}°C   {}",
                self.ctx.convention.date_label(sample.timestamp),
                round_display(sample.temperature),
                self.ctx.icons.icon_for(&sample.condition_code)
            )?;
        }
        Ok(())
    }
}

/// Current conditions fragment, dated `now`
#[must_use]
pub fn render_current(
    current: &CurrentConditions,
    now: DateTime<Utc>,
    ctx: &RenderContext<'_>,
) -> String {
    CurrentView { current, now, ctx }.to_string()
}

/// Forecast preview fragment, one line per sample as given
#[must_use]
pub fn render_forecast_preview(samples: &[ForecastSample], ctx: &RenderContext<'_>) -> String {
    ForecastPreview { samples, ctx }.to_string()
}

/// Both fragments, the forecast reduced to `forecast_limit` distinct days
#[must_use]
pub fn render_snapshot(
    snapshot: &WeatherSnapshot,
    now: DateTime<Utc>,
    forecast_limit: usize,
    ctx: &RenderContext<'_>,
) -> String {
    let preview = snapshot.forecast_preview(forecast_limit, ctx.convention);
    let mut out = render_current(&snapshot.current, now, ctx);
    out.push('\n');
    out.push_str(&render_forecast_preview(&preview, ctx));
    out
}

#[must_use]
pub fn render_loading() -> String {
    format!("⏳ {LOADING_MESSAGE}")
}

#[must_use]
pub fn render_error(message: &str) -> String {
    format!("⚠️ {message}")
}
