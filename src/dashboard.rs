//! Query cycle: take a location from the user or the host, fetch, display
//!
//! Every query takes a generation ticket when it starts. A result is shown
//! only while its ticket is still the newest, so a slow earlier query can
//! never overwrite the answer to a later one.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, info, warn};

use crate::SkycastError;
use crate::error::LocationUnavailableReason;
use crate::models::{DayConvention, LocationParser, LocationQuery};
use crate::render::{
    DisplayTarget, IconResolver, RenderContext, render_error, render_loading, render_snapshot,
};
use crate::weather::WeatherService;

/// Host-provided position lookup
#[async_trait]
pub trait GeolocationProvider: Send + Sync {
    /// Latitude and longitude in decimal degrees, or `LocationUnavailable`
    async fn current_position(&self) -> Result<(f64, f64), SkycastError>;
}

/// Position taken from configuration; unsupported when none is configured
#[derive(Debug, Clone, Default)]
pub struct ConfiguredPosition {
    position: Option<(f64, f64)>,
}

impl ConfiguredPosition {
    #[must_use]
    pub fn new(position: Option<(f64, f64)>) -> Self {
        Self { position }
    }
}

#[async_trait]
impl GeolocationProvider for ConfiguredPosition {
    async fn current_position(&self) -> Result<(f64, f64), SkycastError> {
        self.position.ok_or_else(|| {
            SkycastError::location_unavailable(LocationUnavailableReason::Unsupported)
        })
    }
}

/// What happened to one query
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The snapshot was rendered and shown
    Displayed,
    /// An error message was shown
    Failed(String),
    /// A newer query started first; nothing was shown
    Superseded,
    /// Blank search input; no query was issued
    Ignored,
}

/// Ties the weather service to a display target
pub struct Dashboard {
    service: WeatherService,
    display: Arc<dyn DisplayTarget>,
    icons: Arc<dyn IconResolver>,
    convention: DayConvention,
    forecast_limit: usize,
    generation: AtomicU64,
}

impl Dashboard {
    pub fn new(
        service: WeatherService,
        display: Arc<dyn DisplayTarget>,
        icons: Arc<dyn IconResolver>,
        convention: DayConvention,
        forecast_limit: usize,
    ) -> Self {
        Self {
            service,
            display,
            icons,
            convention,
            forecast_limit,
            generation: AtomicU64::new(0),
        }
    }

    /// Look up a place typed by the user; blank input is ignored
    pub async fn search(&self, input: &str) -> UpdateOutcome {
        if input.trim().is_empty() {
            debug!("Ignoring empty search input");
            return UpdateOutcome::Ignored;
        }
        self.update(LocationQuery::by_name(input.trim())).await
    }

    /// Like [`search`](Self::search), but "lat,lon" input becomes a coordinate query.
    ///
    /// Out-of-range coordinates are shown as an input error.
    pub async fn search_parsed(&self, input: &str) -> UpdateOutcome {
        if input.trim().is_empty() {
            debug!("Ignoring empty search input");
            return UpdateOutcome::Ignored;
        }
        match LocationParser::parse(input) {
            Ok(query) => self.update(query).await,
            Err(e) => {
                warn!("Rejected search input '{}': {}", input.trim(), e);
                let ticket = self.next_ticket();
                self.show_error(ticket, &e)
            }
        }
    }

    /// Fetch and display weather for `query`
    pub async fn update(&self, query: LocationQuery) -> UpdateOutcome {
        let ticket = self.next_ticket();
        self.run(ticket, query).await
    }

    /// Ask the host for its position, then fetch and display weather there
    pub async fn update_from_geolocation(
        &self,
        provider: &dyn GeolocationProvider,
    ) -> UpdateOutcome {
        let ticket = self.next_ticket();
        match provider.current_position().await {
            Ok((lat, lon)) => {
                info!("Using host position ({:.4}, {:.4})", lat, lon);
                self.run(ticket, LocationQuery::by_coordinates(lat, lon)).await
            }
            Err(e) => {
                warn!("Geolocation failed: {}", e);
                self.show_error(ticket, &e)
            }
        }
    }

    fn next_ticket(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn is_current(&self, ticket: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == ticket
    }

    async fn run(&self, ticket: u64, query: LocationQuery) -> UpdateOutcome {
        // a slow geolocation lookup may already have been overtaken
        if !self.is_current(ticket) {
            debug!("Query {} for {} superseded before it started", ticket, query);
            return UpdateOutcome::Superseded;
        }
        debug!("Query {} started for {}", ticket, query);
        self.display.show(&render_loading());

        let result = self.service.fetch_snapshot(&query).await;

        if !self.is_current(ticket) {
            debug!("Query {} for {} superseded, dropping its result", ticket, query);
            return UpdateOutcome::Superseded;
        }

        match result {
            Ok(snapshot) => {
                let ctx = RenderContext {
                    convention: &self.convention,
                    icons: self.icons.as_ref(),
                };
                let content = render_snapshot(&snapshot, Utc::now(), self.forecast_limit, &ctx);
                self.display.show(&content);
                UpdateOutcome::Displayed
            }
            Err(e) => {
                warn!("Weather lookup for {} failed: {}", query, e);
                self.show_error(ticket, &e)
            }
        }
    }

    fn show_error(&self, ticket: u64, error: &SkycastError) -> UpdateOutcome {
        if !self.is_current(ticket) {
            return UpdateOutcome::Superseded;
        }
        let message = error.user_message();
        self.display.show(&render_error(&message));
        UpdateOutcome::Failed(message)
    }
}
