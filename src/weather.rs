//! Weather aggregation over the OpenWeatherMap current and forecast endpoints
//!
//! Both endpoints are always fetched as a pair: the service issues the two
//! requests concurrently and returns a complete [`WeatherSnapshot`] or a single
//! classified error, never a partial result.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::SkycastError;
use crate::config::WeatherConfig;
use crate::models::{CurrentConditions, LocationQuery, WeatherSnapshot};
use crate::request::{EndpointKind, RequestBuilder, redact};

/// Failure of a single HTTP GET, before it is classified for the caller
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// The server answered with a non-success status
    #[error("HTTP status {status}")]
    Status { status: u16 },

    /// No usable response arrived (connect, timeout, body read)
    #[error("transport error: {0}")]
    Transport(String),
}

/// Source of raw response bodies for endpoint URLs
#[async_trait]
pub trait WeatherSource: Send + Sync {
    /// GET `url` and return the body of a success response
    async fn get(&self, url: &str) -> Result<String, FetchError>;
}

/// reqwest-backed [`WeatherSource`]
#[derive(Debug, Clone)]
pub struct HttpWeatherSource {
    client: Client,
}

impl HttpWeatherSource {
    pub fn new(config: &WeatherConfig) -> Result<Self, SkycastError> {
        let timeout = Duration::from_secs(config.timeout_seconds.into());

        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("skycast/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| SkycastError::config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl WeatherSource for HttpWeatherSource {
    #[instrument(skip(self, url), fields(url = %redact(url)))]
    async fn get(&self, url: &str) -> Result<String, FetchError> {
        let start_time = Instant::now();

        let response = self.client.get(url).send().await.map_err(|e| {
            let e = e.without_url();
            warn!(
                "Network error after {:.3}s: {}",
                start_time.elapsed().as_secs_f64(),
                e
            );
            FetchError::Transport(e.to_string())
        })?;

        let status = response.status();
        debug!(
            "HTTP response received: {} in {:.3}s",
            status,
            start_time.elapsed().as_secs_f64()
        );

        if !status.is_success() {
            warn!(
                "API request failed with status: {} - {}",
                status,
                status.canonical_reason().unwrap_or("Unknown error")
            );
            return Err(FetchError::Status {
                status: status.as_u16(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| FetchError::Transport(e.without_url().to_string()))?;

        let total_duration = start_time.elapsed();
        if total_duration.as_secs() > 5 {
            warn!(
                "Slow API response detected: {:.3}s",
                total_duration.as_secs_f64()
            );
        }

        Ok(body)
    }
}

/// Fetches current conditions and forecast together
#[derive(Clone)]
pub struct WeatherService {
    requests: RequestBuilder,
    source: Arc<dyn WeatherSource>,
}

impl std::fmt::Debug for WeatherService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeatherService")
            .field("requests", &self.requests)
            .finish_non_exhaustive()
    }
}

impl WeatherService {
    /// Create a service talking HTTP to the configured endpoint
    pub fn new(config: &WeatherConfig) -> Result<Self, SkycastError> {
        let source = HttpWeatherSource::new(config)?;
        Ok(Self::with_source(
            RequestBuilder::from_config(config),
            Arc::new(source),
        ))
    }

    #[must_use]
    pub fn with_source(requests: RequestBuilder, source: Arc<dyn WeatherSource>) -> Self {
        Self { requests, source }
    }

    /// Fetch both endpoints concurrently and combine them.
    ///
    /// Both requests are in flight before either completes and both settle
    /// before this returns. When both fail, the current-conditions error is
    /// reported, so an unknown location is always `NotFound`.
    #[instrument(skip(self, query), fields(query = %query))]
    pub async fn fetch_snapshot(
        &self,
        query: &LocationQuery,
    ) -> Result<WeatherSnapshot, SkycastError> {
        let start_time = Instant::now();

        let (current, forecast) = tokio::join!(
            self.fetch_endpoint::<openweather::CurrentResponse>(EndpointKind::Current, query),
            self.fetch_endpoint::<openweather::ForecastResponse>(EndpointKind::Forecast, query),
        );

        let current = CurrentConditions::try_from(current?)?;
        let forecast = forecast?.into_samples()?;

        info!(
            "Retrieved weather for {} with {} forecast samples in {:.3}s",
            current.format_place(),
            forecast.len(),
            start_time.elapsed().as_secs_f64()
        );

        Ok(WeatherSnapshot::new(current, forecast))
    }

    async fn fetch_endpoint<T: DeserializeOwned>(
        &self,
        kind: EndpointKind,
        query: &LocationQuery,
    ) -> Result<T, SkycastError> {
        let url = self.requests.build_url(kind, query);
        debug!("Requesting {}", redact(&url));

        let body = self
            .source
            .get(&url)
            .await
            .map_err(|e| classify(kind, query, e))?;

        serde_json::from_str(&body).map_err(|e| {
            warn!("Failed to parse {} response: {}", kind.path(), e);
            SkycastError::upstream(format!("Malformed {} response: {e}", kind.path()))
        })
    }
}

/// 404 from the current-conditions endpoint means an unknown location;
/// every other failure is an upstream failure
fn classify(kind: EndpointKind, query: &LocationQuery, error: FetchError) -> SkycastError {
    match (kind, &error) {
        (EndpointKind::Current, FetchError::Status { status: 404 }) => {
            SkycastError::not_found(query.to_string())
        }
        _ => SkycastError::upstream(format!("{} endpoint: {error}", kind.path())),
    }
}

/// OpenWeatherMap response structures and conversion into the domain models
mod openweather {
    use chrono::DateTime;
    use serde::Deserialize;

    use crate::SkycastError;
    use crate::models::{CurrentConditions, ForecastSample};

    /// `/weather` response
    #[derive(Debug, Deserialize)]
    pub struct CurrentResponse {
        pub name: String,
        #[serde(default)]
        pub sys: Sys,
        pub main: Main,
        pub wind: Wind,
        pub weather: Vec<Condition>,
    }

    #[derive(Debug, Default, Deserialize)]
    pub struct Sys {
        pub country: Option<String>,
    }

    #[derive(Debug, Deserialize)]
    pub struct Main {
        pub temp: f64,
        #[serde(default)]
        pub humidity: u8,
        #[serde(default)]
        pub pressure: u32,
    }

    #[derive(Debug, Deserialize)]
    pub struct Wind {
        pub speed: f64,
        #[serde(default)]
        pub deg: f64,
    }

    #[derive(Debug, Deserialize)]
    pub struct Condition {
        pub description: String,
        pub icon: String,
    }

    /// `/forecast` response
    #[derive(Debug, Deserialize)]
    pub struct ForecastResponse {
        pub list: Vec<ForecastEntry>,
    }

    #[derive(Debug, Deserialize)]
    pub struct ForecastEntry {
        pub dt: i64,
        pub main: ForecastMain,
        pub weather: Vec<Condition>,
    }

    #[derive(Debug, Deserialize)]
    pub struct ForecastMain {
        pub temp: f64,
    }

    impl TryFrom<CurrentResponse> for CurrentConditions {
        type Error = SkycastError;

        fn try_from(response: CurrentResponse) -> Result<Self, Self::Error> {
            let condition = response.weather.into_iter().next().ok_or_else(|| {
                SkycastError::upstream("Malformed weather response: no weather condition")
            })?;

            Ok(Self {
                place: response.name,
                country: response.sys.country.unwrap_or_default(),
                temperature: response.main.temp,
                humidity: response.main.humidity,
                wind_speed: response.wind.speed,
                wind_direction: response.wind.deg,
                pressure: response.main.pressure,
                condition_code: condition.icon,
                description: condition.description,
            })
        }
    }

    impl ForecastResponse {
        pub fn into_samples(self) -> Result<Vec<ForecastSample>, SkycastError> {
            self.list
                .into_iter()
                .map(|entry| {
                    let timestamp = DateTime::from_timestamp(entry.dt, 0).ok_or_else(|| {
                        SkycastError::upstream(format!(
                            "Malformed forecast response: timestamp {} out of range",
                            entry.dt
                        ))
                    })?;
                    let condition = entry.weather.into_iter().next().ok_or_else(|| {
                        SkycastError::upstream("Malformed forecast response: no weather condition")
                    })?;
                    Ok(ForecastSample {
                        timestamp,
                        temperature: entry.main.temp,
                        condition_code: condition.icon,
                        description: condition.description,
                    })
                })
                .collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    const CURRENT_BODY: &str = r#"{
        "name": "Berlin",
        "sys": {"country": "DE"},
        "main": {"temp": 3.7, "humidity": 81, "pressure": 1012},
        "wind": {"speed": 4.1, "deg": 250},
        "weather": [{"id": 803, "main": "Clouds", "description": "broken clouds", "icon": "04d"}]
    }"#;

    const FORECAST_BODY: &str = r#"{
        "cod": "200",
        "list": [
            {"dt": 1705312800, "main": {"temp": 2.0}, "weather": [{"description": "light snow", "icon": "13d"}]},
            {"dt": 1705323600, "main": {"temp": 1.5}, "weather": [{"description": "overcast clouds", "icon": "04n"}]}
        ]
    }"#;

    /// Answers by endpoint path and records every requested URL
    struct FakeSource {
        responses: HashMap<&'static str, Result<String, FetchError>>,
        requested: Mutex<Vec<String>>,
    }

    impl FakeSource {
        fn new(
            current: Result<&str, FetchError>,
            forecast: Result<&str, FetchError>,
        ) -> Arc<Self> {
            let responses = HashMap::from([
                ("/weather?", current.map(str::to_string)),
                ("/forecast?", forecast.map(str::to_string)),
            ]);
            Arc::new(Self {
                responses,
                requested: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl WeatherSource for FakeSource {
        async fn get(&self, url: &str) -> Result<String, FetchError> {
            self.requested.lock().unwrap().push(url.to_string());
            self.responses
                .iter()
                .find(|(path, _)| url.contains(*path))
                .map(|(_, response)| response.clone())
                .unwrap_or(Err(FetchError::Status { status: 400 }))
        }
    }

    /// Holds each request until both endpoints have been asked
    struct RendezvousSource {
        arrived: tokio::sync::Barrier,
    }

    #[async_trait]
    impl WeatherSource for RendezvousSource {
        async fn get(&self, url: &str) -> Result<String, FetchError> {
            self.arrived.wait().await;
            if url.contains("/forecast?") {
                Ok(FORECAST_BODY.to_string())
            } else {
                Ok(CURRENT_BODY.to_string())
            }
        }
    }

    fn service(source: Arc<FakeSource>) -> WeatherService {
        WeatherService::with_source(
            RequestBuilder::new("http://weather.test", "test_key_123"),
            source,
        )
    }

    #[tokio::test]
    async fn test_fetch_snapshot_combines_both_endpoints() {
        let source = FakeSource::new(Ok(CURRENT_BODY), Ok(FORECAST_BODY));
        let snapshot = service(source.clone())
            .fetch_snapshot(&LocationQuery::by_name("Berlin"))
            .await
            .unwrap();

        assert_eq!(snapshot.current.place, "Berlin");
        assert_eq!(snapshot.current.country, "DE");
        assert_eq!(snapshot.current.humidity, 81);
        assert_eq!(snapshot.current.condition_code, "04d");
        assert_eq!(snapshot.forecast.len(), 2);
        assert_eq!(snapshot.forecast[0].timestamp.timestamp(), 1_705_312_800);
        assert_eq!(snapshot.forecast[1].description, "overcast clouds");

        let requested = source.requested.lock().unwrap();
        assert_eq!(requested.len(), 2);
        assert!(requested.iter().all(|url| url.contains("q=Berlin")));
    }

    #[tokio::test]
    async fn test_both_requests_are_in_flight_together() {
        let service = WeatherService::with_source(
            RequestBuilder::new("http://weather.test", "test_key_123"),
            Arc::new(RendezvousSource {
                arrived: tokio::sync::Barrier::new(2),
            }),
        );

        // one request at a time would wait on the barrier forever
        let snapshot = tokio::time::timeout(
            std::time::Duration::from_secs(1),
            service.fetch_snapshot(&LocationQuery::by_name("Berlin")),
        )
        .await
        .expect("requests were not issued concurrently")
        .unwrap();

        assert_eq!(snapshot.current.place, "Berlin");
        assert_eq!(snapshot.forecast.len(), 2);
    }

    #[tokio::test]
    async fn test_current_not_found_wins_over_forecast_success() {
        let source = FakeSource::new(Err(FetchError::Status { status: 404 }), Ok(FORECAST_BODY));
        let err = service(source)
            .fetch_snapshot(&LocationQuery::by_name("Atlantis"))
            .await
            .unwrap_err();
        assert!(matches!(err, SkycastError::NotFound { ref location } if location == "Atlantis"));
    }

    #[tokio::test]
    async fn test_forecast_not_found_is_upstream_failure() {
        let source = FakeSource::new(Ok(CURRENT_BODY), Err(FetchError::Status { status: 404 }));
        let err = service(source)
            .fetch_snapshot(&LocationQuery::by_name("Berlin"))
            .await
            .unwrap_err();
        assert!(matches!(err, SkycastError::UpstreamFailure { .. }));
    }

    #[tokio::test]
    async fn test_any_failure_yields_no_snapshot() {
        let failures = [
            FetchError::Status { status: 500 },
            FetchError::Status { status: 401 },
            FetchError::Status { status: 429 },
            FetchError::Transport("connection refused".to_string()),
        ];

        for failure in failures {
            let on_current = FakeSource::new(Err(failure.clone()), Ok(FORECAST_BODY));
            let on_forecast = FakeSource::new(Ok(CURRENT_BODY), Err(failure.clone()));
            for source in [on_current, on_forecast] {
                let result = service(source)
                    .fetch_snapshot(&LocationQuery::by_coordinates(1.0, 2.0))
                    .await;
                assert!(
                    matches!(result, Err(SkycastError::UpstreamFailure { .. })),
                    "{failure:?} produced {result:?}"
                );
            }
        }
    }

    #[tokio::test]
    async fn test_malformed_body_is_upstream_failure() {
        let source = FakeSource::new(Ok("<html>oops</html>"), Ok(FORECAST_BODY));
        let err = service(source)
            .fetch_snapshot(&LocationQuery::by_name("Berlin"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Malformed weather response"));

        let no_conditions = r#"{"name": "X", "main": {"temp": 1.0}, "wind": {"speed": 0.0}, "weather": []}"#;
        let source = FakeSource::new(Ok(no_conditions), Ok(FORECAST_BODY));
        let err = service(source)
            .fetch_snapshot(&LocationQuery::by_name("X"))
            .await
            .unwrap_err();
        assert!(matches!(err, SkycastError::UpstreamFailure { .. }));
    }

    #[test]
    fn test_classify() {
        let query = LocationQuery::by_name("Nowhere");
        let not_found = FetchError::Status { status: 404 };
        assert!(matches!(
            classify(EndpointKind::Current, &query, not_found.clone()),
            SkycastError::NotFound { .. }
        ));
        assert!(matches!(
            classify(EndpointKind::Forecast, &query, not_found),
            SkycastError::UpstreamFailure { .. }
        ));
        assert!(matches!(
            classify(EndpointKind::Current, &query, FetchError::Status { status: 503 }),
            SkycastError::UpstreamFailure { .. }
        ));
    }
}
