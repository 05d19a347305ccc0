//! URL construction for the OpenWeatherMap endpoints

use crate::config::WeatherConfig;
use crate::models::LocationQuery;

/// Which endpoint a URL targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointKind {
    /// Current conditions (`/weather`)
    Current,
    /// 5 day / 3 hour forecast (`/forecast`)
    Forecast,
}

impl EndpointKind {
    #[must_use]
    pub fn path(self) -> &'static str {
        match self {
            Self::Current => "weather",
            Self::Forecast => "forecast",
        }
    }
}

/// Builds endpoint URLs from an injected base URL and API key
#[derive(Clone)]
pub struct RequestBuilder {
    base_url: String,
    api_key: String,
}

impl std::fmt::Debug for RequestBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestBuilder")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl RequestBuilder {
    pub fn new<B: Into<String>, K: Into<String>>(base_url: B, api_key: K) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    #[must_use]
    pub fn from_config(config: &WeatherConfig) -> Self {
        Self::new(config.base_url.clone(), config.api_key.clone())
    }

    /// Complete URL for `kind`, always carrying `appid` and `units=metric`
    #[must_use]
    pub fn build_url(&self, kind: EndpointKind, query: &LocationQuery) -> String {
        let location = match query {
            LocationQuery::ByName(name) => format!("q={}", urlencoding::encode(name)),
            LocationQuery::ByCoordinates { lat, lon } => format!("lat={lat}&lon={lon}"),
        };

        format!(
            "{}/{}?{}&appid={}&units=metric",
            self.base_url,
            kind.path(),
            location,
            urlencoding::encode(&self.api_key)
        )
    }
}

/// URL with the credential value removed, for logging
#[must_use]
pub fn redact(url: &str) -> String {
    match url.split_once("appid=") {
        Some((head, tail)) => {
            let rest = tail.find('&').map_or("", |i| &tail[i..]);
            format!("{head}appid=***{rest}")
        }
        None => url.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn builder() -> RequestBuilder {
        RequestBuilder::new("https://api.example.test/data/2.5", "secret_key_1")
    }

    #[test]
    fn test_current_by_name() {
        let url = builder().build_url(EndpointKind::Current, &LocationQuery::by_name("Berlin"));
        assert_eq!(
            url,
            "https://api.example.test/data/2.5/weather?q=Berlin&appid=secret_key_1&units=metric"
        );
    }

    #[test]
    fn test_forecast_by_coordinates() {
        let url = builder().build_url(
            EndpointKind::Forecast,
            &LocationQuery::by_coordinates(52.52, -13.405),
        );
        assert_eq!(
            url,
            "https://api.example.test/data/2.5/forecast?lat=52.52&lon=-13.405&appid=secret_key_1&units=metric"
        );
    }

    #[test]
    fn test_place_names_are_percent_encoded() {
        let url = builder().build_url(
            EndpointKind::Current,
            &LocationQuery::by_name("São Paulo&appid=stolen"),
        );
        assert!(url.contains("q=S%C3%A3o%20Paulo%26appid%3Dstolen&"));
        assert_eq!(url.matches("appid=").count(), 1);
    }

    #[test]
    fn test_trailing_slash_on_base_url() {
        let builder = RequestBuilder::new("http://localhost:8080/", "secret_key_1");
        let url = builder.build_url(EndpointKind::Current, &LocationQuery::by_name("Oslo"));
        assert!(url.starts_with("http://localhost:8080/weather?"));
    }

    #[rstest]
    #[case(EndpointKind::Current, LocationQuery::by_name("Lima"))]
    #[case(EndpointKind::Forecast, LocationQuery::by_name("Lima"))]
    #[case(EndpointKind::Current, LocationQuery::by_coordinates(1.5, 2.5))]
    #[case(EndpointKind::Forecast, LocationQuery::by_coordinates(-1.5, 0.0))]
    fn test_every_url_has_exactly_one_location_form(
        #[case] kind: EndpointKind,
        #[case] query: LocationQuery,
    ) {
        let url = builder().build_url(kind, &query);
        let by_name = url.contains("q=");
        let by_coordinates = url.contains("lat=") && url.contains("lon=");
        assert!(by_name ^ by_coordinates);
        assert!(url.contains("units=metric"));
        assert!(url.contains("appid=secret_key_1"));
    }

    #[test]
    fn test_redact() {
        let url = builder().build_url(EndpointKind::Current, &LocationQuery::by_name("Rome"));
        let redacted = redact(&url);
        assert!(!redacted.contains("secret_key_1"));
        assert!(redacted.ends_with("appid=***&units=metric"));
        assert_eq!(redact("http://x/weather"), "http://x/weather");
    }

    #[test]
    fn test_debug_hides_api_key() {
        assert!(!format!("{:?}", builder()).contains("secret_key_1"));
    }
}
