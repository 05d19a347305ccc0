use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    routing::get,
};
use chrono::Utc;
use serde::Deserialize;

use crate::{
    SkycastError,
    models::{DayConvention, LocationParser, LocationQuery, WeatherSnapshot},
    render::{IconResolver, RenderContext, render_snapshot},
    weather::WeatherService,
};

#[derive(Clone)]
pub struct ApiState {
    pub service: WeatherService,
    pub icons: Arc<dyn IconResolver>,
    pub convention: DayConvention,
    pub forecast_limit: usize,
}

/// `?q=<name>` or `?lat=<lat>&lon=<lon>`
#[derive(Debug, Deserialize)]
pub struct WeatherParams {
    pub q: Option<String>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
}

impl TryFrom<WeatherParams> for LocationQuery {
    type Error = SkycastError;

    fn try_from(params: WeatherParams) -> Result<Self, Self::Error> {
        match params {
            WeatherParams { q: Some(name), .. } if !name.trim().is_empty() => {
                Ok(LocationQuery::by_name(name.trim()))
            }
            WeatherParams {
                lat: Some(lat),
                lon: Some(lon),
                ..
            } => {
                LocationParser::validate_coordinates(lat, lon)?;
                Ok(LocationQuery::by_coordinates(lat, lon))
            }
            _ => Err(SkycastError::validation(
                "Either q or both lat and lon are required",
            )),
        }
    }
}

pub fn router(state: ApiState) -> Router {
    Router::new()
        .route("/weather", get(get_weather))
        .route("/weather/view", get(get_weather_view))
        .with_state(state)
}

fn status_for(error: &SkycastError) -> StatusCode {
    match error {
        SkycastError::NotFound { .. } => StatusCode::NOT_FOUND,
        SkycastError::UpstreamFailure { .. } => StatusCode::BAD_GATEWAY,
        SkycastError::Validation { .. } => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

async fn fetch(state: &ApiState, params: WeatherParams) -> Result<WeatherSnapshot, StatusCode> {
    let query = LocationQuery::try_from(params).map_err(|e| status_for(&e))?;
    state.service.fetch_snapshot(&query).await.map_err(|e| {
        tracing::warn!("Weather lookup for {} failed: {}", query, e);
        status_for(&e)
    })
}

async fn get_weather(
    State(state): State<ApiState>,
    Query(params): Query<WeatherParams>,
) -> Result<Json<WeatherSnapshot>, StatusCode> {
    let snapshot = fetch(&state, params).await?;
    Ok(Json(
        snapshot.into_preview(state.forecast_limit, &state.convention),
    ))
}

async fn get_weather_view(
    State(state): State<ApiState>,
    Query(params): Query<WeatherParams>,
) -> Result<String, StatusCode> {
    let snapshot = fetch(&state, params).await?;
    let ctx = RenderContext {
        convention: &state.convention,
        icons: state.icons.as_ref(),
    };
    Ok(render_snapshot(
        &snapshot,
        Utc::now(),
        state.forecast_limit,
        &ctx,
    ))
}
