//! Picture of the day handlers.

use std::sync::Arc;

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use chrono::NaiveDate;
use potd_core::metrics::request;
use potd_core::{ImageSize, ImageVariant, ScrapeOutcome};
use tracing::{error, info};

use crate::cache::ImageKey;
use crate::error::HttpError;
use crate::state::AppState;

fn parse_date(raw: &str) -> Result<NaiveDate, HttpError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| HttpError::BadRequest(format!("Invalid date '{raw}', expected YYYY-MM-DD")))
}

fn parse_dimension(name: &str, raw: &str) -> Result<u32, HttpError> {
    match raw.parse::<u32>() {
        Ok(value) if value > 0 => Ok(value),
        _ => Err(HttpError::BadRequest(format!(
            "{name} must be a positive integer, got '{raw}'"
        ))),
    }
}

fn png(bytes: Bytes) -> Response {
    ([(header::CONTENT_TYPE, "image/png")], bytes).into_response()
}

/// Today's picture, or the latest stored one.
pub async fn today(State(state): State<AppState>) -> Result<Response, HttpError> {
    state.metrics.record_request(request::TODAY);
    Ok(match state.pictures.today_or_latest().await? {
        Some(picture) => Json(picture.to_dto()).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    })
}

pub async fn by_date(
    State(state): State<AppState>,
    Path(date): Path<String>,
) -> Result<Response, HttpError> {
    state.metrics.record_request(request::DATE);
    let date = parse_date(&date)?;

    if let Some(dto) = state.caches.pictures.get(&date).await {
        return Ok(Json(dto).into_response());
    }
    Ok(match state.pictures.by_date(date).await? {
        Some(picture) => {
            let dto = picture.to_dto();
            state.caches.pictures.insert(date, dto.clone()).await;
            Json(dto).into_response()
        }
        None => StatusCode::NO_CONTENT.into_response(),
    })
}

/// TRMNL rendition of today's (or the latest) picture.
pub async fn trmnl(State(state): State<AppState>) -> Result<Response, HttpError> {
    state.metrics.record_request(request::TRMNL);
    let picture = state
        .pictures
        .today_or_latest()
        .await?
        .ok_or_else(|| HttpError::NotFound("No picture of the day stored".to_string()))?;

    if let Some(bytes) = state.caches.trmnl.get(&picture.date).await {
        return Ok(png(bytes));
    }
    let bytes = Bytes::from(state.pictures.trmnl_image_for(picture.date).await?);
    state.caches.trmnl.insert(picture.date, bytes.clone()).await;
    Ok(png(bytes))
}

/// Run the guarded scrape on its own task so a dropped request cannot cut it short.
/// Failures are logged, the trigger is always acknowledged.
pub async fn scrape(State(state): State<AppState>) -> &'static str {
    state.metrics.scraper_triggered.inc();
    let scraper = Arc::clone(&state.scraper);
    match tokio::spawn(async move { scraper.scrape().await }).await {
        Ok(Ok(ScrapeOutcome::Skipped { date })) => info!(%date, "Triggered scrape skipped"),
        Ok(Ok(ScrapeOutcome::Saved { date, image_url, reused })) => {
            info!(%date, %image_url, reused, "Triggered scrape stored picture");
        }
        Ok(Err(e)) => error!(error = %e, "Triggered scrape failed"),
        Err(e) => error!(error = %e, "Triggered scrape task did not complete"),
    }
    "Scrape triggered"
}

async fn image_response(
    state: &AppState,
    date: &str,
    variant: ImageVariant,
    width: Option<&str>,
    height: Option<&str>,
) -> Result<Response, HttpError> {
    let date = parse_date(date)?;
    let size = ImageSize::new(
        width.map(|w| parse_dimension("width", w)).transpose()?,
        height.map(|h| parse_dimension("height", h)).transpose()?,
    );
    let key = ImageKey {
        date,
        variant,
        size,
    };

    if let Some(bytes) = state.caches.images.get(&key).await {
        return Ok(png(bytes));
    }
    let bytes = Bytes::from(state.pictures.image(date, variant, size).await?);
    state.caches.images.insert(key, bytes.clone()).await;
    Ok(png(bytes))
}

pub async fn image(
    State(state): State<AppState>,
    Path(date): Path<String>,
) -> Result<Response, HttpError> {
    image_response(&state, &date, ImageVariant::Original, None, None).await
}

pub async fn image_width(
    State(state): State<AppState>,
    Path((date, width)): Path<(String, String)>,
) -> Result<Response, HttpError> {
    image_response(&state, &date, ImageVariant::Original, Some(&width), None).await
}

pub async fn image_size(
    State(state): State<AppState>,
    Path((date, width, height)): Path<(String, String, String)>,
) -> Result<Response, HttpError> {
    image_response(
        &state,
        &date,
        ImageVariant::Original,
        Some(&width),
        Some(&height),
    )
    .await
}

pub async fn dithered(
    State(state): State<AppState>,
    Path(date): Path<String>,
) -> Result<Response, HttpError> {
    image_response(&state, &date, ImageVariant::Dithered, None, None).await
}

pub async fn dithered_width(
    State(state): State<AppState>,
    Path((date, width)): Path<(String, String)>,
) -> Result<Response, HttpError> {
    image_response(&state, &date, ImageVariant::Dithered, Some(&width), None).await
}

pub async fn dithered_size(
    State(state): State<AppState>,
    Path((date, width, height)): Path<(String, String, String)>,
) -> Result<Response, HttpError> {
    image_response(
        &state,
        &date,
        ImageVariant::Dithered,
        Some(&width),
        Some(&height),
    )
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date() {
        assert_eq!(
            parse_date("2024-02-29").unwrap(),
            NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()
        );
        assert!(matches!(parse_date("2023-02-29"), Err(HttpError::BadRequest(_))));
        assert!(matches!(parse_date("today"), Err(HttpError::BadRequest(_))));
    }

    #[test]
    fn test_parse_dimension_rejects_non_positive() {
        assert_eq!(parse_dimension("width", "320").unwrap(), 320);
        assert!(parse_dimension("width", "0").is_err());
        assert!(parse_dimension("width", "-4").is_err());
        assert!(parse_dimension("height", "tall").is_err());
    }
}
