//! HTTP handlers for the upload-and-enrichment workflow

use axum::{
    extract::{Multipart, Query, State},
    http::StatusCode,
    response::Json,
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::path::PathBuf;
use tracing::{error, info, warn};

use super::responses::ApiError;
use super::AppState;
use crate::errors::AppError;
use crate::models::{
    CaptureMetadata, EnrichmentResult, LocationEnrichment, PlaceElement, SubmissionRecord,
    WeatherSnapshot,
};
use crate::services::AuthenticatedUser;

#[derive(Debug, Deserialize)]
pub struct CoordsQuery {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl CoordsQuery {
    fn require(&self) -> Result<(f64, f64), AppError> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => Ok((lat, lon)),
            _ => Err(AppError::invalid_request(
                "Latitude and longitude are required",
            )),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub file: UploadedFile,
    #[serde(rename = "fileNameWithoutExtension")]
    pub file_name_without_extension: String,
    pub metadata: CaptureMetadata,
}

#[derive(Debug, Serialize)]
pub struct UploadedFile {
    pub path: String,
}

/// Accept a multipart file upload, stage the original and return the
/// extracted capture metadata. Fails with 400 before any enrichment
/// when the embedded GPS data is incomplete.
pub async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    let mut file: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::invalid_request(e.to_string()))?
    {
        if field.name() == Some("file") {
            let filename = field
                .file_name()
                .ok_or_else(|| AppError::invalid_request("No filename provided"))?
                .to_string();
            let data = field
                .bytes()
                .await
                .map_err(|e| AppError::invalid_request(e.to_string()))?;
            file = Some((filename, data.to_vec()));
        }
    }

    let (filename, data) = file.ok_or_else(|| AppError::invalid_request("No file found"))?;

    let asset = state.staging.stage(&filename, &data).await?;
    info!("Staged upload {} at {}", filename, asset.path.display());

    let metadata = crate::exif::extract(&data)?;

    Ok(Json(UploadResponse {
        file: UploadedFile {
            path: asset.path.display().to_string(),
        },
        file_name_without_extension: asset.file_stem,
        metadata,
    }))
}

pub async fn geocode(
    Query(coords): Query<CoordsQuery>,
    State(state): State<AppState>,
) -> Result<Json<LocationEnrichment>, ApiError> {
    let (lat, lon) = coords.require()?;
    let location = state.geocoder.reverse(lat, lon).await?;
    Ok(Json(location))
}

pub async fn weather(
    Query(coords): Query<CoordsQuery>,
    State(state): State<AppState>,
) -> Result<Json<WeatherSnapshot>, ApiError> {
    let (lat, lon) = coords.require()?;
    let snapshot = state.weather.current(lat, lon).await?;
    Ok(Json(snapshot))
}

/// Raw place elements from the POI collaborator; classification happens
/// in the enrichment orchestrator.
pub async fn places(
    Query(coords): Query<CoordsQuery>,
    State(state): State<AppState>,
) -> Result<Json<Vec<PlaceElement>>, ApiError> {
    let (lat, lon) = coords.require()?;
    let elements = state.places.nearby(lat, lon).await?;
    Ok(Json(elements))
}

/// Sequenced geocoding + weather + classified places in one call.
pub async fn enrich(
    Query(coords): Query<CoordsQuery>,
    State(state): State<AppState>,
) -> Result<Json<EnrichmentResult>, ApiError> {
    let (lat, lon) = coords.require()?;
    let result = state.enrichment.enrich(lat, lon).await?;
    Ok(Json(result))
}

/// Append the user-confirmed records to the spreadsheet. At-least-once:
/// submitting the same payload twice produces two rows.
pub async fn save_records(
    State(state): State<AppState>,
    Json(records): Json<Vec<SubmissionRecord>>,
) -> Result<Json<Value>, ApiError> {
    state.records.append(&records).await?;
    info!("Appended {} record(s) to the spreadsheet", records.len());
    Ok(Json(json!({ "message": "Data saved to sheet" })))
}

#[derive(Debug, Deserialize)]
pub struct ArchiveRequest {
    pub path: String,
}

#[derive(Debug, Serialize)]
pub struct ArchiveResponse {
    pub message: String,
    pub key: String,
}

/// Run the archival pipeline for a staged original, then drop the
/// staged file.
pub async fn archive(
    State(state): State<AppState>,
    Json(request): Json<ArchiveRequest>,
) -> Result<Json<ArchiveResponse>, ApiError> {
    if request.path.is_empty() {
        return Err(AppError::invalid_request("File path not provided").into());
    }

    let input = PathBuf::from(&request.path);
    let key = state.pipeline.archive(&input).await?;

    // the staged original is no longer needed once the archive copy is up
    if let Err(e) = state.staging.remove(&input).await {
        warn!("Failed to remove staged original {}: {e}", request.path);
    }

    Ok(Json(ArchiveResponse {
        message: "Image processed and uploaded successfully".to_string(),
        key,
    }))
}

#[derive(Debug, Deserialize)]
pub struct SessionExchangeRequest {
    pub access_token: String,
}

/// One-time session exchange: verify the token delivered in the page's
/// URL fragment and set the session cookie.
pub async fn session_exchange(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(request): Json<SessionExchangeRequest>,
) -> Result<(CookieJar, Json<AuthenticatedUser>), ApiError> {
    match state.sessions.verify(&request.access_token).await {
        Ok(Some(user)) => {
            let cookie = Cookie::build((super::middleware::SESSION_COOKIE, request.access_token))
                .path("/")
                .http_only(true)
                .build();
            Ok((jar.add(cookie), Json(user)))
        }
        Ok(None) => Err(AppError::unauthenticated("invalid session token").into()),
        Err(e) => {
            error!("Session exchange failed: {e}");
            Err(e.into())
        }
    }
}

pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

pub async fn login() -> (StatusCode, Json<Value>) {
    (
        StatusCode::OK,
        Json(json!({ "message": "Sign in with your auth provider, then POST the access token to /auth/session" })),
    )
}
