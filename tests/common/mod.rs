//! Shared test doubles and request helpers

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tower::ServiceExt;

use triplog::config::Config;
use triplog::errors::CollaboratorError;
use triplog::models::{
    LocationEnrichment, PlaceElement, SubmissionRecord, WeatherSnapshot,
};
use triplog::pipeline::ArchivalPipeline;
use triplog::services::{
    AuthenticatedUser, EnrichmentService, PlaceDirectory, RecordSink, ReverseGeocoder,
    SessionVerifier, WeatherProvider,
};
use triplog::storage::{ObjectStore, StagingArea};
use triplog::web::AppState;

pub const VALID_TOKEN: &str = "valid-token";

pub struct StubGeocoder;

#[async_trait]
impl ReverseGeocoder for StubGeocoder {
    async fn reverse(
        &self,
        _latitude: f64,
        _longitude: f64,
    ) -> Result<LocationEnrichment, CollaboratorError> {
        Ok(LocationEnrichment {
            name: "Zugspitze".into(),
            town: "Garmisch".into(),
            country: "Deutschland".into(),
            country_code: "de".into(),
        })
    }
}

pub struct StubWeather;

#[async_trait]
impl WeatherProvider for StubWeather {
    async fn current(
        &self,
        _latitude: f64,
        _longitude: f64,
    ) -> Result<WeatherSnapshot, CollaboratorError> {
        Ok(WeatherSnapshot {
            temperature: 18.5,
            humidity: 62.0,
            description: "few clouds".into(),
            wind_speed: 2.4,
        })
    }
}

pub struct StubPlaces(pub Vec<PlaceElement>);

#[async_trait]
impl PlaceDirectory for StubPlaces {
    async fn nearby(
        &self,
        _latitude: f64,
        _longitude: f64,
    ) -> Result<Vec<PlaceElement>, CollaboratorError> {
        Ok(self.0.clone())
    }
}

#[derive(Default)]
pub struct CountingSink {
    pub rows: AtomicUsize,
}

#[async_trait]
impl RecordSink for CountingSink {
    async fn append(&self, records: &[SubmissionRecord]) -> Result<(), CollaboratorError> {
        self.rows.fetch_add(records.len(), Ordering::SeqCst);
        Ok(())
    }
}

/// Accepts only [`VALID_TOKEN`].
pub struct TokenSessions;

#[async_trait]
impl SessionVerifier for TokenSessions {
    async fn verify(
        &self,
        access_token: &str,
    ) -> Result<Option<AuthenticatedUser>, CollaboratorError> {
        if access_token == VALID_TOKEN {
            Ok(Some(AuthenticatedUser {
                id: "user-1".into(),
                email: "traveler@example.com".into(),
            }))
        } else {
            Ok(None)
        }
    }
}

#[derive(Default)]
pub struct CountingStore {
    pub puts: AtomicUsize,
}

#[async_trait]
impl ObjectStore for CountingStore {
    async fn put(
        &self,
        _key: &str,
        _data: Vec<u8>,
        _content_type: &str,
    ) -> Result<(), CollaboratorError> {
        self.puts.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

pub struct TestHarness {
    pub router: Router,
    pub sink: Arc<CountingSink>,
    pub store: Arc<CountingStore>,
}

pub fn harness(upload_dir: &Path) -> TestHarness {
    harness_with_places(upload_dir, vec![])
}

pub fn harness_with_places(upload_dir: &Path, places: Vec<PlaceElement>) -> TestHarness {
    let geocoder: Arc<dyn ReverseGeocoder> = Arc::new(StubGeocoder);
    let weather: Arc<dyn WeatherProvider> = Arc::new(StubWeather);
    let places: Arc<dyn PlaceDirectory> = Arc::new(StubPlaces(places));
    let sink = Arc::new(CountingSink::default());
    let store = Arc::new(CountingStore::default());

    let state = AppState {
        config: Config::default(),
        staging: StagingArea::new(upload_dir.to_path_buf()),
        geocoder: geocoder.clone(),
        weather: weather.clone(),
        places: places.clone(),
        records: sink.clone(),
        sessions: Arc::new(TokenSessions),
        enrichment: EnrichmentService::new(geocoder, weather, places),
        pipeline: ArchivalPipeline::new(store.clone()),
    };

    TestHarness {
        router: triplog::web::create_router(state),
        sink,
        store,
    }
}

pub async fn send_request(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("authorization", format!("Bearer {VALID_TOKEN}"));
    if body.is_some() {
        builder = builder.header("content-type", "application/json");
    }
    let request = match body {
        Some(body) => builder
            .body(Body::from(serde_json::to_string(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: Value = if body_bytes.is_empty() {
        json!({})
    } else {
        serde_json::from_slice(&body_bytes).unwrap_or(json!({}))
    };

    (status, json)
}

/// Multipart upload request with a single `file` field.
pub async fn send_upload(app: &Router, filename: &str, data: &[u8]) -> (StatusCode, Value) {
    let boundary = "triplog-test-boundary";
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\n\
             Content-Type: application/octet-stream\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/v1/upload")
        .header("authorization", format!("Bearer {VALID_TOKEN}"))
        .header(
            "content-type",
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&body_bytes).unwrap_or(json!({}));
    (status, json)
}
