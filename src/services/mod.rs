//! External collaborator clients
//!
//! One trait per hosted service the workflow talks to, each with a
//! reqwest-backed implementation. Handlers depend on the traits only, so
//! tests substitute in-memory doubles.

use async_trait::async_trait;

use crate::errors::CollaboratorError;
use crate::models::{LocationEnrichment, PlaceElement, SubmissionRecord, WeatherSnapshot};

pub mod auth;
pub mod enrichment;
pub mod geocoding;
pub mod places;
pub mod sheets;
pub mod weather;

pub use auth::{AuthenticatedUser, SessionVerifier, SupabaseVerifier};
pub use enrichment::EnrichmentService;
pub use geocoding::NominatimGeocoder;
pub use places::OverpassDirectory;
pub use sheets::GoogleSheetsSink;
pub use weather::OpenWeatherProvider;

/// Reverse-geocoding collaborator: coordinates to place/town/country.
#[async_trait]
pub trait ReverseGeocoder: Send + Sync {
    async fn reverse(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<LocationEnrichment, CollaboratorError>;
}

/// Weather collaborator: current conditions at the coordinates.
#[async_trait]
pub trait WeatherProvider: Send + Sync {
    async fn current(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<WeatherSnapshot, CollaboratorError>;
}

/// POI collaborator: raw tagged elements near the coordinates.
#[async_trait]
pub trait PlaceDirectory: Send + Sync {
    async fn nearby(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<Vec<PlaceElement>, CollaboratorError>;
}

/// Tabular persistence collaborator. Append-only, at-least-once: a
/// retried submission produces a duplicate row.
#[async_trait]
pub trait RecordSink: Send + Sync {
    async fn append(&self, records: &[SubmissionRecord]) -> Result<(), CollaboratorError>;
}

/// Shared HTTP client for collaborator requests.
pub fn http_client() -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(30))
        .user_agent(concat!("triplog/", env!("CARGO_PKG_VERSION")))
        .build()
}
