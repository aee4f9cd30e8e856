//! Web layer
//!
//! Thin axum handlers that delegate to the collaborator clients held in
//! [`AppState`]. The workflow routes under `/api/v1` sit behind the
//! session gate; health, login and the session exchange do not.

use anyhow::Result;
use axum::{
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::{
    config::Config,
    pipeline::ArchivalPipeline,
    services::{
        EnrichmentService, PlaceDirectory, RecordSink, ReverseGeocoder, SessionVerifier,
        WeatherProvider,
    },
    storage::StagingArea,
};

pub mod api;
pub mod middleware;
pub mod responses;

pub use responses::ApiError;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub staging: StagingArea,
    pub geocoder: Arc<dyn ReverseGeocoder>,
    pub weather: Arc<dyn WeatherProvider>,
    pub places: Arc<dyn PlaceDirectory>,
    pub records: Arc<dyn RecordSink>,
    pub sessions: Arc<dyn SessionVerifier>,
    pub enrichment: EnrichmentService,
    pub pipeline: ArchivalPipeline,
}

/// Web server configuration and setup
pub struct WebServer {
    app: Router,
    addr: SocketAddr,
}

impl WebServer {
    pub fn new(state: AppState) -> Result<Self> {
        let addr: SocketAddr =
            format!("{}:{}", state.config.web.host, state.config.web.port).parse()?;
        let app = create_router(state);
        Ok(Self { app, addr })
    }

    /// Start the web server
    pub async fn serve(self) -> Result<()> {
        let listener = tokio::net::TcpListener::bind(&self.addr).await?;
        axum::serve(listener, self.app).await?;
        Ok(())
    }

    pub fn host(&self) -> String {
        self.addr.ip().to_string()
    }

    pub fn port(&self) -> u16 {
        self.addr.port()
    }
}

/// Build the router with all routes and middleware
pub fn create_router(state: AppState) -> Router {
    let workflow = api_v1_routes()
        .route_layer(from_fn_with_state(state.clone(), middleware::session_gate));

    Router::new()
        // Health and session entry points (no auth required)
        .route("/health", get(api::health))
        .route("/login", get(api::login))
        .route("/auth/session", post(api::session_exchange))
        // Workflow routes behind the session gate
        .nest("/api/v1", workflow)
        // Middleware (applied in reverse order)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn api_v1_routes() -> Router<AppState> {
    Router::new()
        .route("/upload", post(api::upload))
        .route("/geocode", get(api::geocode))
        .route("/weather", get(api::weather))
        .route("/places", get(api::places))
        .route("/enrich", get(api::enrich))
        .route("/records", post(api::save_records))
        .route("/archive", post(api::archive))
}
