//! Overpass nearby-places client

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use super::PlaceDirectory;
use crate::config::PlacesConfig;
use crate::errors::CollaboratorError;
use crate::models::PlaceElement;

const SERVICE: &str = "places";

/// Tag keys the nearby-places query matches on.
const QUERY_KEYS: &[&str] = &["amenity", "bridge", "highway", "tourism", "natural", "route"];

pub struct OverpassDirectory {
    client: reqwest::Client,
    base_url: String,
    radius_m: u32,
}

#[derive(Debug, Deserialize)]
struct OverpassResponse {
    #[serde(default)]
    elements: Vec<PlaceElement>,
}

impl OverpassDirectory {
    pub fn new(config: &PlacesConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: super::http_client()?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            radius_m: config.radius_m,
        })
    }

    /// Overpass QL query for tagged nodes, ways and relations around the
    /// coordinates.
    pub fn build_query(latitude: f64, longitude: f64, radius_m: u32) -> String {
        let mut query = String::from("[out:json];\n(\n");
        for key in QUERY_KEYS {
            for element in ["node", "way", "relation"] {
                query.push_str(&format!(
                    "  {element}[\"{key}\"](around:{radius_m},{latitude},{longitude});\n"
                ));
            }
        }
        query.push_str(");\nout center;");
        query
    }
}

#[async_trait]
impl PlaceDirectory for OverpassDirectory {
    async fn nearby(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<Vec<PlaceElement>, CollaboratorError> {
        let query = Self::build_query(latitude, longitude, self.radius_m);
        let url = format!(
            "{}/api/interpreter?data={}",
            self.base_url,
            urlencoding::encode(&query)
        );
        debug!("Querying nearby places for {latitude},{longitude}");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| CollaboratorError::request_failed(SERVICE, e.to_string()))?;

        if !response.status().is_success() {
            return Err(CollaboratorError::request_failed(
                SERVICE,
                format!("HTTP {}", response.status()),
            ));
        }

        let body: OverpassResponse = response
            .json()
            .await
            .map_err(|e| CollaboratorError::invalid_response(SERVICE, e.to_string()))?;

        Ok(body.elements)
    }
}
