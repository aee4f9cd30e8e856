//! Nominatim reverse-geocoding client

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use super::ReverseGeocoder;
use crate::config::GeocodingConfig;
use crate::errors::CollaboratorError;
use crate::models::LocationEnrichment;

const SERVICE: &str = "geocoding";

pub struct NominatimGeocoder {
    client: reqwest::Client,
    base_url: String,
}

/// Raw reverse-geocoding response shape.
#[derive(Debug, Deserialize)]
pub struct NominatimResponse {
    #[serde(default)]
    pub name: Option<String>,
    pub address: NominatimAddress,
}

#[derive(Debug, Default, Deserialize)]
pub struct NominatimAddress {
    #[serde(default)]
    pub town: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub village: Option<String>,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub country_code: String,
}

impl NominatimGeocoder {
    pub fn new(config: &GeocodingConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: super::http_client()?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Flatten the raw response into the enrichment the workflow holds.
    ///
    /// The town falls back through town/city/village; the country is
    /// truncated before its first `/` because the source data sometimes
    /// encodes several name variants separated by slashes. An absent
    /// place name becomes an empty string the user can fill in manually.
    pub fn from_response(response: NominatimResponse) -> LocationEnrichment {
        let address = response.address;
        let town = address
            .town
            .or(address.city)
            .or(address.village)
            .unwrap_or_default();
        let country = address
            .country
            .split('/')
            .next()
            .unwrap_or_default()
            .to_string();
        LocationEnrichment {
            name: response.name.unwrap_or_default(),
            town,
            country,
            country_code: address.country_code,
        }
    }
}

#[async_trait]
impl ReverseGeocoder for NominatimGeocoder {
    async fn reverse(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<LocationEnrichment, CollaboratorError> {
        let url = format!(
            "{}/reverse?format=json&lat={latitude}&lon={longitude}",
            self.base_url
        );
        debug!("Reverse geocoding via {}", url);

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

        let body: NominatimResponse = response
            .json()
            .await
            .map_err(|e| CollaboratorError::invalid_response(SERVICE, e.to_string()))?;

        Ok(Self::from_response(body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(json: serde_json::Value) -> NominatimResponse {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn country_is_truncated_before_the_first_slash() {
        let enriched = NominatimGeocoder::from_response(response(serde_json::json!({
            "name": "Zugspitze",
            "address": {"country": "Deutschland/Germany", "country_code": "de"}
        })));
        assert_eq!(enriched.country, "Deutschland");
        assert_eq!(enriched.country_code, "de");
    }

    #[test]
    fn town_falls_back_through_city_and_village() {
        let enriched = NominatimGeocoder::from_response(response(serde_json::json!({
            "address": {"city": "Innsbruck", "country": "Österreich", "country_code": "at"}
        })));
        assert_eq!(enriched.town, "Innsbruck");

        let enriched = NominatimGeocoder::from_response(response(serde_json::json!({
            "address": {"village": "Leutasch", "country": "Österreich", "country_code": "at"}
        })));
        assert_eq!(enriched.town, "Leutasch");
    }

    #[test]
    fn missing_name_becomes_empty_for_manual_entry() {
        let enriched = NominatimGeocoder::from_response(response(serde_json::json!({
            "address": {"country": "France", "country_code": "fr"}
        })));
        assert_eq!(enriched.name, "");
    }
}
