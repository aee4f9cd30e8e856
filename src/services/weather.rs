//! OpenWeather current-conditions client

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use super::WeatherProvider;
use crate::config::WeatherConfig;
use crate::errors::{AppError, CollaboratorError};
use crate::models::WeatherSnapshot;

const SERVICE: &str = "weather";

pub struct OpenWeatherProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
pub struct OpenWeatherResponse {
    pub main: OpenWeatherMain,
    #[serde(default)]
    pub weather: Vec<OpenWeatherCondition>,
    pub wind: OpenWeatherWind,
}

#[derive(Debug, Deserialize)]
pub struct OpenWeatherMain {
    pub temp: f64,
    pub humidity: f64,
}

#[derive(Debug, Deserialize)]
pub struct OpenWeatherCondition {
    pub description: String,
}

#[derive(Debug, Deserialize)]
pub struct OpenWeatherWind {
    pub speed: f64,
}

impl OpenWeatherProvider {
    pub fn new(config: &WeatherConfig) -> Result<Self, AppError> {
        let api_key = crate::config::Config::env_secret("OPENWEATHER_API_KEY")?;
        Ok(Self {
            client: super::http_client()?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    pub fn from_response(response: OpenWeatherResponse) -> WeatherSnapshot {
        WeatherSnapshot {
            temperature: response.main.temp,
            humidity: response.main.humidity,
            description: response
                .weather
                .into_iter()
                .next()
                .map(|c| c.description)
                .unwrap_or_default(),
            wind_speed: response.wind.speed,
        }
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn current(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<WeatherSnapshot, CollaboratorError> {
        let url = format!(
            "{}/data/2.5/weather?lat={latitude}&lon={longitude}&units=metric&appid={}",
            self.base_url, self.api_key
        );
        debug!("Fetching current weather for {latitude},{longitude}");

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

        let body: OpenWeatherResponse = response
            .json()
            .await
            .map_err(|e| CollaboratorError::invalid_response(SERVICE, e.to_string()))?;

        Ok(Self::from_response(body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_flattens_the_nested_response() {
        let response: OpenWeatherResponse = serde_json::from_value(serde_json::json!({
            "main": {"temp": 21.4, "humidity": 58.0},
            "weather": [{"description": "scattered clouds"}],
            "wind": {"speed": 3.2}
        }))
        .unwrap();
        let snapshot = OpenWeatherProvider::from_response(response);
        assert_eq!(snapshot.temperature, 21.4);
        assert_eq!(snapshot.humidity, 58.0);
        assert_eq!(snapshot.description, "scattered clouds");
        assert_eq!(snapshot.wind_speed, 3.2);
    }

    #[test]
    fn empty_condition_list_yields_empty_description() {
        let response: OpenWeatherResponse = serde_json::from_value(serde_json::json!({
            "main": {"temp": 4.0, "humidity": 90.0},
            "weather": [],
            "wind": {"speed": 11.0}
        }))
        .unwrap();
        assert_eq!(OpenWeatherProvider::from_response(response).description, "");
    }
}
