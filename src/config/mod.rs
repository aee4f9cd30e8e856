use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub web: WebConfig,
    pub storage: StorageConfig,
    pub geocoding: GeocodingConfig,
    pub weather: WeatherConfig,
    pub places: PlacesConfig,
    pub sheets: SheetsConfig,
    pub auth: AuthConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebConfig {
    pub host: String,
    pub port: u16,
    pub base_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Staging area for uploaded originals and resized intermediates.
    pub upload_path: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocodingConfig {
    pub base_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    pub base_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlacesConfig {
    pub base_url: String,
    /// Search radius around the capture coordinates, in meters.
    pub radius_m: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SheetsConfig {
    pub spreadsheet_id: String,
    /// Target range in A1 notation, e.g. "log!A2".
    pub range: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    pub base_url: String,
    /// Where unauthenticated browser requests are sent.
    pub login_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            web: WebConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
                base_url: "http://localhost:8080".to_string(),
            },
            storage: StorageConfig {
                upload_path: PathBuf::from("./data/uploads"),
            },
            geocoding: GeocodingConfig {
                base_url: "https://nominatim.openstreetmap.org".to_string(),
            },
            weather: WeatherConfig {
                base_url: "https://api.openweathermap.org".to_string(),
            },
            places: PlacesConfig {
                base_url: "https://overpass-api.de".to_string(),
                radius_m: 3000,
            },
            sheets: SheetsConfig {
                spreadsheet_id: String::new(),
                range: "log!A2".to_string(),
            },
            auth: AuthConfig {
                base_url: String::new(),
                login_url: "/login".to_string(),
            },
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_file =
            std::env::var("CONFIG_FILE").unwrap_or_else(|_| "config.toml".to_string());

        if std::path::Path::new(&config_file).exists() {
            let contents = std::fs::read_to_string(&config_file)?;
            Ok(toml::from_str(&contents)?)
        } else {
            let default_config = Self::default();
            let contents = toml::to_string_pretty(&default_config)?;
            std::fs::create_dir_all("./data/uploads")?;
            std::fs::write(&config_file, contents)?;
            Ok(default_config)
        }
    }

    /// Read a required secret from the environment.
    pub fn env_secret(name: &str) -> Result<String, crate::errors::AppError> {
        std::env::var(name).map_err(|_| {
            crate::errors::AppError::configuration(format!("missing environment variable: {name}"))
        })
    }
}
