//! Google Sheets append-only record sink
//!
//! Authenticates with a service-account JWT (RS256 over the private key
//! from the environment) exchanged for a bearer token, then appends one
//! row per record at the configured range. At-least-once semantics: no
//! idempotency key, no retry.

use async_trait::async_trait;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::RecordSink;
use crate::config::{Config, SheetsConfig};
use crate::errors::{AppError, CollaboratorError};
use crate::models::SubmissionRecord;

const SERVICE: &str = "sheets";
const SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";
const API_BASE: &str = "https://sheets.googleapis.com/v4/spreadsheets";

pub struct GoogleSheetsSink {
    client: reqwest::Client,
    credentials: ServiceAccountCredentials,
    spreadsheet_id: String,
    range: String,
}

/// Service-account fields read from the environment.
#[derive(Debug, Clone)]
pub struct ServiceAccountCredentials {
    pub client_email: String,
    pub private_key: String,
    pub token_uri: String,
}

#[derive(Serialize)]
struct TokenClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

impl ServiceAccountCredentials {
    pub fn from_env() -> Result<Self, AppError> {
        Ok(Self {
            client_email: Config::env_secret("GOOGLE_CLIENT_EMAIL")?,
            // .env files carry the key with escaped newlines
            private_key: Config::env_secret("GOOGLE_PRIVATE_KEY")?.replace("\\n", "\n"),
            token_uri: std::env::var("GOOGLE_TOKEN_URI")
                .unwrap_or_else(|_| "https://oauth2.googleapis.com/token".to_string()),
        })
    }
}

impl GoogleSheetsSink {
    pub fn from_env(config: &SheetsConfig) -> Result<Self, AppError> {
        Ok(Self {
            client: super::http_client()?,
            credentials: ServiceAccountCredentials::from_env()?,
            spreadsheet_id: config.spreadsheet_id.clone(),
            range: config.range.clone(),
        })
    }

    fn signed_assertion(&self) -> Result<String, CollaboratorError> {
        let now = chrono::Utc::now().timestamp();
        let claims = TokenClaims {
            iss: &self.credentials.client_email,
            scope: SCOPE,
            aud: &self.credentials.token_uri,
            iat: now,
            exp: now + 3600,
        };
        let key = EncodingKey::from_rsa_pem(self.credentials.private_key.as_bytes())
            .map_err(|e| CollaboratorError::auth_failed(SERVICE, e.to_string()))?;
        jsonwebtoken::encode(&Header::new(Algorithm::RS256), &claims, &key)
            .map_err(|e| CollaboratorError::auth_failed(SERVICE, e.to_string()))
    }

    async fn access_token(&self) -> Result<String, CollaboratorError> {
        let assertion = self.signed_assertion()?;
        let response = self
            .client
            .post(&self.credentials.token_uri)
            .form(&[
                ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
                ("assertion", assertion.as_str()),
            ])
            .send()
            .await
            .map_err(|e| CollaboratorError::auth_failed(SERVICE, e.to_string()))?;

        if !response.status().is_success() {
            return Err(CollaboratorError::auth_failed(
                SERVICE,
                format!("token exchange returned HTTP {}", response.status()),
            ));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| CollaboratorError::invalid_response(SERVICE, e.to_string()))?;
        Ok(token.access_token)
    }
}

#[async_trait]
impl RecordSink for GoogleSheetsSink {
    async fn append(&self, records: &[SubmissionRecord]) -> Result<(), CollaboratorError> {
        let token = self.access_token().await?;
        let values: Vec<Vec<serde_json::Value>> =
            records.iter().map(SubmissionRecord::to_row).collect();

        let url = format!(
            "{API_BASE}/{}/values/{}:append?valueInputOption=RAW&insertDataOption=INSERT_ROWS",
            self.spreadsheet_id,
            urlencoding::encode(&self.range)
        );
        debug!("Appending {} row(s) to spreadsheet", values.len());

        let response = self
            .client
            .post(&url)
            .bearer_auth(token)
            .json(&serde_json::json!({ "values": values }))
            .send()
            .await
            .map_err(|e| CollaboratorError::request_failed(SERVICE, e.to_string()))?;

        if !response.status().is_success() {
            return Err(CollaboratorError::request_failed(
                SERVICE,
                format!("append returned HTTP {}", response.status()),
            ));
        }

        Ok(())
    }
}
