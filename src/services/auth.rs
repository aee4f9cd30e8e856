//! Session verification against the hosted auth provider
//!
//! The provider issues bearer tokens to the browser (delivered in the
//! page's URL fragment and exchanged once via `POST /auth/session`).
//! The verifier checks a token by asking the provider for the user it
//! belongs to; there are no authorization levels beyond
//! authenticated/unauthenticated.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::AuthConfig;
use crate::errors::{AppError, CollaboratorError};

const SERVICE: &str = "auth";

/// The authenticated user a valid session token resolves to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthenticatedUser {
    pub id: String,
    #[serde(default)]
    pub email: String,
}

#[async_trait]
pub trait SessionVerifier: Send + Sync {
    /// Resolve an access token to its user, or `None` when the token is
    /// invalid or expired.
    async fn verify(
        &self,
        access_token: &str,
    ) -> Result<Option<AuthenticatedUser>, CollaboratorError>;
}

/// Supabase-style verifier: `GET {base}/auth/v1/user` with the service
/// api key and the user's bearer token.
pub struct SupabaseVerifier {
    client: reqwest::Client,
    base_url: String,
    service_key: String,
}

impl SupabaseVerifier {
    pub fn from_env(config: &AuthConfig) -> Result<Self, AppError> {
        Ok(Self {
            client: super::http_client()?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            service_key: crate::config::Config::env_secret("AUTH_SERVICE_KEY")?,
        })
    }
}

#[async_trait]
impl SessionVerifier for SupabaseVerifier {
    async fn verify(
        &self,
        access_token: &str,
    ) -> Result<Option<AuthenticatedUser>, CollaboratorError> {
        let url = format!("{}/auth/v1/user", self.base_url);
        debug!("Verifying session token");

        let response = self
            .client
            .get(&url)
            .header("apikey", &self.service_key)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| CollaboratorError::request_failed(SERVICE, e.to_string()))?;

        match response.status() {
            status if status.is_success() => {
                let user: AuthenticatedUser = response
                    .json()
                    .await
                    .map_err(|e| CollaboratorError::invalid_response(SERVICE, e.to_string()))?;
                Ok(Some(user))
            }
            reqwest::StatusCode::UNAUTHORIZED | reqwest::StatusCode::FORBIDDEN => Ok(None),
            status => Err(CollaboratorError::request_failed(
                SERVICE,
                format!("HTTP {status}"),
            )),
        }
    }
}
