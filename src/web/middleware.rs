//! Session gate middleware
//!
//! Only authenticated sessions reach the workflow routes. The access
//! token comes from the `Authorization: Bearer` header or the session
//! cookie set by the one-time exchange at `POST /auth/session`.
//! Unauthenticated browser requests are redirected to the login entry
//! point; API requests get a 401.

use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use axum_extra::extract::cookie::CookieJar;
use serde_json::json;
use tracing::error;

use super::AppState;

pub const SESSION_COOKIE: &str = "sb-access-token";

pub async fn session_gate(
    State(state): State<AppState>,
    jar: CookieJar,
    request: Request,
    next: Next,
) -> Response {
    let token = bearer_token(&request).or_else(|| {
        jar.get(SESSION_COOKIE)
            .map(|cookie| cookie.value().to_string())
    });

    let Some(token) = token else {
        return unauthenticated(&state, &request);
    };

    match state.sessions.verify(&token).await {
        Ok(Some(user)) => {
            let mut request = request;
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Ok(None) => unauthenticated(&state, &request),
        Err(e) => {
            error!("Session verification failed: {e}");
            (
                StatusCode::BAD_GATEWAY,
                Json(json!({ "error": e.to_string() })),
            )
                .into_response()
        }
    }
}

fn bearer_token(request: &Request) -> Option<String> {
    request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|t| t.to_string())
}

fn unauthenticated(state: &AppState, request: &Request) -> Response {
    let wants_html = request
        .headers()
        .get(header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        .map(|accept| accept.contains("text/html"))
        .unwrap_or(false);

    if wants_html {
        Redirect::temporary(&state.config.auth.login_url).into_response()
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "authentication required" })),
        )
            .into_response()
    }
}
