//! Admin authentication
//!
//! Bearer key check for the `/admin/*` routes. Question-answering routes stay
//! open. With no `server.admin_api_key` configured the admin routes are open
//! too, for trusted networks and local development.

use std::sync::atomic::{AtomicBool, Ordering};

use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::state::AppState;

/// Warn once when admin routes run without a key
static ADMIN_OPEN_WARNED: AtomicBool = AtomicBool::new(false);

/// Require `Authorization: Bearer <server.admin_api_key>`
pub async fn admin_auth(State(state): State<AppState>, request: Request, next: Next) -> Response {
    // Copy out so the config guard is not held across the await
    let expected = state
        .get_config()
        .server
        .admin_api_key
        .clone()
        .filter(|key| !key.is_empty());

    let Some(expected) = expected else {
        if !ADMIN_OPEN_WARNED.swap(true, Ordering::Relaxed) {
            tracing::warn!(
                "Admin routes are unauthenticated; set COMPLIANCE_ASSIST__SERVER__ADMIN_API_KEY"
            );
        }
        return next.run(request).await;
    };

    let provided = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    match provided {
        Some(value) => match value.strip_prefix("Bearer ") {
            Some(key) if constant_time_compare(key.as_bytes(), expected.as_bytes()) => {
                next.run(request).await
            },
            Some(_) => {
                tracing::warn!(path = %request.uri().path(), "Invalid admin API key");
                (StatusCode::UNAUTHORIZED, "Invalid API key").into_response()
            },
            None => (
                StatusCode::BAD_REQUEST,
                "Invalid Authorization header format. Expected: Bearer <token>",
            )
                .into_response(),
        },
        None => (StatusCode::UNAUTHORIZED, "Missing Authorization header").into_response(),
    }
}

fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}
