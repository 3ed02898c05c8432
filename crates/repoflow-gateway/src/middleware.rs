//! Basic-auth middleware
//!
//! Everything except `/health` and `/webhook` is behind HTTP basic auth.
//! When no password is configured, auth is disabled entirely; `/health`
//! exposes that state so the insecure bootstrap mode is visible.

use axum::{
    body::Body,
    extract::State,
    http::{header, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};

use crate::state::AppState;

/// Paths that never require auth
const OPEN_PATHS: &[&str] = &["/health", "/webhook"];

/// Authentication middleware
pub async fn auth_middleware(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let path = request.uri().path();
    if OPEN_PATHS.contains(&path) {
        return next.run(request).await;
    }
    let Some(credentials) = &state.auth else {
        // insecure bootstrap mode
        return next.run(request).await;
    };

    let authorized = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(|value| check_basic(value, &credentials.0, &credentials.1))
        .unwrap_or(false);

    if authorized {
        next.run(request).await
    } else {
        (
            StatusCode::UNAUTHORIZED,
            [(header::WWW_AUTHENTICATE, "Basic realm=\"repoflow\"")],
            "authentication required",
        )
            .into_response()
    }
}

fn check_basic(header_value: &str, username: &str, password: &str) -> bool {
    let Some(encoded) = header_value.strip_prefix("Basic ") else {
        return false;
    };
    let Ok(decoded) = BASE64.decode(encoded.trim()) else {
        return false;
    };
    let Ok(pair) = String::from_utf8(decoded) else {
        return false;
    };
    match pair.split_once(':') {
        Some((user, pass)) => constant_time_eq(user, username) & constant_time_eq(pass, password),
        None => false,
    }
}

/// Length-insensitive constant-time string comparison
fn constant_time_eq(a: &str, b: &str) -> bool {
    let a = a.as_bytes();
    let b = b.as_bytes();
    let mut diff = a.len() ^ b.len();
    for i in 0..a.len().max(b.len()) {
        let x = a.get(i).copied().unwrap_or(0);
        let y = b.get(i).copied().unwrap_or(0);
        diff |= (x ^ y) as usize;
    }
    diff == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(user: &str, pass: &str) -> String {
        format!("Basic {}", BASE64.encode(format!("{}:{}", user, pass)))
    }

    #[test]
    fn accepts_matching_credentials() {
        assert!(check_basic(&encode("admin", "s3cret"), "admin", "s3cret"));
    }

    #[test]
    fn rejects_wrong_password_and_user() {
        assert!(!check_basic(&encode("admin", "nope"), "admin", "s3cret"));
        assert!(!check_basic(&encode("root", "s3cret"), "admin", "s3cret"));
    }

    #[test]
    fn rejects_malformed_headers() {
        assert!(!check_basic("Bearer token", "admin", "s3cret"));
        assert!(!check_basic("Basic !!!not-base64!!!", "admin", "s3cret"));
        assert!(!check_basic(&format!("Basic {}", BASE64.encode("no-colon")), "admin", "s3cret"));
    }

    #[test]
    fn constant_time_eq_basics() {
        assert!(constant_time_eq("abc", "abc"));
        assert!(!constant_time_eq("abc", "abd"));
        assert!(!constant_time_eq("abc", "abcd"));
        assert!(constant_time_eq("", ""));
    }
}
