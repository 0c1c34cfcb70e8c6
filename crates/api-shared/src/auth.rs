use axum::http::{HeaderMap, StatusCode};

/// Header carrying the opaque session token issued at login.
pub const SESSION_TOKEN_HEADER: &str = "x-session-token";

/// Extracts the session token from request headers.
///
/// Returns `401 Unauthorized` when the header is missing or not valid
/// UTF-8. The token itself is validated against the session registry by the
/// caller.
pub fn session_token(headers: &HeaderMap) -> Result<&str, (StatusCode, &'static str)> {
    headers
        .get(SESSION_TOKEN_HEADER)
        .and_then(|value| value.to_str().ok())
        .filter(|token| !token.is_empty())
        .ok_or((StatusCode::UNAUTHORIZED, "Missing session token"))
}
