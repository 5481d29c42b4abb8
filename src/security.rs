use crate::api::AppState;
use crate::error::ApiError;
use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::{AUTHORIZATION, COOKIE};
use axum::http::request::Parts;
use axum::http::HeaderMap;
use subtle::ConstantTimeEq;
use tracing::warn;

pub const SESSION_COOKIE: &str = "admin_session";

/// Constant-time string comparison to prevent timing attacks
/// Use this for comparing session tokens and other sensitive values
pub fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

/// Token presented by the client, from the session cookie or a Bearer header.
pub fn presented_token(headers: &HeaderMap) -> Option<String> {
    let from_cookie = headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.trim().to_string());

    from_cookie.or_else(|| {
        headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(|token| token.trim().to_string())
    })
}

/// Proof that the request carries a valid admin session.
///
/// Add it as a handler argument to require authentication; rejected requests
/// get a 401 JSON error.
#[derive(Debug, Clone, Copy)]
pub struct AdminSession;

#[async_trait]
impl FromRequestParts<AppState> for AdminSession {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Some(expected) = state.config.admin_session_token.as_deref() else {
            warn!("Admin request rejected: ADMIN_SESSION_TOKEN is not configured");
            return Err(ApiError::Unauthorized);
        };

        match presented_token(&parts.headers) {
            Some(token) if constant_time_compare(&token, expected) => Ok(AdminSession),
            Some(_) => {
                warn!("Admin request rejected: invalid session token");
                Err(ApiError::Unauthorized)
            }
            None => Err(ApiError::Unauthorized),
        }
    }
}
