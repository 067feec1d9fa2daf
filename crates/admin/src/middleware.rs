//! Operator credential extraction.
//!
//! Every admin operation requires the operator's gateway token. It lives
//! in the same HTTP-only cookie the storefront login sets; the gateway
//! decides what the token is actually allowed to do.

use axum::{
    Json,
    extract::FromRequestParts,
    http::{StatusCode, header, request::Parts},
    response::{IntoResponse, Response},
};
use lotus_core::Envelope;
use secrecy::{ExposeSecret, SecretString};

/// Cookie carrying the gateway token.
pub const AUTH_COOKIE: &str = "auth-token";

/// Extractor that requires the operator token.
pub struct RequireToken(SecretString);

impl RequireToken {
    /// The raw token, for handing to a relay call.
    #[must_use]
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

/// Rejection when no token is present: a 401 envelope.
pub struct MissingToken;

impl IntoResponse for MissingToken {
    fn into_response(self) -> Response {
        (
            StatusCode::UNAUTHORIZED,
            Json(Envelope::<()>::error("Unauthorized")),
        )
            .into_response()
    }
}

impl<S> FromRequestParts<S> for RequireToken
where
    S: Send + Sync,
{
    type Rejection = MissingToken;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        token_from_headers(parts).map_or(Err(MissingToken), |token| Ok(Self(token)))
    }
}

fn token_from_headers(parts: &Parts) -> Option<SecretString> {
    if let Some(bearer) = parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .filter(|v| !v.is_empty())
    {
        return Some(SecretString::from(bearer.to_string()));
    }

    parts
        .headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|h| h.to_str().ok())
        .flat_map(|h| h.split(';'))
        .find_map(|pair| {
            let (name, value) = pair.trim().split_once('=')?;
            (name.trim() == AUTH_COOKIE && !value.trim().is_empty())
                .then(|| SecretString::from(value.trim().to_string()))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts(cookie: &str) -> Parts {
        let (parts, ()) = Request::builder()
            .uri("/")
            .header("cookie", cookie)
            .body(())
            .expect("request")
            .into_parts();
        parts
    }

    #[test]
    fn test_cookie_token_is_read() {
        let token = token_from_headers(&parts("auth-token=abc")).expect("token");
        assert_eq!(token.expose_secret(), "abc");
    }

    #[test]
    fn test_missing_token_rejected() {
        assert!(token_from_headers(&parts("theme=dark")).is_none());
    }
}
