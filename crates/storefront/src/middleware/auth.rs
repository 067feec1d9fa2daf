//! Credential extraction.
//!
//! The browser never holds the gateway token directly: the login proxy put
//! it in an HTTP-only cookie, and these extractors read it back — fresh on
//! every request, never cached beyond it — as the single credential
//! provider for all gateway call sites. The value is wrapped in
//! `SecretString` so it cannot leak through `Debug` logging.

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use secrecy::{ExposeSecret, SecretString};

use crate::error::AppError;

/// Cookie the login proxy writes the gateway token into.
pub const AUTH_COOKIE: &str = "auth-token";

/// Legacy cookie names still accepted from older sessions.
const FALLBACK_COOKIES: [&str; 2] = ["access_token", "token"];

/// Extractor that requires a bearer credential.
///
/// Rejects with the distinct "not logged in" envelope when absent; the
/// gateway stays the authority on whether the token is actually valid.
pub struct BearerToken(SecretString);

impl BearerToken {
    /// The raw token, for handing to a gateway call.
    #[must_use]
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        extract_token(parts).map_or(Err(AppError::Unauthorized), |token| Ok(Self(token)))
    }
}

/// Extractor that optionally reads the credential.
///
/// For endpoints that work anonymously but forward the token when present.
pub struct OptionalToken(pub Option<SecretString>);

impl OptionalToken {
    /// The raw token, if any.
    #[must_use]
    pub fn expose(&self) -> Option<&str> {
        self.0.as_ref().map(ExposeSecret::expose_secret)
    }
}

impl<S> FromRequestParts<S> for OptionalToken
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(extract_token(parts)))
    }
}

/// Read the credential from the request: an explicit `Authorization:
/// Bearer` header wins, then the auth cookie, then the legacy names.
fn extract_token(parts: &Parts) -> Option<SecretString> {
    if let Some(value) = parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .filter(|v| !v.is_empty())
    {
        return Some(SecretString::from(value.to_string()));
    }

    let cookies = parts
        .headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|h| h.to_str().ok())
        .flat_map(|h| h.split(';'))
        .filter_map(|pair| {
            let (name, value) = pair.trim().split_once('=')?;
            Some((name.trim(), value.trim()))
        })
        .collect::<Vec<_>>();

    std::iter::once(AUTH_COOKIE)
        .chain(FALLBACK_COOKIES)
        .find_map(|wanted| {
            cookies
                .iter()
                .find(|(name, value)| *name == wanted && !value.is_empty())
                .map(|(_, value)| SecretString::from((*value).to_string()))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts_with(headers: &[(&str, &str)]) -> Parts {
        let mut builder = Request::builder().uri("/");
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        let (parts, ()) = builder.body(()).expect("request").into_parts();
        parts
    }

    #[test]
    fn test_auth_cookie_is_read() {
        let parts = parts_with(&[("cookie", "theme=dark; auth-token=tok123")]);
        let token = extract_token(&parts).expect("token");
        assert_eq!(token.expose_secret(), "tok123");
    }

    #[test]
    fn test_fallback_cookie_names_accepted_in_order() {
        let parts = parts_with(&[("cookie", "token=old; access_token=newer")]);
        let token = extract_token(&parts).expect("token");
        assert_eq!(token.expose_secret(), "newer");
    }

    #[test]
    fn test_authorization_header_wins_over_cookie() {
        let parts = parts_with(&[
            ("cookie", "auth-token=cookie-tok"),
            ("authorization", "Bearer header-tok"),
        ]);
        let token = extract_token(&parts).expect("token");
        assert_eq!(token.expose_secret(), "header-tok");
    }

    #[test]
    fn test_absent_credential_yields_none() {
        let parts = parts_with(&[("cookie", "theme=dark")]);
        assert!(extract_token(&parts).is_none());
    }

    #[test]
    fn test_empty_cookie_value_is_ignored() {
        let parts = parts_with(&[("cookie", "auth-token=")]);
        assert!(extract_token(&parts).is_none());
    }
}
