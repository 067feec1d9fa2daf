//! Auth proxy handlers.
//!
//! Login forwards the credentials to the gateway, peels the access token
//! off the response, and stores it in an HTTP-only cookie the browser can
//! never read — every later gateway call picks it back up through the
//! credential extractors.

use axum::{
    Json,
    extract::State,
    http::header::SET_COOKIE,
    response::{AppendHeaders, IntoResponse, Response},
};
use lotus_core::Envelope;
use reqwest::Method;
use serde::Deserialize;
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::middleware::auth::AUTH_COOKIE;
use crate::middleware::{BearerToken, OptionalToken};
use crate::routes::relayed;
use crate::state::AppState;

/// Cookie lifetime: 24 hours, matching the gateway token's validity.
const COOKIE_MAX_AGE_SECS: u64 = 24 * 60 * 60;

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

fn session_cookie(token: &str, secure: bool) -> String {
    let secure = if secure { "; Secure" } else { "" };
    format!(
        "{AUTH_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={COOKIE_MAX_AGE_SECS}{secure}"
    )
}

fn expired_cookie(secure: bool) -> String {
    let secure = if secure { "; Secure" } else { "" };
    format!("{AUTH_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0{secure}")
}

/// Log in through the gateway and set the auth cookie.
#[instrument(skip(state, form))]
pub async fn login(
    State(state): State<AppState>,
    Json(form): Json<LoginForm>,
) -> Result<Response> {
    if form.username.trim().is_empty() || form.password.is_empty() {
        return Err(AppError::BadRequest(
            "Vui lòng nhập tên đăng nhập và mật khẩu".to_string(),
        ));
    }

    let data = state.gateway().login(&form.username, &form.password).await?;
    let Some(token) = data.access_token else {
        // login() guarantees the token, but do not panic on a contract slip
        return Err(AppError::Internal("login without token".to_string()));
    };

    let cookie = session_cookie(&token, state.config().cookie_secure);
    let body = Envelope::ok(serde_json::Value::Object(data.user));
    Ok((AppendHeaders([(SET_COOKIE, cookie)]), Json(body)).into_response())
}

/// Log out: best-effort gateway invalidation, then clear the cookie.
///
/// The cookie is cleared even when the gateway call fails — the browser
/// session ends either way.
#[instrument(skip(state, token))]
pub async fn logout(State(state): State<AppState>, token: OptionalToken) -> Response {
    if let Some(token) = token.expose() {
        if let Err(e) = state.gateway().logout(token).await {
            tracing::warn!("gateway logout failed: {e}");
        }
        state.carts().evict(token).await;
    }

    let cookie = expired_cookie(state.config().cookie_secure);
    let body = Envelope::<()>::ok(());
    (AppendHeaders([(SET_COOKIE, cookie)]), Json(body)).into_response()
}

/// Relay a registration request.
#[instrument(skip(state, body))]
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<serde_json::Value>,
) -> Result<Response> {
    let response = state
        .gateway()
        .relay(Method::POST, "/api/v1/auth/register", None, Some(body))
        .await?;
    Ok(relayed(response))
}

/// Relay the signed-in user's profile.
#[instrument(skip(state, token))]
pub async fn me(State(state): State<AppState>, token: BearerToken) -> Result<Response> {
    let response = state
        .gateway()
        .relay(Method::GET, "/api/v1/me", Some(token.expose()), None)
        .await?;
    Ok(relayed(response))
}
