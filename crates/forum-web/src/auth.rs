//! Session extraction.
//!
//! A request is authenticated by a session token sent either as the session
//! cookie or as `Authorization: Bearer <token>`. The bearer header wins when
//! both are present.

use axum::{
    extract::FromRequestParts,
    http::{
        HeaderMap, HeaderValue,
        header::{AUTHORIZATION, COOKIE},
        request::Parts,
    },
};
use forum_core::entities::User;

use crate::error::AppError;
use crate::state::AppState;

/// The logged-in user. Rejects with 401 when there is no live session.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

/// The logged-in user, if any. Never rejects on a missing session.
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Option<User>);

/// Pull the session token out of request headers.
#[must_use]
pub fn session_token(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    let bearer = headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty());
    if let Some(token) = bearer {
        return Some(token.to_string());
    }

    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|h| h.to_str().ok())
        .flat_map(|h| h.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == cookie_name && !value.is_empty())
        .map(|(_, value)| value.to_string())
}

/// `Set-Cookie` value carrying a fresh session.
///
/// # Errors
///
/// Returns `AppError::Internal` if the token contains bytes not allowed in a
/// header.
pub fn session_cookie(cookie_name: &str, token: &str, max_age_secs: u64) -> Result<HeaderValue, AppError> {
    HeaderValue::from_str(&format!(
        "{cookie_name}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age_secs}"
    ))
    .map_err(|e| AppError::Internal(e.into()))
}

/// `Set-Cookie` value that makes the browser drop the session cookie.
///
/// # Errors
///
/// Returns `AppError::Internal` if the cookie name is not header-safe.
pub fn clear_session_cookie(cookie_name: &str) -> Result<HeaderValue, AppError> {
    HeaderValue::from_str(&format!(
        "{cookie_name}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0"
    ))
    .map_err(|e| AppError::Internal(e.into()))
}

impl FromRequestParts<AppState> for MaybeUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Some(token) = session_token(&parts.headers, state.cookie_name()) else {
            return Ok(Self(None));
        };
        let user = state.forum.user_for_session(&token).await?;
        Ok(Self(user))
    }
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let MaybeUser(user) = MaybeUser::from_request_parts(parts, state).await?;
        user.map(Self).ok_or(AppError::Unauthenticated)
    }
}
