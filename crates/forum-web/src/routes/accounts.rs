use axum::{
    Form, Json,
    extract::State,
    http::{HeaderMap, StatusCode, header::SET_COOKIE},
    response::IntoResponse,
};
use forum_core::entities::User;
use forum_core::input::Registration;
use forum_core::responses::Dashboard;
use serde::{Deserialize, Serialize};

use crate::auth::{CurrentUser, clear_session_cookie, session_cookie, session_token};
use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RegisterForm {
    username: String,
    password1: String,
    password2: String,
}

pub async fn register(
    State(state): State<AppState>,
    Form(form): Form<RegisterForm>,
) -> Result<(StatusCode, Json<User>), AppError> {
    let registration = Registration::parse(&form.username, &form.password1, &form.password2)?;
    let user = state.forum.register_user(&registration).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    username: String,
    password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    user: User,
    token: String,
}

pub async fn login(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> Result<impl IntoResponse, AppError> {
    let (user, token) = state
        .forum
        .login(form.username.trim(), &form.password)
        .await?;
    let cookie = session_cookie(
        state.cookie_name(),
        &token,
        state.config.auth.session_ttl_secs(),
    )?;
    Ok(([(SET_COOKIE, cookie)], Json(LoginResponse { user, token })))
}

/// Ends the caller's session, if there is one, and clears the cookie.
pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    if let Some(token) = session_token(&headers, state.cookie_name()) {
        state.forum.logout(&token).await?;
    }
    let cookie = clear_session_cookie(state.cookie_name())?;
    Ok((StatusCode::NO_CONTENT, [(SET_COOKIE, cookie)]))
}

pub async fn dashboard(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Dashboard>, AppError> {
    let questions = state.forum.questions_by_author(user.id).await?;
    Ok(Json(Dashboard { user, questions }))
}
