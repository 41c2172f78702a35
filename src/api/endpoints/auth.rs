//! Account and session endpoints.
//!
//! - `POST /api/auth/register` — create an account (does not log in)
//! - `POST /api/auth/login` — start a session
//! - `POST /api/auth/logout` — end the session
//! - `GET /api/auth/session` — current session user, if any

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::api::extract::ApiJson;
use crate::api::types::ApiContext;
use crate::authorization;
use crate::models::{NewUser, PublicUser};

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct UserResponse {
    pub user: PublicUser,
}

#[derive(Serialize)]
pub struct SessionResponse {
    pub user: Option<PublicUser>,
}

pub async fn register(
    State(ctx): State<ApiContext>,
    ApiJson(req): ApiJson<NewUser>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    if req.name.trim().is_empty() || req.email.trim().is_empty() || req.password.is_empty() {
        return Err(ApiError::BadRequest(
            "Name, email and password are required".into(),
        ));
    }
    let user = authorization::register(&ctx.repo, req)?;
    Ok((StatusCode::CREATED, Json(UserResponse { user })))
}

pub async fn login(
    State(ctx): State<ApiContext>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = authorization::login(&ctx.repo, &req.email, &req.password)?;
    Ok(Json(UserResponse { user }))
}

pub async fn logout(State(ctx): State<ApiContext>) -> Result<StatusCode, ApiError> {
    authorization::logout(&ctx.repo)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn session(State(ctx): State<ApiContext>) -> Result<Json<SessionResponse>, ApiError> {
    let user = authorization::current_user(&ctx.repo)?;
    Ok(Json(SessionResponse { user }))
}
