//! `POST /api/auth` - login, registering unknown usernames on the fly.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use merch_core::validation::{validate_password, validate_username};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::account::authenticate_or_register;
use crate::error::ApiError;
use crate::routes::bad_json;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct AuthRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
}

pub async fn auth_handler(
    State(state): State<AppState>,
    payload: Result<Json<AuthRequest>, JsonRejection>,
) -> Result<Json<AuthResponse>, ApiError> {
    let Json(request) = payload.map_err(bad_json)?;

    validate_username(&request.username)?;
    validate_password(&request.password)?;

    debug!(username = %request.username, "auth request");

    let user = authenticate_or_register(&state.db, &request.username, &request.password).await?;
    let token = state.jwt.generate_token(&user)?;

    Ok(Json(AuthResponse { token }))
}
