//! # HTTP Routes
//!
//! Router assembly. One module per endpoint.

mod auth;
mod buy;
mod info;
mod send_coin;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::Router;

use crate::error::ApiError;
use crate::AppState;

/// Builds the full application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/auth", post(auth::auth_handler))
        .route("/api/info", get(info::info_handler))
        .route("/api/buy/{item}", get(buy::buy_handler))
        .route("/api/sendCoin", post(send_coin::send_coin_handler))
        .route("/health", get(health_handler))
        .with_state(state)
}

/// Liveness plus a database round-trip.
async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    if state.db.health_check().await {
        (StatusCode::OK, "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "database unavailable")
    }
}

/// Maps axum's JSON rejections onto the shop's error body.
pub(crate) fn bad_json(rejection: JsonRejection) -> ApiError {
    ApiError::bad_request(format!("invalid request body: {}", rejection.body_text()))
}
