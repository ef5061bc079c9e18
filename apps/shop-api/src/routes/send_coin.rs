//! `POST /api/sendCoin` - transfer coins from the caller to another user.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use merch_core::validation::validate_username;
use merch_core::Coins;
use serde::Deserialize;

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::routes::bad_json;
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendCoinRequest {
    pub to_user: String,
    pub amount: i64,
}

pub async fn send_coin_handler(
    State(state): State<AppState>,
    caller: AuthUser,
    payload: Result<Json<SendCoinRequest>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let Json(request) = payload.map_err(bad_json)?;

    validate_username(&request.to_user)?;

    state
        .transfers
        .transfer(caller.user_id, &request.to_user, Coins::new(request.amount))
        .await?;

    Ok(StatusCode::OK)
}
