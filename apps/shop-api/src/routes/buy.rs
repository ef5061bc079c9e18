//! `GET /api/buy/{item}` - buy one item for the caller.

use axum::extract::{Path, State};
use axum::http::StatusCode;

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::AppState;

pub async fn buy_handler(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(item): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.purchases.purchase(caller.user_id, &item).await?;
    Ok(StatusCode::OK)
}
