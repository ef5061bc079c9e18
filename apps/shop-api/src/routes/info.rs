//! `GET /api/info` - balance, inventory and coin history of the caller.

use axum::extract::State;
use axum::Json;
use merch_core::UserInfo;

use crate::account::user_info;
use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::AppState;

pub async fn info_handler(
    State(state): State<AppState>,
    caller: AuthUser,
) -> Result<Json<UserInfo>, ApiError> {
    let info = user_info(&state.db, caller.user_id).await?;
    Ok(Json(info))
}
