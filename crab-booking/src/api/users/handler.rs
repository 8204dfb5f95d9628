//! User directory API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use shared::error::AppResult;
use shared::models::{UserProfile, UserUpsert};

use crate::core::ServerState;

/// PUT /api/admin/users/:id - 新增或更新用户资料
pub async fn upsert(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<UserUpsert>,
) -> AppResult<Json<UserProfile>> {
    Ok(Json(state.users.upsert(id, payload)?))
}
