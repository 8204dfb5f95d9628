//! Timeslot API Handlers

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use shared::error::AppResult;
use shared::models::{Timeslot, TimeslotCreate, TimeslotUpdate};

use crate::core::ServerState;

/// GET /api/timeslots - 活跃时段 (按开始时间排序)
pub async fn list_active(State(state): State<ServerState>) -> AppResult<Json<Vec<Timeslot>>> {
    Ok(Json(state.catalog.list_active()?))
}

/// GET /api/admin/timeslots - 所有时段
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<Timeslot>>> {
    Ok(Json(state.catalog.list_timeslots()?))
}

/// POST /api/admin/timeslots - 创建时段
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<TimeslotCreate>,
) -> AppResult<(StatusCode, Json<Timeslot>)> {
    let slot = state.catalog.create_timeslot(payload)?;
    Ok((StatusCode::CREATED, Json(slot)))
}

/// PATCH /api/admin/timeslots/:id - 修改时段
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<TimeslotUpdate>,
) -> AppResult<Json<Timeslot>> {
    Ok(Json(state.catalog.update_timeslot(id, payload)?))
}

/// DELETE /api/admin/timeslots/:id - 删除时段 (有有效预订时拒绝)
pub async fn delete(State(state): State<ServerState>, Path(id): Path<i64>) -> AppResult<StatusCode> {
    state.catalog.delete_timeslot(id)?;
    Ok(StatusCode::NO_CONTENT)
}
