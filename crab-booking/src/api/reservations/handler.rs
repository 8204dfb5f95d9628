//! Reservation API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::NaiveDate;
use serde::Deserialize;
use shared::error::{AppError, AppResult};
use shared::models::{BookingRequest, DeletedReservation, ReservationView};

use crate::api::run_blocking;
use crate::auth::CurrentUser;
use crate::core::ServerState;

/// 管理端列表过滤条件
#[derive(Debug, Default, Deserialize)]
pub struct AdminListQuery {
    /// `YYYY-MM-DD`
    pub date: Option<String>,
    pub timeslot_id: Option<i64>,
}

/// POST /api/reservations - 创建预订
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<BookingRequest>,
) -> AppResult<(StatusCode, Json<ReservationView>)> {
    let admission = state.admission.clone();
    let view = run_blocking(move || admission.book(user.id, payload)).await?;
    Ok((StatusCode::CREATED, Json(view)))
}

/// GET /api/reservations/my - 当前用户的有效预订
pub async fn list_mine(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<Vec<ReservationView>>> {
    let views = state.admission.list_for_user(user.id)?;
    Ok(Json(views))
}

/// GET /api/reservations/admin/all - 所有有效预订，可按日期/时段过滤
pub async fn list_all(
    State(state): State<ServerState>,
    Query(query): Query<AdminListQuery>,
) -> AppResult<Json<Vec<ReservationView>>> {
    let date = query
        .date
        .as_deref()
        .map(|raw| NaiveDate::parse_from_str(raw, "%Y-%m-%d"))
        .transpose()
        .map_err(|_| AppError::validation("Invalid date format. Use YYYY-MM-DD"))?;

    let views = state.admission.list_all(date, query.timeslot_id)?;
    Ok(Json(views))
}

/// DELETE /api/reservations/admin/:id - 删除预订
pub async fn delete(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<DeletedReservation>> {
    let deleted = state.admission.cancel(id)?;
    tracing::info!(reservation_id = id, admin_id = user.id, "Reservation deleted by admin");
    Ok(Json(DeletedReservation {
        message: "Reservation deleted successfully".to_string(),
        deleted_reservation: deleted,
    }))
}

/// POST /api/reservations/admin/:id/cancel - 标记取消 (保留记录)
pub async fn cancel(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<ReservationView>> {
    let cancelled = state.admission.mark_cancelled(id)?;
    tracing::info!(reservation_id = id, admin_id = user.id, "Reservation cancelled by admin");
    Ok(Json(cancelled))
}
