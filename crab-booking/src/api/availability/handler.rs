//! Availability API Handlers

use axum::{
    Json,
    extract::{Query, State},
};
use chrono::NaiveDate;
use serde::Deserialize;
use shared::error::{AppError, AppResult};
use shared::models::AvailabilityDay;

use crate::booking::local_today;
use crate::core::ServerState;

/// 查询参数 (均为可选，保留字符串以便返回统一的校验错误)
#[derive(Debug, Default, Deserialize)]
pub struct AvailabilityQuery {
    /// 窗口起始日期 `YYYY-MM-DD`，默认今天
    pub start: Option<String>,
    /// 天数，默认 `AVAILABILITY_DAYS`
    pub days: Option<String>,
}

/// GET /api/availability - 未来 N 天每个活跃时段的剩余座位
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<AvailabilityQuery>,
) -> AppResult<Json<Vec<AvailabilityDay>>> {
    let start = match query.start.as_deref() {
        Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map_err(|_| AppError::validation("Invalid date format. Use YYYY-MM-DD"))?,
        None => local_today(),
    };
    let days = match query.days.as_deref() {
        Some(raw) => raw
            .parse::<u32>()
            .map_err(|_| AppError::validation("days must be a positive integer"))?,
        None => state.config.availability_days,
    };

    let projection = state.projector.project(start, days)?;
    Ok(Json(projection))
}
