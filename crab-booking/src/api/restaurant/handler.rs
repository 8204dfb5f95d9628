//! Restaurant configuration API Handlers

use axum::{Json, extract::State};
use shared::error::AppResult;
use shared::models::{RestaurantConfig, RestaurantConfigUpdate};

use crate::auth::CurrentUser;
use crate::core::ServerState;

/// GET /api/restaurant - 当前餐厅配置
pub async fn get(State(state): State<ServerState>) -> AppResult<Json<RestaurantConfig>> {
    let config = state.catalog.restaurant_config()?;
    Ok(Json((*config).clone()))
}

/// PUT /api/admin/restaurant - 更新餐厅配置 (容量变更立即对后续预订生效)
pub async fn update(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<RestaurantConfigUpdate>,
) -> AppResult<Json<RestaurantConfig>> {
    let config = state.catalog.update_restaurant_config(payload)?;
    tracing::info!(admin_id = user.id, version = config.version, "Restaurant configuration changed");
    Ok(Json((*config).clone()))
}
