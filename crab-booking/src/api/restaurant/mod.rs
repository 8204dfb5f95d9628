//! Restaurant configuration API 模块

mod handler;

use axum::{
    Router, middleware,
    routing::{get, put},
};

use crate::auth::require_admin;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    let admin_routes = Router::new()
        .route("/api/admin/restaurant", put(handler::update))
        .route_layer(middleware::from_fn(require_admin));

    Router::new()
        .route("/api/restaurant", get(handler::get))
        .merge(admin_routes)
}
