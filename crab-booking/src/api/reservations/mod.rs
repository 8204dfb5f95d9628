//! Reservation API 模块
//!
//! | 路径 | 方法 | 认证 |
//! |------|------|------|
//! | /api/reservations | POST | 用户 |
//! | /api/reservations/my | GET | 用户 |
//! | /api/reservations/admin/all | GET | 管理员 |
//! | /api/reservations/admin/{id} | DELETE | 管理员 |
//! | /api/reservations/admin/{id}/cancel | POST | 管理员 |

mod handler;

use axum::{
    Router, middleware,
    routing::{delete, get, post},
};

use crate::auth::require_admin;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/reservations", routes())
}

fn routes() -> Router<ServerState> {
    let user_routes = Router::new()
        .route("/", post(handler::create))
        .route("/my", get(handler::list_mine));

    let admin_routes = Router::new()
        .route("/admin/all", get(handler::list_all))
        .route("/admin/{id}", delete(handler::delete))
        .route("/admin/{id}/cancel", post(handler::cancel))
        .route_layer(middleware::from_fn(require_admin));

    user_routes.merge(admin_routes)
}
