//! User directory API 模块
//!
//! 账户服务在用户注册或修改资料后推送到这里。

mod handler;

use axum::{Router, middleware, routing::put};

use crate::auth::require_admin;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/admin/users/{id}", put(handler::upsert))
        .route_layer(middleware::from_fn(require_admin))
}
