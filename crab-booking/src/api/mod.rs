//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`availability`] - 可用座位查询
//! - [`reservations`] - 预订 (用户 + 管理)
//! - [`timeslots`] - 时段目录
//! - [`restaurant`] - 餐厅配置
//! - [`users`] - 用户目录同步

pub mod availability;
pub mod health;
pub mod reservations;
pub mod restaurant;
pub mod timeslots;
pub mod users;

use crate::auth::require_auth;
use crate::booking::BookingResult;
use crate::core::ServerState;
use axum::{Router, middleware};
use shared::error::{AppError, AppResult};
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;

/// HTTP 请求日志中间件
async fn log_request(
    request: http::Request<axum::body::Body>,
    next: middleware::Next,
) -> http::Response<axum::body::Body> {
    let method = request.method().clone();
    let uri = request.uri().clone();

    let response = next.run(request).await;

    let status = response.status();

    tracing::info!(target: "http_access", "{} {} {}", method, uri, status);

    response
}

/// Build the Axum router (without state)
pub fn routes() -> Router<ServerState> {
    Router::<ServerState>::new()
        .merge(health::router())
        .merge(availability::router())
        .merge(reservations::router())
        .merge(timeslots::router())
        .merge(restaurant::router())
        .merge(users::router())
}

/// Build the full application with middleware and state
pub fn build_app(state: ServerState) -> Router {
    routes()
        // JWT 认证中间件 - require_auth 内部会跳过公共路由
        .layer(middleware::from_fn_with_state(state.clone(), require_auth))
        .with_state(state)
        // Tower HTTP 中间件
        .layer(CorsLayer::permissive())
        .layer(CompressionLayer::new())
        // HTTP 请求日志中间件
        .layer(middleware::from_fn(log_request))
}

/// 在阻塞线程池上运行预订操作
///
/// 准入在时段锁内同步写 redb，不能占用 async worker。
pub(crate) async fn run_blocking<T, F>(f: F) -> AppResult<T>
where
    F: FnOnce() -> BookingResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| AppError::internal(format!("Blocking task failed: {e}")))?
        .map_err(AppError::from)
}
