use axum::{
    extract::{ConnectInfo, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::net::SocketAddr;

use crate::state::AppState;

pub const REQUESTS_PER_WINDOW: i64 = 100;
pub const WINDOW_SECONDS: i64 = 60;

/// Per-IP fixed window backed by Redis. Fails open when Redis errors, and is
/// a pass-through when no Redis is configured or the peer address is unknown.
pub async fn rate_limit_middleware(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Response {
    let peer = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip());

    let (Some(redis), Some(ip)) = (state.redis.as_ref(), peer) else {
        return next.run(req).await;
    };

    let key = format!("ratelimit:{}", ip);
    match redis.check_rate_limit(&key, REQUESTS_PER_WINDOW, WINDOW_SECONDS).await {
        Ok(true) => next.run(req).await,
        Ok(false) => (StatusCode::TOO_MANY_REQUESTS, "Rate limit exceeded").into_response(),
        Err(e) => {
            tracing::warn!("Rate limiter unavailable, allowing request: {}", e);
            next.run(req).await
        }
    }
}
