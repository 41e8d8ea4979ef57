use axum::{http::Method, routing::get, Json, Router};
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod auth;
pub mod changes;
pub mod clothing;
pub mod error;
pub mod middleware;
pub mod notifications;
pub mod orders;
pub mod payments;
pub mod reports;
pub mod sms;
pub mod state;
pub mod worker;

pub use state::{AppState, AuthConfig};

pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
            axum::http::header::USER_AGENT,
        ]);

    let admin = reports::admin_routes()
        .route_layer(axum::middleware::from_fn(middleware::require_admin));

    let staff = Router::new()
        .merge(auth::routes())
        .merge(orders::routes())
        .merge(payments::routes())
        .merge(clothing::routes())
        .merge(reports::routes())
        .merge(sms::routes())
        .merge(changes::routes())
        .merge(admin)
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::staff_auth_middleware,
        ));

    Router::new()
        .route("/health", get(health))
        .merge(auth::public_routes())
        .merge(staff)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::rate_limit_middleware,
        ))
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
