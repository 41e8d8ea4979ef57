use axum::{
    extract::State,
    http::header,
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use washday_core::repository::OrderFilter;
use washday_order::lifecycle::today;
use washday_order::report::{csv_filename, orders_csv, DashboardStats, ReportSummary};

use crate::error::{store_error, AppError};
use crate::state::AppState;

/// Counter dashboard; any signed-in staff.
pub fn routes() -> Router<AppState> {
    Router::new().route("/v1/dashboard/stats", get(dashboard_stats))
}

/// Mounted behind `require_admin`.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/v1/reports/summary", get(report_summary))
        .route("/v1/reports/orders.csv", get(export_csv))
}

pub async fn dashboard_stats(State(state): State<AppState>) -> Result<Json<DashboardStats>, AppError> {
    let orders = state.orders.list_orders(&OrderFilter::default()).await.map_err(store_error)?;
    Ok(Json(DashboardStats::from_orders(&orders)))
}

pub async fn report_summary(State(state): State<AppState>) -> Result<Json<ReportSummary>, AppError> {
    let orders = state.orders.list_orders(&OrderFilter::default()).await.map_err(store_error)?;
    Ok(Json(ReportSummary::from_orders(&orders)))
}

pub async fn export_csv(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let orders = state.orders.list_orders(&OrderFilter::default()).await.map_err(store_error)?;
    let body = orders_csv(&orders);
    tracing::info!("Exported {} orders", orders.len());

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", csv_filename(today())),
            ),
        ],
        body,
    ))
}
