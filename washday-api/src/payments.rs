use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Extension, Json, Router,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

use washday_order::{Payment, PaymentMethod};
use washday_shared::models::events::RecordChangedEvent;

use crate::error::{store_error, AppError};
use crate::middleware::auth::StaffClaims;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RecordPaymentRequest {
    pub amount: Decimal,
    pub payment_method: PaymentMethod,
    pub reference_number: Option<String>,
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/v1/orders/{id}/payments", get(list_payments).post(record_payment))
}

/// POST /v1/orders/{id}/payments
/// Audit entry only; the order's amount paid is left alone.
pub async fn record_payment(
    State(state): State<AppState>,
    Extension(claims): Extension<StaffClaims>,
    Path(order_id): Path<Uuid>,
    Json(req): Json<RecordPaymentRequest>,
) -> Result<(StatusCode, Json<Payment>), AppError> {
    if req.amount <= Decimal::ZERO {
        return Err(AppError::ValidationError("Payment amount must be positive".into()));
    }

    state
        .orders
        .get_order(order_id)
        .await
        .map_err(store_error)?
        .ok_or_else(|| AppError::NotFoundError(format!("Order {} not found", order_id)))?;

    let reference = req.reference_number.filter(|r| !r.trim().is_empty());
    let payment = Payment::new(order_id, req.amount, req.payment_method, reference, Some(claims.sub));
    state.payments.record_payment(&payment).await.map_err(store_error)?;
    state.publish(RecordChangedEvent::payment_inserted(payment.id));

    Ok((StatusCode::CREATED, Json(payment)))
}

/// GET /v1/orders/{id}/payments
pub async fn list_payments(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
) -> Result<Json<Vec<Payment>>, AppError> {
    let payments = state.payments.list_payments(order_id).await.map_err(store_error)?;
    Ok(Json(payments))
}
