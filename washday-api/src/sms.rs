use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{json, Value};

use washday_core::notify::SmsError;
use washday_order::intake::is_valid_phone;
use washday_shared::pii::Masked;

use crate::state::AppState;

pub const MAX_MESSAGE_CHARS: usize = 1600;

type JsonError = (StatusCode, Json<Value>);

fn reject(status: StatusCode, error: &str) -> JsonError {
    (status, Json(json!({ "error": error })))
}

#[derive(Debug, Deserialize)]
pub struct SendSmsRequest {
    pub to: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MpesaAlertRequest {
    pub customer_name: Option<String>,
    pub order_number: Option<String>,
    pub amount_paid: Option<Decimal>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/sms/send", post(send_sms))
        .route("/v1/alerts/mpesa", post(send_mpesa_alert))
}

/// Check an outbound SMS request, returning the trimmed phone and message.
pub fn validate_sms(req: &SendSmsRequest) -> Result<(String, String), &'static str> {
    let to = req.to.as_deref().map(str::trim).unwrap_or_default();
    let message = req.message.as_deref().unwrap_or_default();

    if to.is_empty() || message.is_empty() {
        return Err("Phone number and message are required");
    }
    if !is_valid_phone(to) {
        return Err("Invalid phone number format");
    }
    if message.chars().count() > MAX_MESSAGE_CHARS {
        return Err("Message must be 1600 characters or fewer");
    }
    Ok((to.to_string(), message.to_string()))
}

pub fn mpesa_alert_message(customer_name: &str, order_number: &str, amount_paid: Decimal) -> String {
    format!(
        "MPESA PAYMENT ALERT\nCustomer: {}\nOrder #: {}\nAmount: KES {:.2}",
        customer_name,
        order_number,
        amount_paid.round_dp(2)
    )
}

/// POST /v1/sms/send
pub async fn send_sms(
    State(state): State<AppState>,
    Json(req): Json<SendSmsRequest>,
) -> Result<Json<Value>, JsonError> {
    let (to, message) = validate_sms(&req).map_err(|e| reject(StatusCode::BAD_REQUEST, e))?;

    match state.sms.send_sms(&to, &message).await {
        Ok(receipt) => Ok(Json(json!({
            "success": true,
            "data": {
                "messageId": receipt.message_id,
                "status": receipt.status,
                "cost": receipt.cost,
            }
        }))),
        Err(SmsError::Rejected { details, .. }) => {
            tracing::warn!("SMS to {} rejected by provider", Masked(to.as_str()));
            Err((
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "SMS provider rejected the message", "details": details })),
            ))
        }
        Err(SmsError::NotConfigured) => {
            tracing::error!("SMS requested but provider credentials are missing");
            Err(reject(StatusCode::INTERNAL_SERVER_ERROR, "SMS provider credentials not configured"))
        }
        Err(e @ SmsError::Transport(_)) => {
            tracing::error!("SMS function error: {}", e);
            Err(reject(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string()))
        }
    }
}

/// POST /v1/alerts/mpesa
/// Texts the shop phone when a customer pays by M-Pesa
pub async fn send_mpesa_alert(
    State(state): State<AppState>,
    Json(req): Json<MpesaAlertRequest>,
) -> Result<Json<Value>, JsonError> {
    let customer_name = req.customer_name.as_deref().map(str::trim).unwrap_or_default();
    let order_number = req.order_number.as_deref().map(str::trim).unwrap_or_default();
    let amount_paid = req.amount_paid.unwrap_or_default();

    if customer_name.is_empty() || order_number.is_empty() || amount_paid.is_zero() {
        return Err(reject(
            StatusCode::BAD_REQUEST,
            "Missing required fields: customerName, orderNumber, or amountPaid",
        ));
    }

    let body = mpesa_alert_message(customer_name, order_number, amount_paid);
    tracing::info!("Sending M-Pesa alert for order {}", order_number);

    match state.payment_alerts.send_alert(&body).await {
        Ok(sid) => Ok(Json(json!({
            "success": true,
            "message": "SMS alert sent successfully",
            "twilioMessageSid": sid,
        }))),
        Err(SmsError::NotConfigured) => {
            tracing::error!("Missing Twilio credentials");
            Err(reject(StatusCode::INTERNAL_SERVER_ERROR, "Twilio credentials not configured"))
        }
        Err(SmsError::Rejected { details, .. }) => {
            let reason = details
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("request rejected");
            Err(reject(
                StatusCode::INTERNAL_SERVER_ERROR,
                &format!("Twilio API error: {}", reason),
            ))
        }
        Err(e @ SmsError::Transport(_)) => {
            tracing::error!("Error sending M-Pesa alert: {}", e);
            Err(reject(StatusCode::INTERNAL_SERVER_ERROR, "Failed to send SMS alert"))
        }
    }
}
