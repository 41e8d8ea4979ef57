use async_trait::async_trait;
use serde::Serialize;

/// What the SMS provider reported for a single recipient.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SmsReceipt {
    pub message_id: Option<String>,
    pub status: String,
    pub status_code: i64,
    pub cost: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum SmsError {
    #[error("SMS service not configured")]
    NotConfigured,

    #[error("Provider rejected message")]
    Rejected {
        status_code: Option<i64>,
        details: serde_json::Value,
    },

    #[error("Provider unreachable: {0}")]
    Transport(String),
}

/// Outbound customer SMS.
#[async_trait]
pub trait SmsGateway: Send + Sync {
    async fn send_sms(&self, to: &str, message: &str) -> Result<SmsReceipt, SmsError>;
}

/// Outbound staff alert for incoming mobile-money payments. Returns the
/// provider's message id.
#[async_trait]
pub trait PaymentAlertGateway: Send + Sync {
    async fn send_alert(&self, body: &str) -> Result<String, SmsError>;
}
