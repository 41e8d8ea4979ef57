use async_trait::async_trait;
use serde_json::Value;
use tracing::{error, info};

use washday_core::notify::{PaymentAlertGateway, SmsError, SmsGateway, SmsReceipt};
use washday_shared::pii::Masked;

use crate::app_config::{MpesaAlertConfig, SmsConfig};

/// Per-recipient codes Africa's Talking uses for accepted messages:
/// 100 Processed, 101 Sent, 102 Queued.
pub const ACCEPTED_STATUS_CODES: [i64; 3] = [100, 101, 102];

/// Africa's Talking bulk messaging client.
pub struct AfricasTalkingClient {
    http: reqwest::Client,
    endpoint: String,
    username: Option<String>,
    api_key: Option<String>,
    sender_id: Option<String>,
}

impl AfricasTalkingClient {
    pub fn new(config: &SmsConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: config.endpoint.clone(),
            username: config.username.clone().filter(|s| !s.is_empty()),
            api_key: config.api_key.clone().filter(|s| !s.is_empty()),
            sender_id: config.sender_id.clone().filter(|s| !s.is_empty()),
        }
    }
}

/// Decide the outcome from the provider's JSON. A 2xx with a rejected
/// recipient is still a rejection.
pub fn interpret_response(http_ok: bool, body: &Value) -> Result<SmsReceipt, SmsError> {
    let recipient = body
        .pointer("/SMSMessageData/Recipients/0")
        .cloned()
        .unwrap_or(Value::Null);
    let status_code = recipient.get("statusCode").and_then(Value::as_i64);

    match status_code {
        Some(code) if http_ok && ACCEPTED_STATUS_CODES.contains(&code) => Ok(SmsReceipt {
            message_id: recipient
                .get("messageId")
                .and_then(Value::as_str)
                .map(str::to_string),
            status: recipient
                .get("status")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            status_code: code,
            cost: recipient.get("cost").and_then(Value::as_str).map(str::to_string),
        }),
        _ => Err(SmsError::Rejected {
            status_code,
            details: body.clone(),
        }),
    }
}

#[async_trait]
impl SmsGateway for AfricasTalkingClient {
    async fn send_sms(&self, to: &str, message: &str) -> Result<SmsReceipt, SmsError> {
        let (Some(username), Some(api_key)) = (&self.username, &self.api_key) else {
            return Err(SmsError::NotConfigured);
        };

        let mut params = vec![
            ("username", username.as_str()),
            ("to", to),
            ("message", message),
        ];
        if let Some(from) = &self.sender_id {
            params.push(("from", from.as_str()));
        }

        let resp = self
            .http
            .post(&self.endpoint)
            .header("apiKey", api_key)
            .header("Accept", "application/json")
            .form(&params)
            .send()
            .await
            .map_err(|e| SmsError::Transport(e.to_string()))?;

        let http_ok = resp.status().is_success();
        let text = resp
            .text()
            .await
            .map_err(|e| SmsError::Transport(e.to_string()))?;
        let body: Value = serde_json::from_str(&text).unwrap_or(Value::String(text));

        match interpret_response(http_ok, &body) {
            Ok(receipt) => {
                info!(
                    "SMS accepted for {} (status {}, id {:?})",
                    Masked(to),
                    receipt.status_code,
                    receipt.message_id
                );
                Ok(receipt)
            }
            Err(e) => {
                error!("Africa's Talking rejected SMS to {}: {}", Masked(to), body);
                Err(e)
            }
        }
    }
}

/// Twilio client for the shop's payment alerts.
pub struct TwilioAlertClient {
    http: reqwest::Client,
    config: MpesaAlertConfig,
}

impl TwilioAlertClient {
    pub fn new(config: &MpesaAlertConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config: config.clone(),
        }
    }
}

#[async_trait]
impl PaymentAlertGateway for TwilioAlertClient {
    async fn send_alert(&self, body: &str) -> Result<String, SmsError> {
        let c = &self.config;
        let (Some(sid), Some(token), Some(from), Some(to)) =
            (&c.account_sid, &c.auth_token, &c.from_number, &c.shop_phone)
        else {
            return Err(SmsError::NotConfigured);
        };

        let url = format!("{}/Accounts/{}/Messages.json", c.api_base, sid);
        let resp = self
            .http
            .post(&url)
            .basic_auth(sid, Some(token))
            .form(&[("To", to.as_str()), ("From", from.as_str()), ("Body", body)])
            .send()
            .await
            .map_err(|e| SmsError::Transport(e.to_string()))?;

        let http_ok = resp.status().is_success();
        let data: Value = resp
            .json()
            .await
            .map_err(|e| SmsError::Transport(e.to_string()))?;

        if !http_ok {
            error!("Twilio rejected payment alert: {}", data);
            return Err(SmsError::Rejected {
                status_code: data.get("code").and_then(Value::as_i64),
                details: data,
            });
        }

        Ok(data
            .get("sid")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn body(status: &str, code: i64) -> Value {
        json!({
            "SMSMessageData": {
                "Message": "Sent to 1/1 Total Cost: KES 0.8000",
                "Recipients": [{
                    "statusCode": code,
                    "number": "+254700000000",
                    "status": status,
                    "cost": "KES 0.8000",
                    "messageId": "ATXid_1"
                }]
            }
        })
    }

    #[test]
    fn test_success_codes_accepted() {
        for code in ACCEPTED_STATUS_CODES {
            let receipt = interpret_response(true, &body("Success", code)).unwrap();
            assert_eq!(receipt.status_code, code);
            assert_eq!(receipt.message_id.as_deref(), Some("ATXid_1"));
            assert_eq!(receipt.cost.as_deref(), Some("KES 0.8000"));
        }
    }

    #[test]
    fn test_rejected_recipient_with_http_ok() {
        let err = interpret_response(true, &body("InvalidPhoneNumber", 403)).unwrap_err();
        assert!(matches!(err, SmsError::Rejected { status_code: Some(403), .. }));
    }

    #[test]
    fn test_http_failure_is_rejection() {
        let err = interpret_response(false, &body("Success", 101)).unwrap_err();
        assert!(matches!(err, SmsError::Rejected { .. }));
    }

    #[test]
    fn test_garbage_body() {
        let err = interpret_response(true, &json!("The supplied authentication is invalid")).unwrap_err();
        assert!(matches!(err, SmsError::Rejected { status_code: None, .. }));
    }

    #[tokio::test]
    async fn test_unconfigured_clients() {
        let sms = AfricasTalkingClient::new(&SmsConfig::default());
        assert!(matches!(sms.send_sms("+254700000000", "hi").await, Err(SmsError::NotConfigured)));

        let alerts = TwilioAlertClient::new(&MpesaAlertConfig::default());
        assert!(matches!(alerts.send_alert("hi").await, Err(SmsError::NotConfigured)));
    }
}
