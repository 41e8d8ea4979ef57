#![allow(dead_code)]

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, Response};
use serde_json::Value;
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

use washday_api::middleware::StaffClaims;
use washday_api::{app, AppState, AuthConfig};
use washday_core::identity::{Role, StaffUser};
use washday_core::notify::{PaymentAlertGateway, SmsError, SmsGateway, SmsReceipt};
use washday_store::InMemoryStore;

pub const PASSWORD: &str = "counter-pass";

/// SMS gateway that records every message instead of sending it.
#[derive(Default)]
pub struct RecordingSms {
    pub sent: Mutex<Vec<(String, String)>>,
    pub fail_with: Mutex<Option<SmsError>>,
}

impl RecordingSms {
    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.sent.lock().unwrap().clear();
    }

    pub fn fail(&self, err: SmsError) {
        *self.fail_with.lock().unwrap() = Some(err);
    }
}

#[async_trait]
impl SmsGateway for RecordingSms {
    async fn send_sms(&self, to: &str, message: &str) -> Result<SmsReceipt, SmsError> {
        self.sent.lock().unwrap().push((to.to_string(), message.to_string()));
        if let Some(err) = self.fail_with.lock().unwrap().take() {
            return Err(err);
        }
        Ok(SmsReceipt {
            message_id: Some("ATXid_test".into()),
            status: "Success".into(),
            status_code: 101,
            cost: Some("KES 0.8000".into()),
        })
    }
}

#[derive(Default)]
pub struct RecordingAlerts {
    pub sent: Mutex<Vec<String>>,
    pub unconfigured: bool,
}

#[async_trait]
impl PaymentAlertGateway for RecordingAlerts {
    async fn send_alert(&self, body: &str) -> Result<String, SmsError> {
        if self.unconfigured {
            return Err(SmsError::NotConfigured);
        }
        self.sent.lock().unwrap().push(body.to_string());
        Ok("SM123".into())
    }
}

pub struct TestApp {
    pub state: AppState,
    pub store: Arc<InMemoryStore>,
    pub sms: Arc<RecordingSms>,
    pub alerts: Arc<RecordingAlerts>,
    pub admin: StaffUser,
    pub cashier: StaffUser,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_alerts(RecordingAlerts::default()).await
    }

    pub async fn with_alerts(alerts: RecordingAlerts) -> Self {
        let store = Arc::new(InMemoryStore::new());
        let sms = Arc::new(RecordingSms::default());
        let alerts = Arc::new(alerts);
        let auth = AuthConfig { secret: "integration-secret".into(), expiration: 3600 };
        let state = AppState::in_memory(store.clone(), sms.clone(), alerts.clone(), auth);

        let hash = bcrypt::hash(PASSWORD, 4).unwrap();
        let admin = StaffUser::new("admin".into(), "Shop Owner".into(), hash.clone());
        let cashier = StaffUser::new("cashier".into(), "Front Desk".into(), hash);
        store.add_staff(admin.clone(), Role::Admin).await;
        store.add_staff(cashier.clone(), Role::Cashier).await;

        Self { state, store, sms, alerts, admin, cashier }
    }

    pub fn token(&self, user: &StaffUser, role: Role) -> String {
        StaffClaims::for_user(user, role, &self.state.auth)
            .encode(&self.state.auth)
            .unwrap()
    }

    pub fn admin_token(&self) -> String {
        self.token(&self.admin, Role::Admin)
    }

    pub fn cashier_token(&self) -> String {
        self.token(&self.cashier, Role::Cashier)
    }

    pub async fn send(&self, req: Request<Body>) -> Response<Body> {
        app(self.state.clone()).oneshot(req).await.unwrap()
    }

    pub async fn call(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (u16, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(t) = token {
            builder = builder.header("Authorization", format!("Bearer {}", t));
        }
        let req = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let resp = self.send(req).await;
        let status = resp.status().as_u16();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        (status, value)
    }

    /// Create an order through the API and return its id.
    pub async fn create_order(&self, body: Value) -> String {
        let token = self.cashier_token();
        let (status, order) = self.call("POST", "/v1/orders", Some(&token), Some(body)).await;
        assert_eq!(status, 201, "create failed: {}", order);
        order["id"].as_str().unwrap().to_string()
    }
}

pub fn decimal(v: &Value) -> rust_decimal::Decimal {
    match v {
        Value::String(s) => s.parse().unwrap(),
        other => other.to_string().parse().unwrap(),
    }
}
