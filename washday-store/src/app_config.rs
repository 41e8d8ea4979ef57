use serde::Deserialize;
use std::env;

use washday_order::OverduePolicy;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub redis: RedisConfig,
    pub auth: AuthConfig,
    #[serde(default)]
    pub sms: SmsConfig,
    #[serde(default)]
    pub mpesa_alert: MpesaAlertConfig,
    #[serde(default)]
    pub business_rules: BusinessRules,
    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BusinessRules {
    #[serde(default = "default_grace_months")]
    pub storage_grace_months: u32,
    #[serde(default = "default_warning_days")]
    pub overdue_warning_days: i64,
    /// 0 turns the sweep off.
    #[serde(default = "default_sweep_seconds")]
    pub overdue_sweep_seconds: u64,
}

fn default_grace_months() -> u32 { 3 }
fn default_warning_days() -> i64 { 30 }
fn default_sweep_seconds() -> u64 { 3600 }

impl Default for BusinessRules {
    fn default() -> Self {
        Self {
            storage_grace_months: default_grace_months(),
            overdue_warning_days: default_warning_days(),
            overdue_sweep_seconds: default_sweep_seconds(),
        }
    }
}

impl BusinessRules {
    pub fn overdue_policy(&self) -> OverduePolicy {
        OverduePolicy {
            grace_months: self.storage_grace_months,
            warning_window_days: self.overdue_warning_days,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub jwt_expiration_seconds: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct RedisConfig {
    /// No URL, no rate limiting.
    pub url: Option<String>,
}

/// Africa's Talking credentials.
#[derive(Debug, Deserialize, Clone)]
pub struct SmsConfig {
    pub username: Option<String>,
    pub api_key: Option<String>,
    pub sender_id: Option<String>,
    #[serde(default = "default_sms_endpoint")]
    pub endpoint: String,
}

fn default_sms_endpoint() -> String {
    "https://api.africastalking.com/version1/messaging".into()
}

impl Default for SmsConfig {
    fn default() -> Self {
        Self {
            username: None,
            api_key: None,
            sender_id: None,
            endpoint: default_sms_endpoint(),
        }
    }
}

/// Twilio credentials and the shop phone that receives payment alerts.
#[derive(Debug, Deserialize, Clone)]
pub struct MpesaAlertConfig {
    pub account_sid: Option<String>,
    pub auth_token: Option<String>,
    pub from_number: Option<String>,
    pub shop_phone: Option<String>,
    #[serde(default = "default_twilio_base")]
    pub api_base: String,
}

fn default_twilio_base() -> String {
    "https://api.twilio.com/2010-04-01".into()
}

impl Default for MpesaAlertConfig {
    fn default() -> Self {
        Self {
            account_sid: None,
            auth_token: None,
            from_number: None,
            shop_phone: None,
            api_base: default_twilio_base(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Postgres,
    Memory,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            // optional per-environment overrides
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // never checked in
            .add_source(config::File::with_name("config/local").required(false))
            // e.g. WASHDAY__SMS__API_KEY
            .add_source(config::Environment::with_prefix("WASHDAY").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
