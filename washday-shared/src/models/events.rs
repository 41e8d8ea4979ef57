use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Which table a change notification refers to.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ChangeTable {
    Orders,
    Customers,
    Payments,
    ClothingTypes,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChangeKind {
    Insert,
    Update,
}

/// Notification that a record changed. Subscribers treat it as a hint to
/// re-fetch; it carries no row data.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RecordChangedEvent {
    pub table: ChangeTable,
    pub kind: ChangeKind,
    pub record_id: Uuid,
    pub timestamp: DateTime<Utc>,
}

impl RecordChangedEvent {
    pub fn order_updated(order_id: Uuid) -> Self {
        Self {
            table: ChangeTable::Orders,
            kind: ChangeKind::Update,
            record_id: order_id,
            timestamp: Utc::now(),
        }
    }

    pub fn order_inserted(order_id: Uuid) -> Self {
        Self {
            table: ChangeTable::Orders,
            kind: ChangeKind::Insert,
            record_id: order_id,
            timestamp: Utc::now(),
        }
    }

    pub fn payment_inserted(payment_id: Uuid) -> Self {
        Self {
            table: ChangeTable::Payments,
            kind: ChangeKind::Insert,
            record_id: payment_id,
            timestamp: Utc::now(),
        }
    }
}

/// Outcome of a customer SMS attempted as a side effect of a status change.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CustomerNotifiedEvent {
    pub order_id: Uuid,
    pub template: String,
    pub delivered: bool,
    pub provider_message_id: Option<String>,
    pub timestamp: i64,
}
