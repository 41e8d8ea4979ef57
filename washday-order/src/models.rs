use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Collection status of an order. Any status may be set from any other;
/// see [`crate::changes::validate_transition`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    InProgress,
    Ready,
    Delayed,
    Collected,
    Overdue,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 6] = [
        OrderStatus::Pending,
        OrderStatus::InProgress,
        OrderStatus::Ready,
        OrderStatus::Delayed,
        OrderStatus::Collected,
        OrderStatus::Overdue,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::InProgress => "in_progress",
            OrderStatus::Ready => "ready",
            OrderStatus::Delayed => "delayed",
            OrderStatus::Collected => "collected",
            OrderStatus::Overdue => "overdue",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Unpaid,
    Deposit,
    Paid,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Unpaid => "unpaid",
            PaymentStatus::Deposit => "deposit",
            PaymentStatus::Paid => "paid",
        }
    }

    /// Whether money changed hands, so a payment method must be recorded.
    pub fn takes_payment(&self) -> bool {
        matches!(self, PaymentStatus::Deposit | PaymentStatus::Paid)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    Mpesa,
    Pending,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Mpesa => "mpesa",
            PaymentMethod::Pending => "pending",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown {kind}: {value}")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

macro_rules! impl_text_enum {
    ($ty:ty, $kind:literal, [$($variant:expr),+ $(,)?]) => {
        impl FromStr for $ty {
            type Err = ParseEnumError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let wanted = s.trim().to_ascii_lowercase();
                [$($variant),+]
                    .into_iter()
                    .find(|v| v.as_str() == wanted)
                    .ok_or_else(|| ParseEnumError { kind: $kind, value: s.to_string() })
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

impl_text_enum!(OrderStatus, "order status", [
    OrderStatus::Pending,
    OrderStatus::InProgress,
    OrderStatus::Ready,
    OrderStatus::Delayed,
    OrderStatus::Collected,
    OrderStatus::Overdue,
]);
impl_text_enum!(PaymentStatus, "payment status", [
    PaymentStatus::Unpaid,
    PaymentStatus::Deposit,
    PaymentStatus::Paid,
]);
impl_text_enum!(PaymentMethod, "payment method", [
    PaymentMethod::Cash,
    PaymentMethod::Mpesa,
    PaymentMethod::Pending,
]);

/// A shop customer, keyed by phone number.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Customer {
    pub id: Uuid,
    pub full_name: String,
    pub phone_number: String,
    pub created_at: DateTime<Utc>,
}

impl Customer {
    pub fn new(full_name: String, phone_number: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            full_name,
            phone_number,
            created_at: Utc::now(),
        }
    }

    pub fn first_name(&self) -> &str {
        self.full_name.split_whitespace().next().unwrap_or("")
    }
}

/// A laundry drop-off.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Order {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub date_received: DateTime<Utc>,
    /// Promised pickup date. Older rows may lack one.
    pub collection_date: Option<NaiveDate>,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub payment_method: Option<PaymentMethod>,
    pub total_amount: Decimal,
    pub amount_paid: Decimal,
    /// Accrued by an external job once an order sits uncollected.
    pub storage_fee: Decimal,
    pub notes: Option<String>,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    pub fn new(customer_id: Uuid, total_amount: Decimal) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            customer_id,
            date_received: now,
            collection_date: None,
            status: OrderStatus::Pending,
            payment_status: PaymentStatus::Unpaid,
            payment_method: None,
            total_amount,
            amount_paid: Decimal::ZERO,
            storage_fee: Decimal::ZERO,
            notes: None,
            created_by: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Short reference printed on receipts and quoted in SMS messages.
    pub fn reference(&self) -> String {
        self.id.simple().to_string()[..8].to_string()
    }

    pub fn balance_due(&self) -> Decimal {
        crate::finance::balance_due(self.total_amount, self.amount_paid)
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// An order joined with its customer, the shape every listing works with.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderView {
    #[serde(flatten)]
    pub order: Order,
    pub customer: Customer,
}

impl OrderView {
    pub fn new(order: Order, customer: Customer) -> Self {
        Self { order, customer }
    }
}

/// A line on an order: some quantity of one clothing type.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderItem {
    pub id: Uuid,
    pub order_id: Uuid,
    pub clothing_type_id: Uuid,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub subtotal: Decimal,
    pub color: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl OrderItem {
    pub fn new(
        order_id: Uuid,
        clothing_type_id: Uuid,
        quantity: i32,
        unit_price: Decimal,
        color: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            order_id,
            clothing_type_id,
            quantity,
            unit_price,
            subtotal: unit_price * Decimal::from(quantity),
            color,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClothingType {
    pub id: Uuid,
    pub name: String,
    pub price: Decimal,
    pub created_at: DateTime<Utc>,
}

impl ClothingType {
    pub fn new(name: String, price: Decimal) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            price,
            created_at: Utc::now(),
        }
    }
}

/// Audit record of money received against an order. Kept apart from
/// `Order::amount_paid`; nothing reconciles the two.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Payment {
    pub id: Uuid,
    pub order_id: Uuid,
    pub amount: Decimal,
    pub payment_method: PaymentMethod,
    pub reference_number: Option<String>,
    pub payment_date: DateTime<Utc>,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl Payment {
    pub fn new(
        order_id: Uuid,
        amount: Decimal,
        payment_method: PaymentMethod,
        reference_number: Option<String>,
        created_by: Option<Uuid>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            order_id,
            amount,
            payment_method,
            reference_number,
            payment_date: now,
            created_by,
            created_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_status_text_round_trip() {
        for status in OrderStatus::ALL {
            assert_eq!(status.as_str().parse::<OrderStatus>().unwrap(), status);
        }
        assert_eq!("In_Progress".parse::<OrderStatus>().unwrap(), OrderStatus::InProgress);
        assert!("washing".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn test_status_serde_matches_text() {
        let json = serde_json::to_string(&OrderStatus::InProgress).unwrap();
        assert_eq!(json, "\"in_progress\"");
    }

    #[test]
    fn test_item_subtotal() {
        let item = OrderItem::new(Uuid::new_v4(), Uuid::new_v4(), 3, dec!(150.50), None);
        assert_eq!(item.subtotal, dec!(451.50));
    }

    #[test]
    fn test_order_reference_is_id_prefix() {
        let order = Order::new(Uuid::new_v4(), dec!(100));
        let reference = order.reference();
        assert_eq!(reference.len(), 8);
        assert!(order.id.to_string().starts_with(&reference));
    }

    #[test]
    fn test_order_view_flattens_order_fields() {
        let customer = Customer::new("Jane Wanjiku".into(), "+254700000000".into());
        let order = Order::new(customer.id, dec!(1200));
        let json = serde_json::to_value(OrderView::new(order.clone(), customer)).unwrap();
        assert_eq!(json["id"], serde_json::json!(order.id));
        assert_eq!(json["customer"]["full_name"], "Jane Wanjiku");
    }
}
