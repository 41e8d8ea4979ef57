use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use uuid::Uuid;

use crate::lifecycle::parse_collection_date;
use crate::models::{Customer, Order, OrderItem, Payment, PaymentMethod, PaymentStatus};

pub const PHONE_MIN_DIGITS: usize = 7;
pub const PHONE_MAX_DIGITS: usize = 15;

/// `+?[digits]`, 7 to 15 digits.
pub fn is_valid_phone(phone: &str) -> bool {
    let digits = phone.strip_prefix('+').unwrap_or(phone);
    (PHONE_MIN_DIGITS..=PHONE_MAX_DIGITS).contains(&digits.len())
        && digits.bytes().all(|b| b.is_ascii_digit())
}

#[derive(Debug, Clone, Deserialize)]
pub struct ItemDraft {
    pub clothing_type_id: Uuid,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub color: Option<String>,
}

/// Order form as submitted by staff.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderDraft {
    pub customer_name: String,
    pub phone_number: String,
    pub total_amount: Option<Decimal>,
    #[serde(default)]
    pub amount_paid: Option<Decimal>,
    pub payment_status: PaymentStatus,
    #[serde(default)]
    pub payment_method: Option<PaymentMethod>,
    /// Unreadable dates are kept as missing and evaluate as indeterminate.
    #[serde(default, deserialize_with = "lenient_date")]
    pub collection_date: Option<NaiveDate>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub items: Vec<ItemDraft>,
}

fn lenient_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(parse_collection_date))
}

/// Everything needed to persist a new order.
#[derive(Debug, Clone)]
pub struct AcceptedOrder {
    pub order: Order,
    pub items: Vec<OrderItem>,
    /// Audit row for money taken at the counter.
    pub payment: Option<Payment>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IntakeError {
    #[error("Please fill in all required fields: {0}")]
    MissingField(&'static str),
    #[error("Invalid phone number: {0}")]
    InvalidPhone(String),
    #[error("Please enter the deposit amount")]
    DepositAmountRequired,
    #[error("Please select a payment method")]
    PaymentMethodRequired,
    #[error("Deposit cannot exceed total amount")]
    DepositExceedsTotal,
    #[error("Amounts cannot be negative")]
    NegativeAmount,
    #[error("Item quantity must be at least 1")]
    InvalidQuantity,
}

impl OrderDraft {
    /// Checks the form the way the counter screen does before submitting.
    pub fn validate(&self) -> Result<Decimal, IntakeError> {
        if self.customer_name.trim().is_empty() {
            return Err(IntakeError::MissingField("customer_name"));
        }
        if self.phone_number.trim().is_empty() {
            return Err(IntakeError::MissingField("phone_number"));
        }
        let total = self.total_amount.ok_or(IntakeError::MissingField("total_amount"))?;

        if !is_valid_phone(self.phone_number.trim()) {
            return Err(IntakeError::InvalidPhone(self.phone_number.clone()));
        }
        if total < Decimal::ZERO || self.amount_paid.is_some_and(|a| a < Decimal::ZERO) {
            return Err(IntakeError::NegativeAmount);
        }
        if self.payment_status == PaymentStatus::Deposit && self.amount_paid.is_none() {
            return Err(IntakeError::DepositAmountRequired);
        }
        if self.payment_status.takes_payment()
            && !matches!(self.payment_method, Some(PaymentMethod::Cash | PaymentMethod::Mpesa))
        {
            return Err(IntakeError::PaymentMethodRequired);
        }
        if self.payment_status == PaymentStatus::Deposit
            && self.amount_paid.is_some_and(|a| a > total)
        {
            return Err(IntakeError::DepositExceedsTotal);
        }
        if self.items.iter().any(|i| i.quantity < 1) {
            return Err(IntakeError::InvalidQuantity);
        }

        Ok(total)
    }

    /// Builds the order for `customer`. A deposit records the entered amount,
    /// a full payment records the entered amount or the total, and an unpaid
    /// order records nothing.
    pub fn accept(self, customer: &Customer, created_by: Option<Uuid>) -> Result<AcceptedOrder, IntakeError> {
        let total = self.validate()?;

        let mut order = Order::new(customer.id, total);
        order.collection_date = self.collection_date;
        order.payment_status = self.payment_status;
        order.created_by = created_by;
        order.notes = self.notes.filter(|n| !n.trim().is_empty());

        if self.payment_status.takes_payment() {
            order.amount_paid = self.amount_paid.unwrap_or(total);
            order.payment_method = self.payment_method;
        }

        let items = self
            .items
            .into_iter()
            .map(|i| OrderItem::new(order.id, i.clothing_type_id, i.quantity, i.unit_price, i.color))
            .collect();

        let payment = match order.payment_method {
            Some(method) if order.amount_paid > Decimal::ZERO => Some(Payment::new(
                order.id,
                order.amount_paid,
                method,
                None,
                created_by,
            )),
            _ => None,
        };

        Ok(AcceptedOrder { order, items, payment })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn draft(status: PaymentStatus) -> OrderDraft {
        OrderDraft {
            customer_name: "Peter Kamau".into(),
            phone_number: "+254711222333".into(),
            total_amount: Some(dec!(1500)),
            amount_paid: None,
            payment_status: status,
            payment_method: None,
            collection_date: NaiveDate::from_ymd_opt(2024, 5, 1),
            notes: None,
            items: vec![],
        }
    }

    fn customer() -> Customer {
        Customer::new("Peter Kamau".into(), "+254711222333".into())
    }

    #[test]
    fn test_phone_validation() {
        assert!(is_valid_phone("+254700000000"));
        assert!(is_valid_phone("0700000000"));
        assert!(!is_valid_phone("+2547-000"));
        assert!(!is_valid_phone("12345"));
        assert!(!is_valid_phone("+1234567890123456"));
        assert!(!is_valid_phone("++254700000000"));
    }

    #[test]
    fn test_unpaid_order_records_nothing() {
        let accepted = draft(PaymentStatus::Unpaid).accept(&customer(), None).unwrap();
        assert_eq!(accepted.order.amount_paid, Decimal::ZERO);
        assert_eq!(accepted.order.payment_method, None);
        assert!(accepted.payment.is_none());
    }

    #[test]
    fn test_deposit_requires_amount_and_method() {
        let d = draft(PaymentStatus::Deposit);
        assert_eq!(d.validate(), Err(IntakeError::DepositAmountRequired));

        let mut d = draft(PaymentStatus::Deposit);
        d.amount_paid = Some(dec!(500));
        assert_eq!(d.validate(), Err(IntakeError::PaymentMethodRequired));

        d.payment_method = Some(PaymentMethod::Mpesa);
        let accepted = d.accept(&customer(), None).unwrap();
        assert_eq!(accepted.order.amount_paid, dec!(500));
        assert_eq!(accepted.payment.unwrap().amount, dec!(500));
    }

    #[test]
    fn test_deposit_cannot_exceed_total() {
        let mut d = draft(PaymentStatus::Deposit);
        d.amount_paid = Some(dec!(1600));
        d.payment_method = Some(PaymentMethod::Cash);
        assert_eq!(d.validate(), Err(IntakeError::DepositExceedsTotal));
    }

    #[test]
    fn test_paid_defaults_to_total() {
        let mut d = draft(PaymentStatus::Paid);
        d.payment_method = Some(PaymentMethod::Cash);
        let accepted = d.accept(&customer(), None).unwrap();
        assert_eq!(accepted.order.amount_paid, dec!(1500));
    }

    #[test]
    fn test_missing_total_rejected() {
        let mut d = draft(PaymentStatus::Unpaid);
        d.total_amount = None;
        assert_eq!(d.validate(), Err(IntakeError::MissingField("total_amount")));
    }

    #[test]
    fn test_collection_date_forms() {
        let form = |date: serde_json::Value| {
            serde_json::from_value::<OrderDraft>(serde_json::json!({
                "customer_name": "Peter Kamau",
                "phone_number": "+254711222333",
                "total_amount": "1500",
                "payment_status": "unpaid",
                "collection_date": date,
            }))
            .unwrap()
            .collection_date
        };

        assert_eq!(form("2024-05-01".into()), NaiveDate::from_ymd_opt(2024, 5, 1));
        assert_eq!(form("2024-05-01T09:00:00Z".into()), NaiveDate::from_ymd_opt(2024, 5, 1));
        assert_eq!(form("soon".into()), None);
        assert_eq!(form("".into()), None);
        assert_eq!(form(serde_json::Value::Null), None);
    }

    #[test]
    fn test_items_get_subtotals() {
        let mut d = draft(PaymentStatus::Unpaid);
        d.items.push(ItemDraft {
            clothing_type_id: Uuid::new_v4(),
            quantity: 4,
            unit_price: dec!(120),
            color: Some("white".into()),
        });
        let accepted = d.accept(&customer(), None).unwrap();
        assert_eq!(accepted.items[0].subtotal, dec!(480));
        assert_eq!(accepted.items[0].order_id, accepted.order.id);
    }
}
