use rust_decimal::Decimal;
use serde::Serialize;

use crate::finance::amount_paid_for;
use crate::models::{Order, OrderStatus, PaymentStatus};
use crate::notification::NotificationTemplate;

/// Whether the shop allows moving an order from `from` to `to`.
///
/// Staff may correct any status to any other, so every pair is permitted.
/// Tightening the workflow means editing this table.
pub fn is_permitted(from: OrderStatus, to: OrderStatus) -> bool {
    let _ = (from, to);
    true
}

/// A validated status change and the side effects it implies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusChange {
    pub from: OrderStatus,
    pub to: OrderStatus,
    pub changed: bool,
    /// Customer SMS to send once the change is stored.
    pub notify: Option<NotificationTemplate>,
}

pub fn validate_transition(from: OrderStatus, to: OrderStatus) -> Result<StatusChange, ChangeError> {
    if !is_permitted(from, to) {
        return Err(ChangeError::InvalidTransition { from, to });
    }

    let changed = from != to;
    Ok(StatusChange {
        from,
        to,
        changed,
        notify: if changed { NotificationTemplate::for_status(to) } else { None },
    })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaymentChange {
    pub from: PaymentStatus,
    pub to: PaymentStatus,
    pub amount_paid_before: Decimal,
    pub amount_paid_after: Decimal,
}

/// Applies status edits to an order held in memory.
pub struct ChangeHandler;

impl ChangeHandler {
    pub fn change_status(order: &mut Order, to: OrderStatus) -> Result<StatusChange, ChangeError> {
        let change = validate_transition(order.status, to)?;
        if change.changed {
            order.status = to;
            order.touch();
        }
        Ok(change)
    }

    pub fn change_payment_status(order: &mut Order, to: PaymentStatus) -> PaymentChange {
        let before = order.amount_paid;
        let after = amount_paid_for(to, order.total_amount, before);
        let change = PaymentChange {
            from: order.payment_status,
            to,
            amount_paid_before: before,
            amount_paid_after: after,
        };

        order.payment_status = to;
        order.amount_paid = after;
        order.touch();
        change
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChangeError {
    #[error("Invalid state transition from {from} to {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn order(total: Decimal) -> Order {
        Order::new(Uuid::new_v4(), total)
    }

    #[test]
    fn test_any_to_any_permitted() {
        for from in OrderStatus::ALL {
            for to in OrderStatus::ALL {
                assert!(validate_transition(from, to).is_ok());
            }
        }
    }

    #[test]
    fn test_ready_and_delayed_notify() {
        let change = validate_transition(OrderStatus::Pending, OrderStatus::Ready).unwrap();
        assert_eq!(change.notify, Some(NotificationTemplate::ReadyForCollection));

        let change = validate_transition(OrderStatus::Ready, OrderStatus::Delayed).unwrap();
        assert_eq!(change.notify, Some(NotificationTemplate::Delayed));

        let change = validate_transition(OrderStatus::Ready, OrderStatus::Collected).unwrap();
        assert_eq!(change.notify, None);
    }

    #[test]
    fn test_reselecting_same_status_is_quiet() {
        let mut o = order(dec!(500));
        o.status = OrderStatus::Ready;
        let change = ChangeHandler::change_status(&mut o, OrderStatus::Ready).unwrap();
        assert!(!change.changed);
        assert_eq!(change.notify, None);
    }

    #[test]
    fn test_change_status_updates_order() {
        let mut o = order(dec!(500));
        let change = ChangeHandler::change_status(&mut o, OrderStatus::InProgress).unwrap();
        assert!(change.changed);
        assert_eq!(o.status, OrderStatus::InProgress);
    }

    #[test]
    fn test_payment_paid_fills_amount() {
        let mut o = order(dec!(1750.25));
        o.amount_paid = dec!(200);
        let change = ChangeHandler::change_payment_status(&mut o, PaymentStatus::Paid);
        assert_eq!(o.amount_paid, dec!(1750.25));
        assert_eq!(change.amount_paid_before, dec!(200));
        assert_eq!(o.payment_status, PaymentStatus::Paid);
    }

    #[test]
    fn test_payment_unpaid_clears_amount() {
        let mut o = order(dec!(900));
        o.amount_paid = dec!(900);
        o.payment_status = PaymentStatus::Paid;
        ChangeHandler::change_payment_status(&mut o, PaymentStatus::Unpaid);
        assert_eq!(o.amount_paid, Decimal::ZERO);
    }

    #[test]
    fn test_payment_deposit_leaves_amount() {
        let mut o = order(dec!(1500));
        o.amount_paid = dec!(500);
        ChangeHandler::change_payment_status(&mut o, PaymentStatus::Deposit);
        assert_eq!(o.amount_paid, dec!(500));
        assert_eq!(o.payment_status, PaymentStatus::Deposit);
    }
}
