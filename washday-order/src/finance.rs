use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{Order, PaymentStatus};

/// Outstanding amount on an order. Storage fees are not part of it.
pub fn balance_due(total_amount: Decimal, amount_paid: Decimal) -> Decimal {
    total_amount - amount_paid
}

/// The `amount_paid` an order should carry after its payment status is set.
///
/// `Paid` and `Unpaid` force the amount; `Deposit` keeps whatever was recorded
/// when the deposit was taken.
pub fn amount_paid_for(status: PaymentStatus, total_amount: Decimal, current: Decimal) -> Decimal {
    match status {
        PaymentStatus::Paid => total_amount,
        PaymentStatus::Unpaid => Decimal::ZERO,
        PaymentStatus::Deposit => current,
    }
}

/// Money figures shown on receipts and order detail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Financials {
    pub total_amount: Decimal,
    pub amount_paid: Decimal,
    pub balance_due: Decimal,
    /// Present only when a storage fee has accrued; displayed as its own
    /// highlighted charge.
    pub storage_fee: Option<Decimal>,
    pub settled: bool,
}

impl Financials {
    pub fn of(order: &Order) -> Self {
        let balance = order.balance_due();
        Self {
            total_amount: order.total_amount,
            amount_paid: order.amount_paid,
            balance_due: balance,
            storage_fee: (order.storage_fee > Decimal::ZERO).then_some(order.storage_fee),
            settled: balance <= Decimal::ZERO,
        }
    }
}

/// Renders an amount the way receipts print it, e.g. `KES 1500.00`.
pub fn format_kes(amount: Decimal) -> String {
    format!("KES {:.2}", amount.round_dp(2))
}
