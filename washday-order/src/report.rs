use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::models::{OrderStatus, OrderView};

pub const CSV_HEADER: [&str; 7] = [
    "Order ID",
    "Customer",
    "Phone",
    "Status",
    "Total Amount",
    "Amount Paid",
    "Collection Date",
];

/// Counter dashboard figures.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DashboardStats {
    pub total_orders: usize,
    pub pending_orders: usize,
    pub ready_orders: usize,
    pub collected_orders: usize,
    pub total_income: Decimal,
    pub pending_payments: Decimal,
}

impl DashboardStats {
    pub fn from_orders(orders: &[OrderView]) -> Self {
        let count = |s: OrderStatus| orders.iter().filter(|o| o.order.status == s).count();
        Self {
            total_orders: orders.len(),
            pending_orders: count(OrderStatus::Pending),
            ready_orders: count(OrderStatus::Ready),
            collected_orders: count(OrderStatus::Collected),
            total_income: orders.iter().map(|o| o.order.amount_paid).sum(),
            pending_payments: orders.iter().map(|o| o.order.balance_due()).sum(),
        }
    }
}

/// Admin report figures.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReportSummary {
    pub total_orders: usize,
    pub delayed_orders: usize,
    pub overdue_orders: usize,
    pub collected_orders: usize,
    pub total_revenue: Decimal,
}

impl ReportSummary {
    pub fn from_orders(orders: &[OrderView]) -> Self {
        let count = |s: OrderStatus| orders.iter().filter(|o| o.order.status == s).count();
        Self {
            total_orders: orders.len(),
            delayed_orders: count(OrderStatus::Delayed),
            overdue_orders: count(OrderStatus::Overdue),
            collected_orders: count(OrderStatus::Collected),
            total_revenue: orders.iter().map(|o| o.order.amount_paid).sum(),
        }
    }
}

/// One line per order, fields joined with bare commas.
///
/// Fields are not quoted, so a comma inside a customer name shifts the
/// columns of that row. Downstream spreadsheets already rely on this layout.
pub fn orders_csv(orders: &[OrderView]) -> String {
    let mut lines = Vec::with_capacity(orders.len() + 1);
    lines.push(CSV_HEADER.join(","));

    for view in orders {
        let o = &view.order;
        let fields = [
            o.id.to_string(),
            view.customer.full_name.clone(),
            view.customer.phone_number.clone(),
            o.status.to_string(),
            o.total_amount.to_string(),
            o.amount_paid.to_string(),
            o.collection_date.map(|d| d.to_string()).unwrap_or_default(),
        ];
        lines.push(fields.join(","));
    }

    lines.join("\n")
}

pub fn csv_filename(date: NaiveDate) -> String {
    format!("orders-report-{}.csv", date.format("%Y-%m-%d"))
}
