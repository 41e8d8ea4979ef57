use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashMap;
use uuid::Uuid;

use crate::finance::Financials;
use crate::lifecycle::{evaluate_overdue, overdue_threshold, OverduePolicy, OverdueStatus};
use crate::models::{ClothingType, OrderItem, OrderStatus, OrderView, PaymentMethod, PaymentStatus};

pub const STORAGE_NOTICE: &str = "Items not collected within 3 months will incur storage fees";

#[derive(Debug, Clone, Serialize)]
pub struct ReceiptLine {
    pub item_id: Uuid,
    pub description: String,
    pub color: Option<String>,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub subtotal: Decimal,
}

/// Printable receipt for an order.
#[derive(Debug, Clone, Serialize)]
pub struct Receipt {
    pub order_id: Uuid,
    pub reference: String,
    pub customer_name: String,
    pub phone_number: String,
    pub date_received: DateTime<Utc>,
    pub collection_date: Option<NaiveDate>,
    /// First day storage charges apply.
    pub storage_after: Option<NaiveDate>,
    pub overdue: OverdueStatus,
    pub status: OrderStatus,
    pub lines: Vec<ReceiptLine>,
    pub financials: Financials,
    pub payment_status: PaymentStatus,
    pub payment_method: Option<PaymentMethod>,
    pub notes: Option<String>,
    pub footer: String,
}

impl Receipt {
    pub fn build(
        view: &OrderView,
        items: &[OrderItem],
        clothing_types: &[ClothingType],
        policy: &OverduePolicy,
        today: NaiveDate,
    ) -> Self {
        let names: HashMap<Uuid, &str> = clothing_types
            .iter()
            .map(|c| (c.id, c.name.as_str()))
            .collect();

        let order = &view.order;
        let lines = items
            .iter()
            .map(|item| ReceiptLine {
                item_id: item.id,
                description: names
                    .get(&item.clothing_type_id)
                    .map(|n| n.to_string())
                    .unwrap_or_else(|| "Item".to_string()),
                color: item.color.clone(),
                quantity: item.quantity,
                unit_price: item.unit_price,
                subtotal: item.subtotal,
            })
            .collect();

        Self {
            order_id: order.id,
            reference: order.reference(),
            customer_name: view.customer.full_name.clone(),
            phone_number: view.customer.phone_number.clone(),
            date_received: order.date_received,
            collection_date: order.collection_date,
            storage_after: order.collection_date.and_then(|d| overdue_threshold(d, policy)),
            overdue: evaluate_overdue(order.collection_date, order.status, today, policy),
            status: order.status,
            lines,
            financials: Financials::of(order),
            payment_status: order.payment_status,
            payment_method: order.payment_method,
            notes: order.notes.clone(),
            footer: STORAGE_NOTICE.to_string(),
        }
    }
}
