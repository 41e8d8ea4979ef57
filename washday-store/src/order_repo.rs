use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use washday_core::repository::{CustomerRepository, OrderFilter, OrderRepository, RepoResult};
use washday_core::CoreError;
use washday_order::{
    Customer, Order, OrderItem, OrderStatus, OrderView, Payment, PaymentMethod, PaymentStatus,
};

use crate::payment_repo::insert_payment;

pub struct StoreOrderRepository {
    pool: PgPool,
}

impl StoreOrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const ORDER_VIEW_SELECT: &str = r#"
    SELECT o.id, o.customer_id, o.date_received, o.collection_date, o.status,
           o.payment_status, o.payment_method, o.total_amount, o.amount_paid,
           o.storage_fee, o.notes, o.created_by, o.created_at, o.updated_at,
           c.full_name AS customer_full_name, c.phone_number AS customer_phone_number,
           c.created_at AS customer_created_at
    FROM orders o
    JOIN customers c ON c.id = o.customer_id
"#;

const ORDER_COLUMNS: &str = "id, customer_id, date_received, collection_date, status, \
    payment_status, payment_method, total_amount, amount_paid, storage_fee, notes, \
    created_by, created_at, updated_at";

// Internal structs for type-safe querying
#[derive(sqlx::FromRow)]
struct OrderRow {
    id: Uuid,
    customer_id: Uuid,
    date_received: DateTime<Utc>,
    collection_date: Option<NaiveDate>,
    status: String,
    payment_status: String,
    payment_method: Option<String>,
    total_amount: Decimal,
    amount_paid: Decimal,
    storage_fee: Decimal,
    notes: Option<String>,
    created_by: Option<Uuid>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<OrderRow> for Order {
    type Error = Box<dyn std::error::Error + Send + Sync>;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        Ok(Order {
            id: row.id,
            customer_id: row.customer_id,
            date_received: row.date_received,
            collection_date: row.collection_date,
            status: row.status.parse::<OrderStatus>()?,
            payment_status: row.payment_status.parse::<PaymentStatus>()?,
            payment_method: row
                .payment_method
                .as_deref()
                .map(|m| m.parse::<PaymentMethod>())
                .transpose()?,
            total_amount: row.total_amount,
            amount_paid: row.amount_paid,
            storage_fee: row.storage_fee,
            notes: row.notes,
            created_by: row.created_by,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct OrderViewRow {
    #[sqlx(flatten)]
    order: OrderRow,
    customer_full_name: String,
    customer_phone_number: String,
    customer_created_at: DateTime<Utc>,
}

impl TryFrom<OrderViewRow> for OrderView {
    type Error = Box<dyn std::error::Error + Send + Sync>;

    fn try_from(row: OrderViewRow) -> Result<Self, Self::Error> {
        let customer = Customer {
            id: row.order.customer_id,
            full_name: row.customer_full_name,
            phone_number: row.customer_phone_number,
            created_at: row.customer_created_at,
        };
        Ok(OrderView::new(Order::try_from(row.order)?, customer))
    }
}

#[derive(sqlx::FromRow)]
struct OrderItemRow {
    id: Uuid,
    order_id: Uuid,
    clothing_type_id: Uuid,
    quantity: i32,
    unit_price: Decimal,
    subtotal: Decimal,
    color: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<OrderItemRow> for OrderItem {
    fn from(row: OrderItemRow) -> Self {
        OrderItem {
            id: row.id,
            order_id: row.order_id,
            clothing_type_id: row.clothing_type_id,
            quantity: row.quantity,
            unit_price: row.unit_price,
            subtotal: row.subtotal,
            color: row.color,
            created_at: row.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct CustomerRow {
    id: Uuid,
    full_name: String,
    phone_number: String,
    created_at: DateTime<Utc>,
}

impl From<CustomerRow> for Customer {
    fn from(row: CustomerRow) -> Self {
        Customer {
            id: row.id,
            full_name: row.full_name,
            phone_number: row.phone_number,
            created_at: row.created_at,
        }
    }
}

/// `%term%` for ILIKE with the pattern characters in `term` taken literally.
fn like_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for ch in term.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

fn views(rows: Vec<OrderViewRow>) -> RepoResult<Vec<OrderView>> {
    rows.into_iter().map(OrderView::try_from).collect()
}

#[async_trait]
impl OrderRepository for StoreOrderRepository {
    async fn create_order(
        &self,
        order: &Order,
        items: &[OrderItem],
        payment: Option<&Payment>,
    ) -> RepoResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO orders (id, customer_id, date_received, collection_date, status,
                                payment_status, payment_method, total_amount, amount_paid,
                                storage_fee, notes, created_by, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            "#,
        )
        .bind(order.id)
        .bind(order.customer_id)
        .bind(order.date_received)
        .bind(order.collection_date)
        .bind(order.status.as_str())
        .bind(order.payment_status.as_str())
        .bind(order.payment_method.map(|m| m.as_str()))
        .bind(order.total_amount)
        .bind(order.amount_paid)
        .bind(order.storage_fee)
        .bind(&order.notes)
        .bind(order.created_by)
        .bind(order.created_at)
        .bind(order.updated_at)
        .execute(&mut *tx)
        .await?;

        for item in items {
            sqlx::query(
                r#"
                INSERT INTO order_items (id, order_id, clothing_type_id, quantity, unit_price,
                                         subtotal, color, created_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                "#,
            )
            .bind(item.id)
            .bind(item.order_id)
            .bind(item.clothing_type_id)
            .bind(item.quantity)
            .bind(item.unit_price)
            .bind(item.subtotal)
            .bind(&item.color)
            .bind(item.created_at)
            .execute(&mut *tx)
            .await?;
        }

        if let Some(payment) = payment {
            insert_payment(&mut *tx, payment).await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn get_order(&self, id: Uuid) -> RepoResult<Option<OrderView>> {
        let sql = format!("{} WHERE o.id = $1", ORDER_VIEW_SELECT);
        let row = sqlx::query_as::<_, OrderViewRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(OrderView::try_from).transpose()
    }

    async fn list_orders(&self, filter: &OrderFilter) -> RepoResult<Vec<OrderView>> {
        let rows = match filter.status {
            Some(status) => {
                let sql = format!("{} WHERE o.status = $1 ORDER BY o.created_at DESC", ORDER_VIEW_SELECT);
                sqlx::query_as::<_, OrderViewRow>(&sql)
                    .bind(status.as_str())
                    .fetch_all(&self.pool)
                    .await?
            }
            None => {
                let sql = format!("{} ORDER BY o.created_at DESC", ORDER_VIEW_SELECT);
                sqlx::query_as::<_, OrderViewRow>(&sql)
                    .fetch_all(&self.pool)
                    .await?
            }
        };

        views(rows)
    }

    async fn search_orders(&self, term: &str) -> RepoResult<Vec<OrderView>> {
        let sql = format!(
            "{} WHERE c.full_name ILIKE $1 ESCAPE '\\' OR c.phone_number ILIKE $1 ESCAPE '\\' \
             ORDER BY o.date_received DESC",
            ORDER_VIEW_SELECT
        );
        let rows = sqlx::query_as::<_, OrderViewRow>(&sql)
            .bind(like_pattern(term))
            .fetch_all(&self.pool)
            .await?;

        views(rows)
    }

    async fn list_items(&self, order_id: Uuid) -> RepoResult<Vec<OrderItem>> {
        let rows = sqlx::query_as::<_, OrderItemRow>(
            r#"
            SELECT id, order_id, clothing_type_id, quantity, unit_price, subtotal, color, created_at
            FROM order_items
            WHERE order_id = $1
            ORDER BY created_at
            "#,
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(OrderItem::from).collect())
    }

    async fn update_status(&self, id: Uuid, status: OrderStatus) -> RepoResult<Order> {
        let sql = format!(
            "UPDATE orders SET status = $2, updated_at = NOW() WHERE id = $1 RETURNING {}",
            ORDER_COLUMNS
        );
        let row = sqlx::query_as::<_, OrderRow>(&sql)
            .bind(id)
            .bind(status.as_str())
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("order {}", id)))?;

        Order::try_from(row)
    }

    async fn update_payment(
        &self,
        id: Uuid,
        payment_status: PaymentStatus,
        amount_paid: Decimal,
    ) -> RepoResult<Order> {
        let sql = format!(
            "UPDATE orders SET payment_status = $2, amount_paid = $3, updated_at = NOW() \
             WHERE id = $1 RETURNING {}",
            ORDER_COLUMNS
        );
        let row = sqlx::query_as::<_, OrderRow>(&sql)
            .bind(id)
            .bind(payment_status.as_str())
            .bind(amount_paid)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("order {}", id)))?;

        Order::try_from(row)
    }
}

#[async_trait]
impl CustomerRepository for StoreOrderRepository {
    async fn find_by_phone(&self, phone_number: &str) -> RepoResult<Option<Customer>> {
        let row = sqlx::query_as::<_, CustomerRow>(
            "SELECT id, full_name, phone_number, created_at FROM customers WHERE phone_number = $1",
        )
        .bind(phone_number)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Customer::from))
    }

    async fn get_customer(&self, id: Uuid) -> RepoResult<Option<Customer>> {
        let row = sqlx::query_as::<_, CustomerRow>(
            "SELECT id, full_name, phone_number, created_at FROM customers WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Customer::from))
    }

    async fn create_customer(&self, customer: &Customer) -> RepoResult<()> {
        sqlx::query(
            "INSERT INTO customers (id, full_name, phone_number, created_at) VALUES ($1, $2, $3, $4)",
        )
        .bind(customer.id)
        .bind(&customer.full_name)
        .bind(&customer.phone_number)
        .bind(customer.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
