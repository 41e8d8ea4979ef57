use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use washday_core::repository::{PaymentRepository, RepoResult};
use washday_order::{Payment, PaymentMethod};

pub struct StorePaymentRepository {
    pool: PgPool,
}

impl StorePaymentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct PaymentRow {
    id: Uuid,
    order_id: Uuid,
    amount: Decimal,
    payment_method: String,
    reference_number: Option<String>,
    payment_date: DateTime<Utc>,
    created_by: Option<Uuid>,
    created_at: DateTime<Utc>,
}

pub(crate) async fn insert_payment<'e, E>(executor: E, payment: &Payment) -> Result<(), sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query(
        r#"
        INSERT INTO payments (id, order_id, amount, payment_method, reference_number,
                              payment_date, created_by, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        "#,
    )
    .bind(payment.id)
    .bind(payment.order_id)
    .bind(payment.amount)
    .bind(payment.payment_method.as_str())
    .bind(&payment.reference_number)
    .bind(payment.payment_date)
    .bind(payment.created_by)
    .bind(payment.created_at)
    .execute(executor)
    .await?;
    Ok(())
}

#[async_trait]
impl PaymentRepository for StorePaymentRepository {
    async fn record_payment(&self, payment: &Payment) -> RepoResult<()> {
        insert_payment(&self.pool, payment).await?;
        Ok(())
    }

    async fn list_payments(&self, order_id: Uuid) -> RepoResult<Vec<Payment>> {
        let rows = sqlx::query_as::<_, PaymentRow>(
            r#"
            SELECT id, order_id, amount, payment_method, reference_number, payment_date,
                   created_by, created_at
            FROM payments
            WHERE order_id = $1
            ORDER BY payment_date DESC
            "#,
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        let mut payments = Vec::with_capacity(rows.len());
        for r in rows {
            payments.push(Payment {
                id: r.id,
                order_id: r.order_id,
                amount: r.amount,
                payment_method: r.payment_method.parse::<PaymentMethod>()?,
                reference_number: r.reference_number,
                payment_date: r.payment_date,
                created_by: r.created_by,
                created_at: r.created_at,
            });
        }
        Ok(payments)
    }
}
