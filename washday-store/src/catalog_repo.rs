use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use washday_core::repository::{ClothingTypeRepository, RepoResult};
use washday_order::ClothingType;

/// Clothing price list.
pub struct StoreClothingTypeRepository {
    pool: PgPool,
}

impl StoreClothingTypeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct ClothingTypeRow {
    id: Uuid,
    name: String,
    price: Decimal,
    created_at: DateTime<Utc>,
}

#[async_trait]
impl ClothingTypeRepository for StoreClothingTypeRepository {
    async fn list_clothing_types(&self) -> RepoResult<Vec<ClothingType>> {
        let rows = sqlx::query_as::<_, ClothingTypeRow>(
            "SELECT id, name, price, created_at FROM clothing_types ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| ClothingType {
                id: r.id,
                name: r.name,
                price: r.price,
                created_at: r.created_at,
            })
            .collect())
    }

    async fn create_clothing_type(&self, clothing_type: &ClothingType) -> RepoResult<()> {
        sqlx::query("INSERT INTO clothing_types (id, name, price, created_at) VALUES ($1, $2, $3, $4)")
            .bind(clothing_type.id)
            .bind(&clothing_type.name)
            .bind(clothing_type.price)
            .bind(clothing_type.created_at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
