use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use washday_core::identity::{Role, StaffUser};
use washday_core::repository::{RepoResult, StaffDirectory};

/// Staff accounts backed by `staff_users` and `user_roles`.
pub struct StoreStaffDirectory {
    pool: PgPool,
}

impl StoreStaffDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct StaffRow {
    id: Uuid,
    username: String,
    full_name: String,
    phone_number: Option<String>,
    password_hash: String,
    created_at: DateTime<Utc>,
}

impl From<StaffRow> for StaffUser {
    fn from(r: StaffRow) -> Self {
        StaffUser {
            id: r.id,
            username: r.username,
            full_name: r.full_name,
            phone_number: r.phone_number,
            password_hash: r.password_hash,
            created_at: r.created_at,
        }
    }
}

#[async_trait]
impl StaffDirectory for StoreStaffDirectory {
    async fn find_by_username(&self, username: &str) -> RepoResult<Option<StaffUser>> {
        let row = sqlx::query_as::<_, StaffRow>(
            "SELECT id, username, full_name, phone_number, password_hash, created_at \
             FROM staff_users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(StaffUser::from))
    }

    async fn get_user(&self, id: Uuid) -> RepoResult<Option<StaffUser>> {
        let row = sqlx::query_as::<_, StaffRow>(
            "SELECT id, username, full_name, phone_number, password_hash, created_at \
             FROM staff_users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(StaffUser::from))
    }

    async fn role_for(&self, user_id: Uuid) -> RepoResult<Option<Role>> {
        let role: Option<String> = sqlx::query_scalar("SELECT role FROM user_roles WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(role.map(|r| r.parse::<Role>()).transpose()?)
    }
}
