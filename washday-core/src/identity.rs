use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::CoreError;

/// Staff role; decides which dashboard and actions a user gets.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Staff,
    Cashier,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Staff => "staff",
            Role::Cashier => "cashier",
        }
    }

    /// Reports and catalogue edits are admin-only.
    pub fn can_view_reports(&self) -> bool {
        matches!(self, Role::Admin)
    }

    /// Landing page after sign-in.
    pub fn dashboard_path(&self) -> &'static str {
        match self {
            Role::Cashier => "/cashier-dashboard",
            Role::Admin | Role::Staff => "/dashboard",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "staff" => Ok(Role::Staff),
            "cashier" => Ok(Role::Cashier),
            other => Err(CoreError::ValidationError(format!("Unknown role: {}", other))),
        }
    }
}

/// A user who can sign in to the shop system.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaffUser {
    pub id: Uuid,
    pub username: String,
    pub full_name: String,
    pub phone_number: Option<String>,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl StaffUser {
    pub fn new(username: String, full_name: String, password_hash: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            username,
            full_name,
            phone_number: None,
            password_hash,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parsing() {
        assert_eq!("Admin".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!("cashier".parse::<Role>().unwrap(), Role::Cashier);
        assert!("owner".parse::<Role>().is_err());
    }

    #[test]
    fn test_role_gates() {
        assert!(Role::Admin.can_view_reports());
        assert!(!Role::Staff.can_view_reports());
        assert_eq!(Role::Cashier.dashboard_path(), "/cashier-dashboard");
    }
}
