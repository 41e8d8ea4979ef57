pub mod auth;
pub mod rate_limit;

pub use auth::{require_admin, staff_auth_middleware, StaffClaims};
pub use rate_limit::rate_limit_middleware;
