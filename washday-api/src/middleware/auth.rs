use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use washday_core::identity::{Role, StaffUser};

use crate::error::AppError;
use crate::state::{AppState, AuthConfig};

// ============================================================================
// JWT Claims
// ============================================================================

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct StaffClaims {
    pub sub: Uuid,
    pub username: String,
    pub role: Role,
    pub exp: usize,
}

impl StaffClaims {
    pub fn for_user(user: &StaffUser, role: Role, auth: &AuthConfig) -> Self {
        Self {
            sub: user.id,
            username: user.username.clone(),
            role,
            exp: (Utc::now() + Duration::seconds(auth.expiration as i64)).timestamp() as usize,
        }
    }

    pub fn encode(&self, auth: &AuthConfig) -> Result<String, AppError> {
        encode(&Header::default(), self, &EncodingKey::from_secret(auth.secret.as_bytes()))
            .map_err(|e| AppError::InternalServerError(format!("Token encoding failed: {}", e)))
    }

    pub fn decode(token: &str, auth: &AuthConfig) -> Result<Self, AppError> {
        decode::<StaffClaims>(
            token,
            &DecodingKey::from_secret(auth.secret.as_bytes()),
            &Validation::default(),
        )
        .map(|data| data.claims)
        .map_err(|_| AppError::AuthenticationError("Invalid or expired session".into()))
    }

    pub fn require(&self, role: Role) -> Result<(), AppError> {
        if self.role == role {
            Ok(())
        } else {
            Err(AppError::AuthorizationError(format!("{} role required", role)))
        }
    }
}

// ============================================================================
// Staff Authentication Middleware
// ============================================================================

pub async fn staff_auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = req
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .ok_or_else(|| AppError::AuthenticationError("Missing bearer token".into()))?;

    let claims = StaffClaims::decode(token, &state.auth)?;
    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}

// ============================================================================
// Role Gate
// ============================================================================

/// Runs inside `staff_auth_middleware`; rejects anyone but admins.
pub async fn require_admin(req: Request, next: Next) -> Result<Response, AppError> {
    let claims = req
        .extensions()
        .get::<StaffClaims>()
        .ok_or_else(|| AppError::AuthenticationError("Missing session".into()))?;
    claims.require(Role::Admin)?;

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn auth() -> AuthConfig {
        AuthConfig { secret: "test-secret".into(), expiration: 60 }
    }

    #[test]
    fn test_token_round_trip_keeps_role() {
        let user = StaffUser::new("mary".into(), "Mary W".into(), "hash".into());
        let claims = StaffClaims::for_user(&user, Role::Cashier, &auth());
        let token = claims.encode(&auth()).unwrap();
        let back = StaffClaims::decode(&token, &auth()).unwrap();
        assert_eq!(back.sub, user.id);
        assert_eq!(back.role, Role::Cashier);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let user = StaffUser::new("mary".into(), "Mary W".into(), "hash".into());
        let token = StaffClaims::for_user(&user, Role::Admin, &auth()).encode(&auth()).unwrap();
        let other = AuthConfig { secret: "other".into(), expiration: 60 };
        assert!(matches!(StaffClaims::decode(&token, &other), Err(AppError::AuthenticationError(_))));
    }

    #[test]
    fn test_require_role() {
        let user = StaffUser::new("joe".into(), "Joe K".into(), "hash".into());
        let claims = StaffClaims::for_user(&user, Role::Staff, &auth());
        assert!(claims.require(Role::Admin).is_err());
        assert!(claims.require(Role::Staff).is_ok());
    }
}
