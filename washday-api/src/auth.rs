use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};

use washday_core::identity::{Role, StaffUser};

use crate::error::{store_error, AppError};
use crate::middleware::auth::StaffClaims;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: StaffUser,
    pub role: Role,
    pub redirect_to: &'static str,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub user: StaffUser,
    pub role: Role,
    pub expires_at: usize,
}

/// Unauthenticated sign-in route.
pub fn public_routes() -> Router<AppState> {
    Router::new().route("/v1/auth/login", post(login))
}

/// Session routes; mounted behind `staff_auth_middleware`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/auth/session", get(session))
        .route("/v1/auth/logout", post(logout))
}

async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let invalid = || AppError::AuthenticationError("Invalid username or password".into());

    if req.username.trim().is_empty() || req.password.is_empty() {
        return Err(AppError::ValidationError("Username and password are required".into()));
    }

    let user = state
        .staff
        .find_by_username(req.username.trim())
        .await
        .map_err(store_error)?
        .ok_or_else(invalid)?;

    let hash = user.password_hash.clone();
    let password = req.password;
    let verified = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .map_err(|e| AppError::InternalServerError(format!("Password check aborted: {}", e)))?
        .unwrap_or(false);
    if !verified {
        tracing::info!("Failed sign-in for {}", user.username);
        return Err(invalid());
    }

    let role = state
        .staff
        .role_for(user.id)
        .await
        .map_err(store_error)?
        .ok_or_else(|| AppError::AuthorizationError("No role assigned to this account".into()))?;

    let token = StaffClaims::for_user(&user, role, &state.auth).encode(&state.auth)?;
    tracing::info!("{} signed in as {}", user.username, role);

    Ok(Json(AuthResponse {
        token,
        redirect_to: role.dashboard_path(),
        user,
        role,
    }))
}

async fn session(
    State(state): State<AppState>,
    Extension(claims): Extension<StaffClaims>,
) -> Result<Json<SessionResponse>, AppError> {
    let user = state
        .staff
        .get_user(claims.sub)
        .await
        .map_err(store_error)?
        .ok_or_else(|| AppError::AuthenticationError("Account no longer exists".into()))?;

    // Role may have changed since the token was issued.
    let role = state
        .staff
        .role_for(user.id)
        .await
        .map_err(store_error)?
        .unwrap_or(claims.role);

    Ok(Json(SessionResponse { user, role, expires_at: claims.exp }))
}

/// Tokens are stateless; the client discards its copy.
async fn logout(Extension(claims): Extension<StaffClaims>) -> StatusCode {
    tracing::info!("{} signed out", claims.username);
    StatusCode::NO_CONTENT
}
