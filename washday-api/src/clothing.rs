use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Extension, Json, Router,
};
use rust_decimal::Decimal;
use serde::Deserialize;

use washday_core::identity::Role;
use washday_order::ClothingType;

use crate::error::{store_error, AppError};
use crate::middleware::auth::StaffClaims;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateClothingTypeRequest {
    pub name: String,
    pub price: Decimal,
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/v1/clothing-types", get(list_clothing_types).post(create_clothing_type))
}

/// GET /v1/clothing-types
pub async fn list_clothing_types(
    State(state): State<AppState>,
) -> Result<Json<Vec<ClothingType>>, AppError> {
    let types = state.clothing_types.list_clothing_types().await.map_err(store_error)?;
    Ok(Json(types))
}

/// POST /v1/clothing-types (admin)
pub async fn create_clothing_type(
    State(state): State<AppState>,
    Extension(claims): Extension<StaffClaims>,
    Json(req): Json<CreateClothingTypeRequest>,
) -> Result<(StatusCode, Json<ClothingType>), AppError> {
    claims.require(Role::Admin)?;

    let name = req.name.trim();
    if name.is_empty() {
        return Err(AppError::ValidationError("Clothing type name is required".into()));
    }
    if req.price < Decimal::ZERO {
        return Err(AppError::ValidationError("Price cannot be negative".into()));
    }

    let clothing_type = ClothingType::new(name.to_string(), req.price);
    state
        .clothing_types
        .create_clothing_type(&clothing_type)
        .await
        .map_err(store_error)?;

    Ok((StatusCode::CREATED, Json(clothing_type)))
}
