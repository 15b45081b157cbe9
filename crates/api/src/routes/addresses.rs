//! Address book routes.
//!
//! Every operation is scoped to the authenticated owner; touching someone
//! else's address is indistinguishable from it not existing.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;

use threadline_core::{AddressId, AddressKind, Phone, Pincode};

use crate::db::AddressRepository;
use crate::db::addresses::AddressFields;
use crate::error::{ApiError, Result};
use crate::middleware::RequireUser;
use crate::routes::auth::require_non_empty;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AddressRequest {
    #[serde(default)]
    pub kind: AddressKind,
    pub full_name: String,
    pub street: String,
    pub city: String,
    pub state: String,
    pub pincode: String,
    pub phone: String,
    #[serde(default)]
    pub is_default: bool,
}

impl AddressRequest {
    fn validate(self) -> Result<AddressFields> {
        require_non_empty(&[
            ("full_name", &self.full_name),
            ("street", &self.street),
            ("city", &self.city),
            ("state", &self.state),
        ])?;

        let pincode = Pincode::parse(self.pincode.trim())
            .map_err(|e| ApiError::Validation(e.to_string()))?;
        let phone = Phone::parse(self.phone.trim())
            .map_err(|e| ApiError::Validation(e.to_string()))?;

        Ok(AddressFields {
            kind: self.kind,
            full_name: self.full_name.trim().to_owned(),
            street: self.street.trim().to_owned(),
            city: self.city.trim().to_owned(),
            state: self.state.trim().to_owned(),
            pincode,
            phone,
            is_default: self.is_default,
        })
    }
}

/// GET /api/address - list own addresses, default first.
pub async fn index(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Result<impl IntoResponse> {
    let addresses = AddressRepository::new(state.pool()).list(user.id).await?;
    Ok(Json(json!({ "addresses": addresses })))
}

/// POST /api/address - create an address.
pub async fn create(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Json(body): Json<AddressRequest>,
) -> Result<impl IntoResponse> {
    let fields = body.validate()?;
    let address = AddressRepository::new(state.pool())
        .create(user.id, fields)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Address added successfully", "address": address })),
    ))
}

/// PUT /api/address/{id} - replace an address.
pub async fn update(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(id): Path<AddressId>,
    Json(body): Json<AddressRequest>,
) -> Result<impl IntoResponse> {
    let fields = body.validate()?;
    let address = AddressRepository::new(state.pool())
        .update(id, user.id, fields)
        .await?
        .ok_or_else(|| ApiError::NotFound("Address not found or unauthorized".to_owned()))?;

    Ok(Json(json!({ "message": "Address updated successfully", "address": address })))
}

/// DELETE /api/address/{id} - delete an address.
pub async fn remove(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(id): Path<AddressId>,
) -> Result<impl IntoResponse> {
    let deleted = AddressRepository::new(state.pool())
        .delete(id, user.id)
        .await?;
    if !deleted {
        return Err(ApiError::NotFound(
            "Address not found or unauthorized".to_owned(),
        ));
    }
    Ok(Json(json!({ "message": "Address deleted successfully" })))
}
