//! Cart routes.
//!
//! All operations act on the authenticated user's own cart. Variant
//! merging happens inside the repository's upsert, so concurrent adds
//! accumulate rather than overwrite.

use axum::{Json, extract::State, response::IntoResponse};
use serde::Deserialize;
use serde_json::json;

use threadline_core::ProductId;

use crate::db::carts::IncomingLine;
use crate::db::{CartRepository, ProductRepository};
use crate::error::{ApiError, Result};
use crate::middleware::RequireUser;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CartLineRequest {
    pub product_id: ProductId,
    pub size: String,
    pub color: String,
    pub quantity: i32,
}

#[derive(Debug, Deserialize)]
pub struct RemoveRequest {
    pub product_id: ProductId,
    pub size: String,
}

#[derive(Debug, Deserialize)]
pub struct SyncRequest {
    pub items: Vec<CartLineRequest>,
}

/// Reject lines referencing products that are not in the catalog.
async fn require_product(state: &AppState, product_id: ProductId) -> Result<()> {
    ProductRepository::new(state.pool())
        .get(product_id)
        .await?
        .map(|_| ())
        .ok_or_else(|| ApiError::NotFound("Product not found".to_owned()))
}

impl CartLineRequest {
    fn validate(&self) -> Result<IncomingLine> {
        if self.quantity < 1 {
            return Err(ApiError::Validation(
                "quantity must be at least 1".to_owned(),
            ));
        }
        Ok(IncomingLine {
            product_id: self.product_id,
            size: self.size.clone(),
            color: self.color.clone(),
            quantity: self.quantity,
        })
    }
}

/// GET /api/cart - fetch the cart.
///
/// A user who never added anything gets an empty item list, not a 404.
pub async fn show(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Result<impl IntoResponse> {
    let cart = CartRepository::new(state.pool()).get(user.id).await?;
    let items = cart.map(|c| c.items).unwrap_or_default();
    Ok(Json(json!({ "items": items })))
}

/// POST /api/cart/add - add a line, merging by variant.
pub async fn add(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Json(body): Json<CartLineRequest>,
) -> Result<impl IntoResponse> {
    let line = body.validate()?;
    require_product(&state, line.product_id).await?;

    CartRepository::new(state.pool())
        .add_line(user.id, &line)
        .await?;
    Ok(Json(json!({ "message": "Item added to cart" })))
}

/// PUT /api/cart/update - set an existing line's quantity.
pub async fn update(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Json(body): Json<CartLineRequest>,
) -> Result<impl IntoResponse> {
    let line = body.validate()?;
    let updated = CartRepository::new(state.pool())
        .set_quantity(user.id, &line)
        .await?;
    if !updated {
        return Err(ApiError::NotFound("Item not found in cart".to_owned()));
    }
    Ok(Json(json!({ "message": "Cart updated" })))
}

/// DELETE /api/cart/remove - remove lines by product and size, any color.
pub async fn remove(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Json(body): Json<RemoveRequest>,
) -> Result<impl IntoResponse> {
    let removed = CartRepository::new(state.pool())
        .remove_lines(user.id, body.product_id, &body.size)
        .await?
        .ok_or_else(|| ApiError::NotFound("Cart not found".to_owned()))?;

    if removed == 0 {
        return Err(ApiError::NotFound("Item not found in cart".to_owned()));
    }
    Ok(Json(json!({ "message": "Item removed from cart" })))
}

/// DELETE /api/cart/clear - empty the cart.
pub async fn clear(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Result<impl IntoResponse> {
    CartRepository::new(state.pool()).clear(user.id).await?;
    Ok(Json(json!({ "message": "Cart cleared" })))
}

/// POST /api/cart/sync - merge a client-held (pre-login) cart in.
///
/// Each incoming line goes through the same variant merge as an add, so
/// syncing twice never duplicates lines.
pub async fn sync(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Json(body): Json<SyncRequest>,
) -> Result<impl IntoResponse> {
    let lines = body
        .items
        .iter()
        .map(CartLineRequest::validate)
        .collect::<Result<Vec<_>>>()?;
    for line in &lines {
        require_product(&state, line.product_id).await?;
    }

    let repo = CartRepository::new(state.pool());
    repo.merge_lines(user.id, &lines).await?;

    let cart = repo.get(user.id).await?;
    let items = cart.map(|c| c.items).unwrap_or_default();
    Ok(Json(json!({ "message": "Cart synced", "items": items })))
}
