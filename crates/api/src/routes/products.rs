//! Catalog routes.
//!
//! Reads are public; writes require an admin session.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;

use threadline_core::ProductId;

use crate::db::ProductRepository;
use crate::db::products::{NewProduct, ProductPatch};
use crate::error::{ApiError, Result};
use crate::middleware::RequireAdmin;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateProductRequest {
    pub title: String,
    pub description: Option<String>,
    pub price: Decimal,
    #[serde(default)]
    pub stock: i32,
    pub categories: Vec<String>,
    pub sizes: Vec<String>,
    #[serde(default)]
    pub colors: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub images: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateProductRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub stock: Option<i32>,
    pub categories: Option<Vec<String>>,
    pub sizes: Option<Vec<String>>,
    pub colors: Option<Vec<String>>,
    pub tags: Option<Vec<String>>,
    pub images: Option<Vec<String>>,
}

/// GET /api/product - list the catalog.
pub async fn index(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let products = ProductRepository::new(state.pool()).list().await?;
    Ok(Json(json!({ "products": products })))
}

/// GET /api/product/{id} - product detail.
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<impl IntoResponse> {
    let product = ProductRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Product not found".to_owned()))?;
    Ok(Json(json!({ "product": product })))
}

/// POST /api/product - create a product (admin).
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Json(body): Json<CreateProductRequest>,
) -> Result<impl IntoResponse> {
    validate_new_product(&body)?;

    let product = ProductRepository::new(state.pool())
        .create(NewProduct {
            title: body.title.trim().to_owned(),
            description: body.description,
            price: body.price,
            stock: body.stock,
            categories: body.categories,
            sizes: body.sizes,
            colors: body.colors,
            tags: body.tags,
            images: body.images,
        })
        .await?;

    tracing::info!(product_id = %product.id, "product created");

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Product created successfully", "product": product })),
    ))
}

/// PUT /api/product/{id} - patch a product (admin).
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<ProductId>,
    Json(body): Json<UpdateProductRequest>,
) -> Result<impl IntoResponse> {
    if let Some(price) = body.price {
        if price <= Decimal::ZERO {
            return Err(ApiError::Validation("price must be positive".to_owned()));
        }
    }
    if let Some(title) = &body.title {
        if title.trim().is_empty() {
            return Err(ApiError::Validation("title cannot be blank".to_owned()));
        }
    }

    let product = ProductRepository::new(state.pool())
        .update(
            id,
            ProductPatch {
                title: body.title,
                description: body.description,
                price: body.price,
                stock: body.stock,
                categories: body.categories,
                sizes: body.sizes,
                colors: body.colors,
                tags: body.tags,
                images: body.images,
            },
        )
        .await?
        .ok_or_else(|| ApiError::NotFound("Product not found".to_owned()))?;

    Ok(Json(json!({ "message": "Product updated successfully", "product": product })))
}

/// DELETE /api/product/{id} - delete a product (admin).
pub async fn remove(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<ProductId>,
) -> Result<impl IntoResponse> {
    let deleted = ProductRepository::new(state.pool()).delete(id).await?;
    if !deleted {
        return Err(ApiError::NotFound("Product not found".to_owned()));
    }

    tracing::info!(product_id = %id, "product deleted");
    Ok(Json(json!({ "message": "Product deleted successfully" })))
}

fn validate_new_product(body: &CreateProductRequest) -> Result<()> {
    if body.title.trim().is_empty() {
        return Err(ApiError::Validation("title is required".to_owned()));
    }
    if body.price <= Decimal::ZERO {
        return Err(ApiError::Validation("price must be positive".to_owned()));
    }
    if body.stock < 0 {
        return Err(ApiError::Validation("stock cannot be negative".to_owned()));
    }
    if body.categories.is_empty() {
        return Err(ApiError::Validation(
            "at least one category is required".to_owned(),
        ));
    }
    if body.sizes.is_empty() {
        return Err(ApiError::Validation(
            "at least one size is required".to_owned(),
        ));
    }
    if body.images.is_empty() {
        return Err(ApiError::Validation(
            "at least one image is required".to_owned(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::dec;

    fn valid_request() -> CreateProductRequest {
        CreateProductRequest {
            title: "Linen Shirt".to_owned(),
            description: None,
            price: dec!(1299),
            stock: 10,
            categories: vec!["shirts".to_owned()],
            sizes: vec!["M".to_owned()],
            colors: vec![],
            tags: vec![],
            images: vec!["https://cdn.example.com/1.jpg".to_owned()],
        }
    }

    #[test]
    fn test_validate_new_product_ok() {
        assert!(validate_new_product(&valid_request()).is_ok());
    }

    #[test]
    fn test_validate_new_product_rejects_zero_price() {
        let mut req = valid_request();
        req.price = Decimal::ZERO;
        assert!(validate_new_product(&req).is_err());
    }

    #[test]
    fn test_validate_new_product_rejects_blank_title() {
        let mut req = valid_request();
        req.title = "   ".to_owned();
        assert!(validate_new_product(&req).is_err());
    }

    #[test]
    fn test_validate_new_product_requires_image() {
        let mut req = valid_request();
        req.images.clear();
        assert!(validate_new_product(&req).is_err());
    }
}
