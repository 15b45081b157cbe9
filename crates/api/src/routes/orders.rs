//! Order routes: checkout, payment confirmation, returns, and the admin
//! order views.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;

use threadline_core::{AddressId, OrderId, OrderStatus, PaymentMethod, ProductId};

use crate::db::OrderRepository;
use crate::error::Result;
use crate::middleware::{RequireAdmin, RequireUser};
use crate::services::orders::OrderService;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CheckoutRequest {
    pub address_id: AddressId,
    pub method: PaymentMethod,
}

#[derive(Debug, Deserialize)]
pub struct VerifyRequest {
    pub order_id: OrderId,
    pub razorpay_order_id: String,
    pub razorpay_payment_id: String,
    pub razorpay_signature: String,
}

#[derive(Debug, Deserialize)]
pub struct ReturnRequest {
    pub order_id: OrderId,
    pub product_id: ProductId,
    #[serde(default)]
    pub reason: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: OrderStatus,
}

#[derive(Debug, Deserialize)]
pub struct RefundRequest {
    pub order_id: OrderId,
    pub payment_id: String,
    /// Rupees; omit for a full refund.
    pub amount: Option<Decimal>,
}

fn service(state: &AppState) -> OrderService<'_> {
    OrderService::new(
        state.pool(),
        state.gateway(),
        &state.config().razorpay.key_secret,
    )
}

/// POST /api/order/checkout - snapshot the cart into an order.
///
/// The cart is left untouched; the client clears it explicitly once it
/// has the order in hand.
pub async fn checkout(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Json(body): Json<CheckoutRequest>,
) -> Result<impl IntoResponse> {
    let order = service(&state)
        .checkout(user.id, body.address_id, body.method)
        .await?;

    tracing::info!(order_id = %order.id, method = %order.method, "order created");

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Order created successfully", "order": order })),
    ))
}

/// POST /api/order/verify - confirm a gateway payment callback.
pub async fn verify(
    State(state): State<AppState>,
    RequireUser(_user): RequireUser,
    Json(body): Json<VerifyRequest>,
) -> Result<impl IntoResponse> {
    let order = service(&state)
        .verify_payment(
            body.order_id,
            &body.razorpay_order_id,
            &body.razorpay_payment_id,
            &body.razorpay_signature,
        )
        .await?;

    tracing::info!(order_id = %order.id, "payment verified");

    Ok(Json(json!({ "message": "Payment verified successfully", "order": order })))
}

/// POST /api/order/return - request a return for one line.
pub async fn request_return(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Json(body): Json<ReturnRequest>,
) -> Result<impl IntoResponse> {
    service(&state)
        .request_return(user.id, body.order_id, body.product_id, body.reason.trim())
        .await?;

    Ok(Json(json!({ "message": "Return requested successfully" })))
}

/// GET /api/order - the caller's order history, newest first.
pub async fn index(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Result<impl IntoResponse> {
    let orders = OrderRepository::new(state.pool())
        .list_for_user(user.id)
        .await?;
    Ok(Json(json!({ "orders": orders })))
}

/// GET /api/admin/orders - every order in the system.
pub async fn list_all(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> Result<impl IntoResponse> {
    let orders = OrderRepository::new(state.pool()).list_all().await?;
    Ok(Json(json!({ "orders": orders })))
}

/// PUT /api/admin/update-orders/{id} - manual status override.
pub async fn update_status(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<OrderId>,
    Json(body): Json<UpdateStatusRequest>,
) -> Result<impl IntoResponse> {
    let order = service(&state).update_status(id, body.status).await?;

    tracing::info!(order_id = %order.id, status = %order.status, "order status updated");

    Ok(Json(json!({ "message": "Order updated successfully", "order": order })))
}

/// POST /api/admin/refund - refund a paid order through the gateway.
pub async fn refund(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Json(body): Json<RefundRequest>,
) -> Result<impl IntoResponse> {
    let order = service(&state)
        .refund(body.order_id, &body.payment_id, body.amount)
        .await?;

    tracing::info!(order_id = %order.id, "order refunded");

    Ok(Json(json!({ "message": "Refund processed successfully", "order": order })))
}
