//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                      - Health check
//!
//! # Auth (customers)
//! POST   /api/auth/register           - Register a customer account
//! POST   /api/auth/request-otp        - Send a login OTP over SMS
//! POST   /api/auth/verify-otp         - Verify the OTP, establish session
//! POST   /api/auth/logout             - Drop the session
//! GET    /api/auth/check-auth         - Whoami for the frontend
//!
//! # Auth (admins)
//! POST   /api/admin/register          - Register an admin account
//! POST   /api/admin/login             - Email/password login
//! POST   /api/admin/logout            - Drop the session
//! GET    /api/admin/check-auth        - Whoami, admin flavoured
//!
//! # Catalog
//! GET    /api/product                 - List products
//! GET    /api/product/{id}            - Product detail
//! POST   /api/product                 - Create product (admin)
//! PUT    /api/product/{id}            - Patch product (admin)
//! DELETE /api/product/{id}            - Delete product (admin)
//!
//! # Cart (requires auth)
//! GET    /api/cart                    - Fetch the cart
//! POST   /api/cart/add                - Add a line (merges by variant)
//! PUT    /api/cart/update             - Set a line's quantity
//! DELETE /api/cart/remove             - Remove lines by product + size
//! DELETE /api/cart/clear              - Empty the cart
//! POST   /api/cart/sync               - Merge a client-held cart in
//!
//! # Addresses (requires auth)
//! GET    /api/address                 - List own addresses
//! POST   /api/address                 - Create an address
//! PUT    /api/address/{id}            - Replace an address
//! DELETE /api/address/{id}            - Delete an address
//!
//! # Orders
//! POST   /api/order/checkout          - Create an order from the cart
//! POST   /api/order/verify            - Confirm a gateway payment
//! POST   /api/order/return            - Request a line return
//! GET    /api/order                   - Own order history
//! GET    /api/admin/orders            - All orders (admin)
//! PUT    /api/admin/update-orders/{id} - Override order status (admin)
//! POST   /api/admin/refund            - Refund a paid order (admin)
//! ```

pub mod addresses;
pub mod admin;
pub mod auth;
pub mod cart;
pub mod orders;
pub mod products;

use axum::{
    Router,
    routing::{delete, get, post, put},
};

use crate::state::AppState;

/// Create the customer auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/request-otp", post(auth::request_otp))
        .route("/verify-otp", post(auth::verify_otp))
        .route("/logout", post(auth::logout))
        .route("/check-auth", get(auth::check_auth))
}

/// Create the admin routes router (auth plus order administration).
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(admin::register))
        .route("/login", post(admin::login))
        .route("/logout", post(admin::logout))
        .route("/check-auth", get(admin::check_auth))
        .route("/orders", get(orders::list_all))
        .route("/update-orders/{id}", put(orders::update_status))
        .route("/refund", post(orders::refund))
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index).post(products::create))
        .route(
            "/{id}",
            get(products::show)
                .put(products::update)
                .delete(products::remove),
        )
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update", put(cart::update))
        .route("/remove", delete(cart::remove))
        .route("/clear", delete(cart::clear))
        .route("/sync", post(cart::sync))
}

/// Create the address routes router.
pub fn address_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(addresses::index).post(addresses::create))
        .route(
            "/{id}",
            put(addresses::update).delete(addresses::remove),
        )
}

/// Create the order routes router (customer side).
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(orders::index))
        .route("/checkout", post(orders::checkout))
        .route("/verify", post(orders::verify))
        .route("/return", post(orders::request_return))
}

/// Create all routes for the API.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .nest("/api/auth", auth_routes())
        .nest("/api/admin", admin_routes())
        .nest("/api/product", product_routes())
        .nest("/api/cart", cart_routes())
        .nest("/api/address", address_routes())
        .nest("/api/order", order_routes())
}

/// Health check endpoint.
async fn health() -> &'static str {
    "OK"
}
