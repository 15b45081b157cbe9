//! Integration tests for Threadline.
//!
//! Everything in `tests/` runs against a live server and database and is
//! `#[ignore]`d by default so `cargo test` stays self-contained.
//!
//! # Running
//!
//! ```bash
//! # Start PostgreSQL and the API server, with the OTP provider stubbed
//! # to accept the code in TEST_OTP.
//! cargo run -p threadline-api
//!
//! # Run the ignored suite
//! cargo test -p threadline-integration-tests -- --ignored
//! ```
//!
//! # Environment
//!
//! - `API_BASE_URL` - server under test (default `http://localhost:3000`)
//! - `TEST_DATABASE_URL` - direct database access for state assertions
//! - `TEST_OTP` - the code the stubbed OTP provider accepts (default
//!   `123456`)

use chrono::Utc;
use reqwest::Client;
use serde_json::{Value, json};
use sqlx::PgPool;

/// Base URL of the server under test.
#[must_use]
pub fn base_url() -> String {
    std::env::var("API_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_owned())
}

/// The OTP code the stubbed provider accepts.
#[must_use]
pub fn test_otp() -> String {
    std::env::var("TEST_OTP").unwrap_or_else(|_| "123456".to_owned())
}

/// Direct database connection for asserting on stored state.
///
/// # Panics
///
/// Panics if `TEST_DATABASE_URL` is unset or unreachable.
pub async fn db_pool() -> PgPool {
    let url = std::env::var("TEST_DATABASE_URL").expect("TEST_DATABASE_URL must be set");
    PgPool::connect(&url)
        .await
        .expect("Failed to connect to test database")
}

/// Register a fresh customer and log in through the OTP flow.
///
/// Returns a cookie-holding client with an established session. Each call
/// mints a unique email and mobile number so tests do not collide.
///
/// # Panics
///
/// Panics if any step of the registration or login flow fails.
pub async fn customer_client() -> Client {
    let client = Client::builder()
        .cookie_store(true)
        .build()
        .expect("Failed to create HTTP client");
    let base = base_url();
    let suffix = Utc::now().timestamp_micros();
    let phone = format!("9{:09}", suffix % 1_000_000_000);

    let resp = client
        .post(format!("{base}/api/auth/register"))
        .json(&json!({
            "first_name": "Test",
            "last_name": "Customer",
            "email": format!("customer+{suffix}@example.com"),
            "phone": phone,
        }))
        .send()
        .await
        .expect("Failed to register test customer");
    assert!(resp.status().is_success(), "register: {}", resp.status());

    let resp = client
        .post(format!("{base}/api/auth/request-otp"))
        .json(&json!({ "phone": phone }))
        .send()
        .await
        .expect("Failed to request OTP");
    assert!(resp.status().is_success(), "request-otp: {}", resp.status());

    let resp = client
        .post(format!("{base}/api/auth/verify-otp"))
        .json(&json!({ "phone": phone, "otp": test_otp() }))
        .send()
        .await
        .expect("Failed to verify OTP");
    assert!(resp.status().is_success(), "verify-otp: {}", resp.status());

    client
}

/// The logged-in user's id, via `check-auth`.
///
/// # Panics
///
/// Panics if the session is not established.
pub async fn current_user_id(client: &Client) -> i64 {
    let body: Value = client
        .get(format!("{}/api/auth/check-auth", base_url()))
        .send()
        .await
        .expect("Failed to call check-auth")
        .json()
        .await
        .expect("check-auth did not return JSON");
    body["user"]["id"].as_i64().expect("user id missing")
}

/// Any product id from the catalog.
///
/// # Panics
///
/// Panics if the catalog is empty.
pub async fn any_product_id(client: &Client) -> i64 {
    let body: Value = client
        .get(format!("{}/api/product", base_url()))
        .send()
        .await
        .expect("Failed to list products")
        .json()
        .await
        .expect("product list did not return JSON");
    body["products"][0]["id"]
        .as_i64()
        .expect("catalog must contain at least one product")
}
