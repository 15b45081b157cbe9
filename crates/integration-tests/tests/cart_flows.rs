//! End-to-end cart behavior against a running server.
//!
//! These tests require:
//! - The API server running (`cargo run -p threadline-api`)
//! - `PostgreSQL` reachable via `TEST_DATABASE_URL`
//! - The OTP provider stubbed to accept `TEST_OTP`
//!
//! Run with: `cargo test -p threadline-integration-tests -- --ignored`

#![allow(clippy::unwrap_used)]

use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use serde_json::{Value, json};

use threadline_integration_tests::{any_product_id, base_url, current_user_id, customer_client, db_pool};

async fn cart_items(client: &Client) -> Vec<Value> {
    let body: Value = client
        .get(format!("{}/api/cart", base_url()))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    body["items"].as_array().cloned().unwrap_or_default()
}

async fn cart_updated_at(user_id: i64) -> DateTime<Utc> {
    let pool = db_pool().await;
    sqlx::query_scalar("SELECT updated_at FROM carts WHERE user_id = $1")
        .bind(i32::try_from(user_id).unwrap())
        .fetch_one(&pool)
        .await
        .expect("cart row must exist")
}

#[tokio::test]
#[ignore = "Requires a running API server, database, and OTP stub"]
async fn test_add_same_variant_accumulates() {
    let client = customer_client().await;
    let base = base_url();
    let product_id = any_product_id(&client).await;

    let line = json!({ "product_id": product_id, "size": "M", "color": "indigo", "quantity": 1 });
    let resp = client
        .post(format!("{base}/api/cart/add"))
        .json(&line)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let line = json!({ "product_id": product_id, "size": "M", "color": "indigo", "quantity": 2 });
    let resp = client
        .post(format!("{base}/api/cart/add"))
        .json(&line)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    // One line per variant, quantities accumulated
    let items = cart_items(&client).await;
    let matching: Vec<_> = items
        .iter()
        .filter(|i| i["product_id"].as_i64() == Some(product_id) && i["size"] == "M")
        .collect();
    assert_eq!(matching.len(), 1);
    assert_eq!(matching[0]["quantity"].as_i64(), Some(3));
}

#[tokio::test]
#[ignore = "Requires a running API server, database, and OTP stub"]
async fn test_clear_empty_cart_leaves_timestamp() {
    let client = customer_client().await;
    let base = base_url();
    let user_id = current_user_id(&client).await;
    let product_id = any_product_id(&client).await;

    // Materialize the cart, then empty it
    let line = json!({ "product_id": product_id, "size": "S", "color": "white", "quantity": 1 });
    client
        .post(format!("{base}/api/cart/add"))
        .json(&line)
        .send()
        .await
        .unwrap();
    client
        .delete(format!("{base}/api/cart/clear"))
        .send()
        .await
        .unwrap();

    let before = cart_updated_at(user_id).await;

    // Clearing an already-empty cart succeeds but must not re-stamp it
    let resp = client
        .delete(format!("{base}/api/cart/clear"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(cart_updated_at(user_id).await, before);
}

#[tokio::test]
#[ignore = "Requires a running API server, database, and OTP stub"]
async fn test_remove_missing_line_is_404_and_untouched() {
    let client = customer_client().await;
    let base = base_url();
    let user_id = current_user_id(&client).await;
    let product_id = any_product_id(&client).await;

    let line = json!({ "product_id": product_id, "size": "S", "color": "white", "quantity": 1 });
    client
        .post(format!("{base}/api/cart/add"))
        .json(&line)
        .send()
        .await
        .unwrap();

    let before = cart_updated_at(user_id).await;

    let resp = client
        .delete(format!("{base}/api/cart/remove"))
        .json(&json!({ "product_id": product_id, "size": "NO_SUCH_SIZE" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(cart_updated_at(user_id).await, before);
}
