//! Address book ownership scoping against a running server.
//!
//! A user's addresses must be invisible to everyone else: non-owner
//! mutation answers 404, never 403, so the id's existence does not leak.
//!
//! Run with: `cargo test -p threadline-integration-tests -- --ignored`

#![allow(clippy::unwrap_used)]

use reqwest::StatusCode;
use serde_json::{Value, json};

use threadline_integration_tests::{base_url, customer_client};

fn address_body() -> Value {
    json!({
        "kind": "home",
        "full_name": "Asha Rao",
        "street": "12 Gandhi Road",
        "city": "Chennai",
        "state": "Tamil Nadu",
        "pincode": "600001",
        "phone": "9876543210",
        "is_default": true,
    })
}

#[tokio::test]
#[ignore = "Requires a running API server, database, and OTP stub"]
async fn test_non_owner_update_is_404() {
    let base = base_url();
    let owner = customer_client().await;
    let intruder = customer_client().await;

    let created: Value = owner
        .post(format!("{base}/api/address"))
        .json(&address_body())
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let address_id = created["address"]["id"].as_i64().unwrap();

    let resp = intruder
        .put(format!("{base}/api/address/{address_id}"))
        .json(&address_body())
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "Address not found or unauthorized");
}

#[tokio::test]
#[ignore = "Requires a running API server, database, and OTP stub"]
async fn test_non_owner_delete_is_404() {
    let base = base_url();
    let owner = customer_client().await;
    let intruder = customer_client().await;

    let created: Value = owner
        .post(format!("{base}/api/address"))
        .json(&address_body())
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let address_id = created["address"]["id"].as_i64().unwrap();

    let resp = intruder
        .delete(format!("{base}/api/address/{address_id}"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    // The owner still sees the address
    let listed: Value = owner
        .get(format!("{base}/api/address"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let ids: Vec<i64> = listed["addresses"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|a| a["id"].as_i64())
        .collect();
    assert!(ids.contains(&address_id));
}
