//! Payment gateway adapter.
//!
//! The [`PaymentGateway`] trait is the only surface the order lifecycle
//! sees: create a gateway-side order, issue a refund. Callback signature
//! verification is a pure function and lives outside the trait so it can
//! be tested without any client at all.

use async_trait::async_trait;
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use sha2::Sha256;
use thiserror::Error;

use crate::config::RazorpayConfig;

type HmacSha256 = Hmac<Sha256>;

/// Errors from the payment gateway.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The HTTP request itself failed (connect, timeout, decode).
    #[error("gateway request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The gateway answered with a non-success status.
    #[error("gateway returned {status}: {message}")]
    Api { status: u16, message: String },
}

/// A refund as reported by the gateway.
#[derive(Debug, Clone)]
pub struct GatewayRefund {
    /// Gateway-assigned refund id.
    pub id: String,
    /// Refunded amount in minor units (paise).
    pub amount_minor: i64,
}

/// Capability set the order component needs from a payment gateway.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Create a gateway-side order (payment intent) and return its id.
    ///
    /// `amount_minor` is in the gateway's minor-unit convention (paise).
    async fn create_order(
        &self,
        amount_minor: i64,
        currency: &str,
        receipt: &str,
    ) -> Result<String, GatewayError>;

    /// Refund a captured payment, optionally partially.
    ///
    /// `None` refunds the full captured amount.
    async fn refund(
        &self,
        payment_id: &str,
        amount_minor: Option<i64>,
    ) -> Result<GatewayRefund, GatewayError>;
}

/// Verify a gateway callback signature.
///
/// Recomputes HMAC-SHA256 over `"{order_id}|{payment_id}"` with the shared
/// key secret, hex-encodes it, and compares against the supplied signature.
/// Any mismatch means a forged or tampered callback.
#[must_use]
pub fn verify_signature(
    gateway_order_id: &str,
    gateway_payment_id: &str,
    signature: &str,
    secret: &SecretString,
) -> bool {
    let Ok(mut mac) = HmacSha256::new_from_slice(secret.expose_secret().as_bytes()) else {
        return false;
    };
    mac.update(format!("{gateway_order_id}|{gateway_payment_id}").as_bytes());

    let computed = hex::encode(mac.finalize().into_bytes());
    computed == signature
}

// =============================================================================
// Razorpay HTTP client
// =============================================================================

/// Razorpay REST client implementing [`PaymentGateway`].
pub struct RazorpayClient {
    http: reqwest::Client,
    base_url: String,
    key_id: String,
    key_secret: SecretString,
}

#[derive(Debug, Deserialize)]
struct CreatedOrder {
    id: String,
}

#[derive(Debug, Deserialize)]
struct CreatedRefund {
    id: String,
    amount: i64,
}

impl RazorpayClient {
    /// Create a client from configuration.
    #[must_use]
    pub fn new(config: &RazorpayConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.base_url.clone(),
            key_id: config.key_id.clone(),
            key_secret: config.key_secret.clone(),
        }
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, GatewayError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response.text().await.unwrap_or_default();
        Err(GatewayError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl PaymentGateway for RazorpayClient {
    async fn create_order(
        &self,
        amount_minor: i64,
        currency: &str,
        receipt: &str,
    ) -> Result<String, GatewayError> {
        let response = self
            .http
            .post(format!("{}/v1/orders", self.base_url))
            .basic_auth(&self.key_id, Some(self.key_secret.expose_secret()))
            .json(&serde_json::json!({
                "amount": amount_minor,
                "currency": currency,
                "receipt": receipt,
            }))
            .send()
            .await?;

        let order: CreatedOrder = Self::check(response).await?.json().await?;
        Ok(order.id)
    }

    async fn refund(
        &self,
        payment_id: &str,
        amount_minor: Option<i64>,
    ) -> Result<GatewayRefund, GatewayError> {
        let mut body = serde_json::Map::new();
        if let Some(amount) = amount_minor {
            body.insert("amount".to_owned(), amount.into());
        }

        let response = self
            .http
            .post(format!("{}/v1/payments/{payment_id}/refund", self.base_url))
            .basic_auth(&self.key_id, Some(self.key_secret.expose_secret()))
            .json(&body)
            .send()
            .await?;

        let refund: CreatedRefund = Self::check(response).await?.json().await?;
        Ok(GatewayRefund {
            id: refund.id,
            amount_minor: refund.amount,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn sign(order_id: &str, payment_id: &str, secret: &str) -> String {
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(format!("{order_id}|{payment_id}").as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    #[test]
    fn test_verify_signature_roundtrip() {
        let secret = SecretString::from("k3y_s3cr3t_v4lu3");
        let signature = sign("order_abc", "pay_def", "k3y_s3cr3t_v4lu3");
        assert!(verify_signature("order_abc", "pay_def", &signature, &secret));
    }

    #[test]
    fn test_verify_signature_tampered() {
        let secret = SecretString::from("k3y_s3cr3t_v4lu3");
        let mut signature = sign("order_abc", "pay_def", "k3y_s3cr3t_v4lu3");
        // Flip the last hex digit
        let last = signature.pop().unwrap();
        signature.push(if last == '0' { '1' } else { '0' });
        assert!(!verify_signature(
            "order_abc",
            "pay_def",
            &signature,
            &secret
        ));
    }

    #[test]
    fn test_verify_signature_wrong_secret() {
        let signature = sign("order_abc", "pay_def", "k3y_s3cr3t_v4lu3");
        let other = SecretString::from("a_different_secret");
        assert!(!verify_signature("order_abc", "pay_def", &signature, &other));
    }

    #[test]
    fn test_verify_signature_swapped_ids() {
        // The message is order|payment; swapping them must not verify
        let secret = SecretString::from("k3y_s3cr3t_v4lu3");
        let signature = sign("order_abc", "pay_def", "k3y_s3cr3t_v4lu3");
        assert!(!verify_signature("pay_def", "order_abc", &signature, &secret));
    }

    /// Minimal in-memory gateway used to exercise the trait object surface.
    struct FakeGateway;

    #[async_trait]
    impl PaymentGateway for FakeGateway {
        async fn create_order(
            &self,
            amount_minor: i64,
            _currency: &str,
            _receipt: &str,
        ) -> Result<String, GatewayError> {
            Ok(format!("order_fake_{amount_minor}"))
        }

        async fn refund(
            &self,
            payment_id: &str,
            amount_minor: Option<i64>,
        ) -> Result<GatewayRefund, GatewayError> {
            Ok(GatewayRefund {
                id: format!("rfnd_{payment_id}"),
                amount_minor: amount_minor.unwrap_or(10_000),
            })
        }
    }

    #[tokio::test]
    async fn test_trait_object_dispatch() {
        let gateway: &dyn PaymentGateway = &FakeGateway;
        let id = gateway.create_order(49_900, "INR", "rcpt_1").await.unwrap();
        assert_eq!(id, "order_fake_49900");

        let refund = gateway.refund("pay_9", None).await.unwrap();
        assert_eq!(refund.id, "rfnd_pay_9");
        assert_eq!(refund.amount_minor, 10_000);
    }
}
