//! SMS OTP provider adapter.
//!
//! Wraps a 2Factor-style SMS API: one call sends an auto-generated OTP and
//! returns a provider session id, a second call verifies the OTP the
//! customer typed against that session.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use thiserror::Error;

use threadline_core::Phone;

use crate::config::OtpConfig;

/// Errors from the OTP provider.
#[derive(Debug, Error)]
pub enum OtpError {
    /// The HTTP request itself failed.
    #[error("OTP provider request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The provider reported a non-success status.
    #[error("OTP provider error: {0}")]
    Provider(String),
}

/// Capability set the login flow needs from an SMS OTP provider.
#[async_trait]
pub trait OtpProvider: Send + Sync {
    /// Send an OTP to the phone and return the provider session id.
    async fn send(&self, phone: &Phone) -> Result<String, OtpError>;

    /// Check an OTP against a previously issued session.
    ///
    /// `Ok(false)` means the provider rejected the OTP (wrong or expired on
    /// its side); transport failures are errors.
    async fn verify(&self, session_id: &str, otp: &str) -> Result<bool, OtpError>;
}

/// 2Factor REST client implementing [`OtpProvider`].
pub struct TwoFactorClient {
    http: reqwest::Client,
    base_url: String,
    api_key: SecretString,
}

#[derive(Debug, Deserialize)]
struct ProviderResponse {
    #[serde(rename = "Status")]
    status: String,
    #[serde(rename = "Details")]
    details: String,
}

impl TwoFactorClient {
    /// Create a client from configuration.
    #[must_use]
    pub fn new(config: &OtpConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
        }
    }
}

#[async_trait]
impl OtpProvider for TwoFactorClient {
    async fn send(&self, phone: &Phone) -> Result<String, OtpError> {
        let url = format!(
            "{}/API/V1/{}/SMS/{}/AUTOGEN",
            self.base_url,
            self.api_key.expose_secret(),
            phone
        );
        let response: ProviderResponse = self.http.get(url).send().await?.json().await?;

        if response.status == "Success" {
            Ok(response.details)
        } else {
            Err(OtpError::Provider(response.details))
        }
    }

    async fn verify(&self, session_id: &str, otp: &str) -> Result<bool, OtpError> {
        let url = format!(
            "{}/API/V1/{}/SMS/VERIFY/{}/{}",
            self.base_url,
            self.api_key.expose_secret(),
            session_id,
            otp
        );
        let response: ProviderResponse = self.http.get(url).send().await?.json().await?;
        Ok(response.status == "Success")
    }
}
