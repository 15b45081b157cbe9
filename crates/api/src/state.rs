//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::ThreadlineConfig;
use crate::services::gateway::{PaymentGateway, RazorpayClient};
use crate::services::otp::{OtpProvider, TwoFactorClient};

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`. The payment gateway and OTP provider are
/// held as trait objects so tests can substitute fakes.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ThreadlineConfig,
    pool: PgPool,
    gateway: Arc<dyn PaymentGateway>,
    otp: Arc<dyn OtpProvider>,
}

impl AppState {
    /// Create application state with the production gateway and OTP clients.
    #[must_use]
    pub fn new(config: ThreadlineConfig, pool: PgPool) -> Self {
        let gateway = Arc::new(RazorpayClient::new(&config.razorpay));
        let otp = Arc::new(TwoFactorClient::new(&config.otp));
        Self::with_services(config, pool, gateway, otp)
    }

    /// Create application state with explicit service implementations.
    ///
    /// Used by tests to inject fakes for the external collaborators.
    #[must_use]
    pub fn with_services(
        config: ThreadlineConfig,
        pool: PgPool,
        gateway: Arc<dyn PaymentGateway>,
        otp: Arc<dyn OtpProvider>,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                gateway,
                otp,
            }),
        }
    }

    /// Get a reference to the application configuration.
    #[must_use]
    pub fn config(&self) -> &ThreadlineConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the payment gateway adapter.
    #[must_use]
    pub fn gateway(&self) -> &dyn PaymentGateway {
        self.inner.gateway.as_ref()
    }

    /// Get a reference to the SMS OTP provider.
    #[must_use]
    pub fn otp(&self) -> &dyn OtpProvider {
        self.inner.otp.as_ref()
    }
}
