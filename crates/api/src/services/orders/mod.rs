//! Order / checkout state machine.
//!
//! Converts a cart + address + payment method into an order and drives the
//! post-sale lifecycle:
//!
//! ```text
//! Initiated -> {Pending | Paid} -> Shipped -> Delivered -> Refunded
//! ```
//!
//! `Failed` and `Cancelled` absorb. The two money-critical transitions
//! (`Initiated -> Paid`, `Paid -> Refunded`) are guarded by conditional
//! updates behind [`OrderStore`]; everything else either creates rows or is
//! an explicit admin override.

mod error;
mod store;

pub use error::OrderError;
pub use store::{OrderStore, PgOrderStore};

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use secrecy::SecretString;
use sqlx::PgPool;

use threadline_core::{
    AddressId, OrderId, OrderStatus, PaymentMethod, ProductId, UserId, to_minor_units,
};

use crate::db::orders::{NewOrder, SnapshotLine};
use crate::models::Order;
use crate::services::gateway::{PaymentGateway, verify_signature};

/// Days after order creation during which a return may be requested.
const RETURN_WINDOW_DAYS: i64 = 7;

/// Currency sent to the gateway.
const GATEWAY_CURRENCY: &str = "INR";

/// Order lifecycle service, generic over its storage seam.
pub struct OrderService<'a, S = PgOrderStore<'a>> {
    store: S,
    gateway: &'a dyn PaymentGateway,
    /// Shared key secret for callback signature verification.
    signature_secret: &'a SecretString,
}

impl<'a> OrderService<'a> {
    /// Create a service over the shared connection pool.
    #[must_use]
    pub const fn new(
        pool: &'a PgPool,
        gateway: &'a dyn PaymentGateway,
        signature_secret: &'a SecretString,
    ) -> Self {
        Self::with_store(PgOrderStore::new(pool), gateway, signature_secret)
    }
}

impl<'a, S: OrderStore> OrderService<'a, S> {
    /// Create a service over an explicit store.
    #[must_use]
    pub const fn with_store(
        store: S,
        gateway: &'a dyn PaymentGateway,
        signature_secret: &'a SecretString,
    ) -> Self {
        Self {
            store,
            gateway,
            signature_secret,
        }
    }

    /// Checkout: snapshot the caller's cart into a new order.
    ///
    /// The total is computed server-side from the snapshot; any
    /// client-supplied amount is ignored. For `cod` the order starts at
    /// `Pending` with no gateway involvement; for `razorpay` a gateway
    /// order is created first and the order starts at `Initiated`. The
    /// cart is left untouched - clearing it is a separate explicit call.
    ///
    /// # Errors
    ///
    /// `AddressNotFound` if the address is not the caller's, `EmptyCart`
    /// if there is nothing to order, `Gateway` if the intent call fails.
    pub async fn checkout(
        &self,
        user_id: UserId,
        address_id: AddressId,
        method: PaymentMethod,
    ) -> Result<Order, OrderError> {
        let address = self
            .store
            .address_owned(address_id, user_id)
            .await?
            .ok_or(OrderError::AddressNotFound)?;

        let cart = self
            .store
            .cart(user_id)
            .await?
            .filter(|c| !c.items.is_empty())
            .ok_or(OrderError::EmptyCart)?;

        let lines: Vec<SnapshotLine> = cart
            .items
            .iter()
            .map(|item| SnapshotLine {
                product_id: item.product_id,
                title: item.title.clone(),
                unit_price: item.price,
                size: item.size.clone(),
                color: item.color.clone(),
                quantity: item.quantity,
            })
            .collect();

        let total_amount = compute_total(&lines);

        let (status, gateway_order_id) = match method {
            PaymentMethod::Cod => (OrderStatus::Pending, None),
            PaymentMethod::Razorpay => {
                let amount_minor =
                    to_minor_units(total_amount).ok_or(OrderError::InvalidAmount)?;
                let receipt = format!("order_rcptid_{}", Utc::now().timestamp_millis());
                let id = self
                    .gateway
                    .create_order(amount_minor, GATEWAY_CURRENCY, &receipt)
                    .await?;
                (OrderStatus::Initiated, Some(id))
            }
        };

        let order = self
            .store
            .create_order(NewOrder {
                user_id,
                address_id: address.id,
                total_amount,
                method,
                status,
                gateway_order_id,
                lines,
            })
            .await?;

        Ok(order)
    }

    /// Verify a gateway payment callback and confirm the order.
    ///
    /// The callback must name this order's own gateway order, and the
    /// signature is recomputed from the order/payment id pair; on either
    /// mismatch the order is left exactly as it was. On success the order
    /// moves `Initiated -> Paid` atomically - if a concurrent request got
    /// there first, this reports `NotAwaitingPayment` rather than
    /// overwriting.
    ///
    /// # Errors
    ///
    /// `OrderNotFound`, `InvalidSignature`, or `NotAwaitingPayment`.
    pub async fn verify_payment(
        &self,
        order_id: OrderId,
        gateway_order_id: &str,
        gateway_payment_id: &str,
        signature: &str,
    ) -> Result<Order, OrderError> {
        let order = self
            .store
            .order(order_id)
            .await?
            .ok_or(OrderError::OrderNotFound)?;

        // A correctly signed triple minted for some other gateway order
        // must not confirm this one
        if order.gateway_order_id.as_deref() != Some(gateway_order_id) {
            return Err(OrderError::InvalidSignature);
        }

        // Hard rejection: a mismatch is a forged or tampered callback
        if !verify_signature(
            gateway_order_id,
            gateway_payment_id,
            signature,
            self.signature_secret,
        ) {
            return Err(OrderError::InvalidSignature);
        }

        if !self
            .store
            .mark_paid(order.id, gateway_payment_id, signature)
            .await?
        {
            return Err(OrderError::NotAwaitingPayment);
        }

        self.store
            .order(order.id)
            .await?
            .ok_or(OrderError::OrderNotFound)
    }

    /// Request a return for one line of an order.
    ///
    /// Owner-only, inside the return window, at most once per line.
    ///
    /// # Errors
    ///
    /// `OrderNotFound`, `WindowExpired`, `LineNotFound`, or
    /// `AlreadyRequested`.
    pub async fn request_return(
        &self,
        user_id: UserId,
        order_id: OrderId,
        product_id: ProductId,
        reason: &str,
    ) -> Result<(), OrderError> {
        let order = self
            .store
            .order_owned(order_id, user_id)
            .await?
            .ok_or(OrderError::OrderNotFound)?;

        if !within_return_window(order.created_at, Utc::now()) {
            return Err(OrderError::WindowExpired);
        }

        let line = order
            .items
            .iter()
            .find(|item| item.product_id == product_id)
            .ok_or(OrderError::LineNotFound)?;

        if line.return_requested {
            return Err(OrderError::AlreadyRequested);
        }

        // Conditional on the flag still being unset, so a duplicate racing
        // request cannot slip through between the read and the write
        if !self.store.flag_return(order.id, product_id, reason).await? {
            return Err(OrderError::AlreadyRequested);
        }

        Ok(())
    }

    /// Refund a paid order through the gateway.
    ///
    /// `amount` (rupees) refunds partially; `None` refunds in full. The
    /// status moves `Paid -> Refunded` atomically.
    ///
    /// # Errors
    ///
    /// `OrderNotFound`, `AlreadyRefunded` if already refunded, `NotPaid`
    /// for any other non-`Paid` status, `Gateway` on provider failure.
    pub async fn refund(
        &self,
        order_id: OrderId,
        gateway_payment_id: &str,
        amount: Option<Decimal>,
    ) -> Result<Order, OrderError> {
        let order = self
            .store
            .order(order_id)
            .await?
            .ok_or(OrderError::OrderNotFound)?;

        match order.status {
            OrderStatus::Refunded => return Err(OrderError::AlreadyRefunded),
            OrderStatus::Paid => {}
            _ => return Err(OrderError::NotPaid),
        }

        let amount_minor = match amount {
            Some(rupees) => Some(to_minor_units(rupees).ok_or(OrderError::InvalidAmount)?),
            None => None,
        };

        let refund = self
            .gateway
            .refund(gateway_payment_id, amount_minor)
            .await?;
        let refunded_amount = Decimal::new(refund.amount_minor, 2);

        if !self
            .store
            .mark_refunded(order.id, &refund.id, refunded_amount, Utc::now())
            .await?
        {
            // Lost a race with another refund of the same order
            return Err(OrderError::AlreadyRefunded);
        }

        self.store
            .order(order.id)
            .await?
            .ok_or(OrderError::OrderNotFound)
    }

    /// Admin override: set any status on any order.
    ///
    /// Intentionally unconstrained by the transition graph so operators
    /// can correct state by hand.
    ///
    /// # Errors
    ///
    /// `OrderNotFound` if the order does not exist.
    pub async fn update_status(
        &self,
        order_id: OrderId,
        status: OrderStatus,
    ) -> Result<Order, OrderError> {
        if !self.store.set_status(order_id, status).await? {
            return Err(OrderError::OrderNotFound);
        }
        self.store
            .order(order_id)
            .await?
            .ok_or(OrderError::OrderNotFound)
    }
}

/// Sum of unit price x quantity over snapshot lines.
#[must_use]
pub fn compute_total(lines: &[SnapshotLine]) -> Decimal {
    lines
        .iter()
        .map(|line| line.unit_price * Decimal::from(line.quantity))
        .sum()
}

/// Whether a return request at `now` falls inside the window opened at
/// order creation.
#[must_use]
pub fn within_return_window(created_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    now - created_at <= Duration::days(RETURN_WINDOW_DAYS)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use hmac::{Hmac, Mac};
    use rust_decimal::dec;
    use sha2::Sha256;

    use threadline_core::{AddressKind, CartId, Phone, Pincode};

    use super::*;
    use crate::db::RepositoryError;
    use crate::models::order::RefundDetails;
    use crate::models::{Address, Cart, CartLine, Order, OrderLine};
    use crate::services::gateway::{GatewayError, GatewayRefund};

    const KEY_SECRET: &str = "k3y_s3cr3t_v4lu3";

    fn sign(order_id: &str, payment_id: &str) -> String {
        let mut mac = Hmac::<Sha256>::new_from_slice(KEY_SECRET.as_bytes()).unwrap();
        mac.update(format!("{order_id}|{payment_id}").as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    fn line(price: Decimal, quantity: i32) -> SnapshotLine {
        SnapshotLine {
            product_id: ProductId::new(1),
            title: "Linen Shirt".to_owned(),
            unit_price: price,
            size: "M".to_owned(),
            color: "indigo".to_owned(),
            quantity,
        }
    }

    #[test]
    fn test_compute_total_empty() {
        assert_eq!(compute_total(&[]), Decimal::ZERO);
    }

    #[test]
    fn test_compute_total_sums_lines() {
        let lines = vec![line(dec!(499.50), 2), line(dec!(1299), 1)];
        assert_eq!(compute_total(&lines), dec!(2298.00));
    }

    #[test]
    fn test_compute_total_quantity_scales() {
        let lines = vec![line(dec!(100), 3)];
        assert_eq!(compute_total(&lines), dec!(300));
    }

    #[test]
    fn test_return_window_inside() {
        let created = Utc::now() - Duration::days(3);
        assert!(within_return_window(created, Utc::now()));
    }

    #[test]
    fn test_return_window_boundary() {
        let now = Utc::now();
        let created = now - Duration::days(RETURN_WINDOW_DAYS);
        assert!(within_return_window(created, now));
    }

    #[test]
    fn test_return_window_expired() {
        let now = Utc::now();
        let created = now - Duration::days(RETURN_WINDOW_DAYS) - Duration::seconds(1);
        assert!(!within_return_window(created, now));
    }

    // =========================================================================
    // Lifecycle tests over an in-memory store
    // =========================================================================

    #[derive(Default)]
    struct MemoryState {
        addresses: Vec<Address>,
        cart: Option<Cart>,
        orders: Vec<Order>,
    }

    /// In-memory [`OrderStore`] mirroring the repositories' conditional
    /// transitions: the guarded mutations check the same preconditions the
    /// SQL `WHERE` clauses enforce and report `false` when they fail.
    #[derive(Clone, Default)]
    struct MemoryStore {
        state: Arc<Mutex<MemoryState>>,
    }

    impl MemoryStore {
        fn order_status(&self, id: OrderId) -> OrderStatus {
            let state = self.state.lock().unwrap();
            state
                .orders
                .iter()
                .find(|o| o.id == id)
                .map(|o| o.status)
                .unwrap()
        }

        fn backdate(&self, id: OrderId, days: i64) {
            let mut state = self.state.lock().unwrap();
            let order = state.orders.iter_mut().find(|o| o.id == id).unwrap();
            order.created_at -= Duration::days(days);
        }
    }

    #[async_trait]
    impl OrderStore for MemoryStore {
        async fn address_owned(
            &self,
            id: AddressId,
            user_id: UserId,
        ) -> Result<Option<Address>, RepositoryError> {
            let state = self.state.lock().unwrap();
            Ok(state
                .addresses
                .iter()
                .find(|a| a.id == id && a.user_id == user_id)
                .cloned())
        }

        async fn cart(&self, user_id: UserId) -> Result<Option<Cart>, RepositoryError> {
            let state = self.state.lock().unwrap();
            Ok(state.cart.clone().filter(|c| c.user_id == user_id))
        }

        async fn create_order(&self, new: NewOrder) -> Result<Order, RepositoryError> {
            let mut state = self.state.lock().unwrap();
            let id = OrderId::new(i32::try_from(state.orders.len()).unwrap() + 1);
            let now = Utc::now();
            let items = new
                .lines
                .iter()
                .map(|l| OrderLine {
                    product_id: l.product_id,
                    title: l.title.clone(),
                    unit_price: l.unit_price,
                    size: l.size.clone(),
                    color: l.color.clone(),
                    quantity: l.quantity,
                    return_requested: false,
                    return_reason: None,
                })
                .collect();
            let order = Order {
                id,
                user_id: new.user_id,
                address_id: new.address_id,
                total_amount: new.total_amount,
                method: new.method,
                status: new.status,
                items,
                gateway_order_id: new.gateway_order_id,
                gateway_payment_id: None,
                refund_details: None,
                created_at: now,
                updated_at: now,
            };
            state.orders.push(order.clone());
            Ok(order)
        }

        async fn order(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
            let state = self.state.lock().unwrap();
            Ok(state.orders.iter().find(|o| o.id == id).cloned())
        }

        async fn order_owned(
            &self,
            id: OrderId,
            user_id: UserId,
        ) -> Result<Option<Order>, RepositoryError> {
            let state = self.state.lock().unwrap();
            Ok(state
                .orders
                .iter()
                .find(|o| o.id == id && o.user_id == user_id)
                .cloned())
        }

        async fn mark_paid(
            &self,
            id: OrderId,
            payment_id: &str,
            _signature: &str,
        ) -> Result<bool, RepositoryError> {
            let mut state = self.state.lock().unwrap();
            match state
                .orders
                .iter_mut()
                .find(|o| o.id == id && o.status == OrderStatus::Initiated)
            {
                Some(order) => {
                    order.status = OrderStatus::Paid;
                    order.gateway_payment_id = Some(payment_id.to_owned());
                    order.updated_at = Utc::now();
                    Ok(true)
                }
                None => Ok(false),
            }
        }

        async fn set_status(
            &self,
            id: OrderId,
            status: OrderStatus,
        ) -> Result<bool, RepositoryError> {
            let mut state = self.state.lock().unwrap();
            match state.orders.iter_mut().find(|o| o.id == id) {
                Some(order) => {
                    order.status = status;
                    Ok(true)
                }
                None => Ok(false),
            }
        }

        async fn flag_return(
            &self,
            id: OrderId,
            product_id: ProductId,
            reason: &str,
        ) -> Result<bool, RepositoryError> {
            let mut state = self.state.lock().unwrap();
            let Some(order) = state.orders.iter_mut().find(|o| o.id == id) else {
                return Ok(false);
            };
            match order
                .items
                .iter_mut()
                .find(|l| l.product_id == product_id && !l.return_requested)
            {
                Some(item) => {
                    item.return_requested = true;
                    item.return_reason = Some(reason.to_owned());
                    Ok(true)
                }
                None => Ok(false),
            }
        }

        async fn mark_refunded(
            &self,
            id: OrderId,
            refund_id: &str,
            amount: Decimal,
            refunded_at: DateTime<Utc>,
        ) -> Result<bool, RepositoryError> {
            let mut state = self.state.lock().unwrap();
            match state
                .orders
                .iter_mut()
                .find(|o| o.id == id && o.status == OrderStatus::Paid)
            {
                Some(order) => {
                    order.status = OrderStatus::Refunded;
                    order.refund_details = Some(RefundDetails {
                        refund_id: refund_id.to_owned(),
                        amount,
                        refunded_at,
                    });
                    Ok(true)
                }
                None => Ok(false),
            }
        }
    }

    /// Gateway fake that counts intent calls and mints predictable ids.
    #[derive(Default)]
    struct RecordingGateway {
        create_calls: AtomicUsize,
    }

    #[async_trait]
    impl PaymentGateway for RecordingGateway {
        async fn create_order(
            &self,
            amount_minor: i64,
            _currency: &str,
            _receipt: &str,
        ) -> Result<String, GatewayError> {
            self.create_calls.fetch_add(1, Ordering::SeqCst);
            Ok(format!("order_mem_{amount_minor}"))
        }

        async fn refund(
            &self,
            payment_id: &str,
            amount_minor: Option<i64>,
        ) -> Result<GatewayRefund, GatewayError> {
            Ok(GatewayRefund {
                id: format!("rfnd_{payment_id}"),
                amount_minor: amount_minor.unwrap_or(229_800),
            })
        }
    }

    fn customer() -> UserId {
        UserId::new(7)
    }

    fn cart_line(product_id: i32, price: Decimal, quantity: i32) -> CartLine {
        CartLine {
            product_id: ProductId::new(product_id),
            size: "M".to_owned(),
            color: "indigo".to_owned(),
            quantity,
            title: "Linen Shirt".to_owned(),
            price,
            images: vec!["https://cdn.example/shirt.jpg".to_owned()],
        }
    }

    fn seeded_store() -> MemoryStore {
        let store = MemoryStore::default();
        {
            let mut state = store.state.lock().unwrap();
            let now = Utc::now();
            state.addresses.push(Address {
                id: AddressId::new(1),
                user_id: customer(),
                kind: AddressKind::Home,
                full_name: "Asha Rao".to_owned(),
                street: "12 Gandhi Road".to_owned(),
                city: "Chennai".to_owned(),
                state: "Tamil Nadu".to_owned(),
                pincode: Pincode::parse("600001").unwrap(),
                phone: Phone::parse("9876543210").unwrap(),
                is_default: true,
                created_at: now,
                updated_at: now,
            });
            state.cart = Some(Cart {
                id: CartId::new(1),
                user_id: customer(),
                items: vec![
                    cart_line(1, dec!(499.50), 2),
                    cart_line(2, dec!(1299), 1),
                ],
                updated_at: now,
            });
        }
        store
    }

    fn service<'a>(
        store: &MemoryStore,
        gateway: &'a RecordingGateway,
        secret: &'a SecretString,
    ) -> OrderService<'a, MemoryStore> {
        OrderService::with_store(store.clone(), gateway, secret)
    }

    #[tokio::test]
    async fn test_checkout_rejects_foreign_address() {
        let store = seeded_store();
        let gateway = RecordingGateway::default();
        let secret = SecretString::from(KEY_SECRET);
        let svc = service(&store, &gateway, &secret);

        let err = svc
            .checkout(UserId::new(8), AddressId::new(1), PaymentMethod::Cod)
            .await
            .unwrap_err();
        assert!(matches!(err, OrderError::AddressNotFound));
    }

    #[tokio::test]
    async fn test_checkout_rejects_empty_cart() {
        let store = seeded_store();
        store.state.lock().unwrap().cart = None;
        let gateway = RecordingGateway::default();
        let secret = SecretString::from(KEY_SECRET);
        let svc = service(&store, &gateway, &secret);

        let err = svc
            .checkout(customer(), AddressId::new(1), PaymentMethod::Cod)
            .await
            .unwrap_err();
        assert!(matches!(err, OrderError::EmptyCart));

        // A cart row with no lines is just as empty
        {
            let mut state = store.state.lock().unwrap();
            state.cart = Some(Cart {
                id: CartId::new(1),
                user_id: customer(),
                items: vec![],
                updated_at: Utc::now(),
            });
        }
        let err = svc
            .checkout(customer(), AddressId::new(1), PaymentMethod::Cod)
            .await
            .unwrap_err();
        assert!(matches!(err, OrderError::EmptyCart));
    }

    #[tokio::test]
    async fn test_checkout_cod_skips_gateway() {
        let store = seeded_store();
        let gateway = RecordingGateway::default();
        let secret = SecretString::from(KEY_SECRET);
        let svc = service(&store, &gateway, &secret);

        let order = svc
            .checkout(customer(), AddressId::new(1), PaymentMethod::Cod)
            .await
            .unwrap();

        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.total_amount, dec!(2298.00));
        assert!(order.gateway_order_id.is_none());
        assert_eq!(gateway.create_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_checkout_razorpay_creates_gateway_order() {
        let store = seeded_store();
        let gateway = RecordingGateway::default();
        let secret = SecretString::from(KEY_SECRET);
        let svc = service(&store, &gateway, &secret);

        let order = svc
            .checkout(customer(), AddressId::new(1), PaymentMethod::Razorpay)
            .await
            .unwrap();

        assert_eq!(order.status, OrderStatus::Initiated);
        // 2298.00 rupees as paise
        assert_eq!(order.gateway_order_id.as_deref(), Some("order_mem_229800"));
        assert_eq!(gateway.create_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_verify_good_signature_confirms_payment() {
        let store = seeded_store();
        let gateway = RecordingGateway::default();
        let secret = SecretString::from(KEY_SECRET);
        let svc = service(&store, &gateway, &secret);

        let order = svc
            .checkout(customer(), AddressId::new(1), PaymentMethod::Razorpay)
            .await
            .unwrap();
        let gw_order = order.gateway_order_id.clone().unwrap();
        let signature = sign(&gw_order, "pay_123");

        let paid = svc
            .verify_payment(order.id, &gw_order, "pay_123", &signature)
            .await
            .unwrap();

        assert_eq!(paid.status, OrderStatus::Paid);
        assert_eq!(paid.gateway_payment_id.as_deref(), Some("pay_123"));
    }

    #[tokio::test]
    async fn test_verify_tampered_signature_changes_nothing() {
        let store = seeded_store();
        let gateway = RecordingGateway::default();
        let secret = SecretString::from(KEY_SECRET);
        let svc = service(&store, &gateway, &secret);

        let order = svc
            .checkout(customer(), AddressId::new(1), PaymentMethod::Razorpay)
            .await
            .unwrap();
        let gw_order = order.gateway_order_id.clone().unwrap();
        let mut signature = sign(&gw_order, "pay_123");
        let last = signature.pop().unwrap();
        signature.push(if last == '0' { '1' } else { '0' });

        let err = svc
            .verify_payment(order.id, &gw_order, "pay_123", &signature)
            .await
            .unwrap_err();

        assert!(matches!(err, OrderError::InvalidSignature));
        assert_eq!(store.order_status(order.id), OrderStatus::Initiated);
    }

    #[tokio::test]
    async fn test_verify_rejects_foreign_gateway_order() {
        let store = seeded_store();
        let gateway = RecordingGateway::default();
        let secret = SecretString::from(KEY_SECRET);
        let svc = service(&store, &gateway, &secret);

        let order = svc
            .checkout(customer(), AddressId::new(1), PaymentMethod::Razorpay)
            .await
            .unwrap();

        // Correctly signed, but for a different gateway order: replaying it
        // against this order must not confirm the payment
        let signature = sign("order_other", "pay_123");
        let err = svc
            .verify_payment(order.id, "order_other", "pay_123", &signature)
            .await
            .unwrap_err();

        assert!(matches!(err, OrderError::InvalidSignature));
        assert_eq!(store.order_status(order.id), OrderStatus::Initiated);
    }

    #[tokio::test]
    async fn test_verify_twice_reports_lost_race() {
        let store = seeded_store();
        let gateway = RecordingGateway::default();
        let secret = SecretString::from(KEY_SECRET);
        let svc = service(&store, &gateway, &secret);

        let order = svc
            .checkout(customer(), AddressId::new(1), PaymentMethod::Razorpay)
            .await
            .unwrap();
        let gw_order = order.gateway_order_id.clone().unwrap();
        let signature = sign(&gw_order, "pay_123");

        svc.verify_payment(order.id, &gw_order, "pay_123", &signature)
            .await
            .unwrap();
        let err = svc
            .verify_payment(order.id, &gw_order, "pay_123", &signature)
            .await
            .unwrap_err();

        assert!(matches!(err, OrderError::NotAwaitingPayment));
    }

    #[tokio::test]
    async fn test_return_flags_line_once() {
        let store = seeded_store();
        let gateway = RecordingGateway::default();
        let secret = SecretString::from(KEY_SECRET);
        let svc = service(&store, &gateway, &secret);

        let order = svc
            .checkout(customer(), AddressId::new(1), PaymentMethod::Cod)
            .await
            .unwrap();

        svc.request_return(customer(), order.id, ProductId::new(1), "too small")
            .await
            .unwrap();

        let err = svc
            .request_return(customer(), order.id, ProductId::new(1), "changed my mind")
            .await
            .unwrap_err();
        assert!(matches!(err, OrderError::AlreadyRequested));
    }

    #[tokio::test]
    async fn test_return_outside_window() {
        let store = seeded_store();
        let gateway = RecordingGateway::default();
        let secret = SecretString::from(KEY_SECRET);
        let svc = service(&store, &gateway, &secret);

        let order = svc
            .checkout(customer(), AddressId::new(1), PaymentMethod::Cod)
            .await
            .unwrap();
        store.backdate(order.id, RETURN_WINDOW_DAYS + 1);

        let err = svc
            .request_return(customer(), order.id, ProductId::new(1), "too small")
            .await
            .unwrap_err();
        assert!(matches!(err, OrderError::WindowExpired));
    }

    #[tokio::test]
    async fn test_return_unknown_line() {
        let store = seeded_store();
        let gateway = RecordingGateway::default();
        let secret = SecretString::from(KEY_SECRET);
        let svc = service(&store, &gateway, &secret);

        let order = svc
            .checkout(customer(), AddressId::new(1), PaymentMethod::Cod)
            .await
            .unwrap();

        let err = svc
            .request_return(customer(), order.id, ProductId::new(99), "never arrived")
            .await
            .unwrap_err();
        assert!(matches!(err, OrderError::LineNotFound));
    }

    #[tokio::test]
    async fn test_refund_requires_paid_status() {
        let store = seeded_store();
        let gateway = RecordingGateway::default();
        let secret = SecretString::from(KEY_SECRET);
        let svc = service(&store, &gateway, &secret);

        // cod order sits at Pending, which is not refundable
        let order = svc
            .checkout(customer(), AddressId::new(1), PaymentMethod::Cod)
            .await
            .unwrap();

        let err = svc.refund(order.id, "pay_123", None).await.unwrap_err();
        assert!(matches!(err, OrderError::NotPaid));
        assert_eq!(store.order_status(order.id), OrderStatus::Pending);
    }

    #[tokio::test]
    async fn test_refund_only_once() {
        let store = seeded_store();
        let gateway = RecordingGateway::default();
        let secret = SecretString::from(KEY_SECRET);
        let svc = service(&store, &gateway, &secret);

        let order = svc
            .checkout(customer(), AddressId::new(1), PaymentMethod::Razorpay)
            .await
            .unwrap();
        let gw_order = order.gateway_order_id.clone().unwrap();
        let signature = sign(&gw_order, "pay_123");
        svc.verify_payment(order.id, &gw_order, "pay_123", &signature)
            .await
            .unwrap();

        let refunded = svc.refund(order.id, "pay_123", None).await.unwrap();
        assert_eq!(refunded.status, OrderStatus::Refunded);
        let details = refunded.refund_details.unwrap();
        assert_eq!(details.refund_id, "rfnd_pay_123");
        assert_eq!(details.amount, dec!(2298.00));

        let err = svc.refund(order.id, "pay_123", None).await.unwrap_err();
        assert!(matches!(err, OrderError::AlreadyRefunded));
    }

    #[tokio::test]
    async fn test_refund_partial_amount() {
        let store = seeded_store();
        let gateway = RecordingGateway::default();
        let secret = SecretString::from(KEY_SECRET);
        let svc = service(&store, &gateway, &secret);

        let order = svc
            .checkout(customer(), AddressId::new(1), PaymentMethod::Razorpay)
            .await
            .unwrap();
        let gw_order = order.gateway_order_id.clone().unwrap();
        let signature = sign(&gw_order, "pay_123");
        svc.verify_payment(order.id, &gw_order, "pay_123", &signature)
            .await
            .unwrap();

        let refunded = svc
            .refund(order.id, "pay_123", Some(dec!(500)))
            .await
            .unwrap();
        // The recorded amount is what the gateway reports back, in rupees
        assert_eq!(refunded.refund_details.unwrap().amount, dec!(500.00));
    }
}
