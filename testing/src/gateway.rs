//! Fake payment processor.

use rust_decimal::Decimal;
use shoutout_core::ports::{PaymentGateway, RemoteResource};
use shoutout_core::{BoxFuture, GatewayError, Order};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// Default amount above which the fake processor refuses payments.
pub const DEFAULT_REJECT_ABOVE: Decimal = Decimal::from_parts(1_000_000, 0, 0, false, 2);

/// Accepts every order up to a threshold, then refuses the payment.
#[derive(Debug)]
pub struct FakePaymentGateway {
    reject_above: Decimal,
    fail_capture: AtomicBool,
    sequence: AtomicU64,
    created_orders: Mutex<Vec<String>>,
    captured: Mutex<Vec<String>>,
}

impl Default for FakePaymentGateway {
    fn default() -> Self {
        Self::new(DEFAULT_REJECT_ABOVE)
    }
}

impl FakePaymentGateway {
    /// Rejects payments whose amount exceeds `reject_above`.
    #[must_use]
    pub const fn new(reject_above: Decimal) -> Self {
        Self {
            reject_above,
            fail_capture: AtomicBool::new(false),
            sequence: AtomicU64::new(0),
            created_orders: Mutex::new(Vec::new()),
            captured: Mutex::new(Vec::new()),
        }
    }

    /// Makes captures fail.
    pub fn fail_captures(&self) {
        self.fail_capture.store(true, Ordering::SeqCst);
    }

    /// Order hashes sent to `create_order`.
    #[must_use]
    pub fn created_orders(&self) -> Vec<String> {
        self.created_orders.lock().map(|v| v.clone()).unwrap_or_default()
    }

    /// Payment ids successfully captured.
    #[must_use]
    pub fn captured(&self) -> Vec<String> {
        self.captured.lock().map(|v| v.clone()).unwrap_or_default()
    }

    fn next(&self, prefix: &str) -> String {
        format!("{prefix}-{}", self.sequence.fetch_add(1, Ordering::SeqCst) + 1)
    }
}

impl PaymentGateway for FakePaymentGateway {
    fn create_order<'a>(&'a self, order: &'a Order) -> BoxFuture<'a, Result<RemoteResource, GatewayError>> {
        Box::pin(async move {
            if let Ok(mut created) = self.created_orders.lock() {
                created.push(order.hash_id.to_string());
            }
            Ok(RemoteResource {
                id: self.next("ORD"),
                status: "CREATED".into(),
            })
        })
    }

    fn create_payment<'a>(
        &'a self,
        order: &'a Order,
        _remote_order_id: &'a str,
        _delay_capture: bool,
    ) -> BoxFuture<'a, Result<RemoteResource, GatewayError>> {
        Box::pin(async move {
            if order.charge.amount_paid > self.reject_above {
                return Err(GatewayError::CreatePayment(format!(
                    "amount {} above limit",
                    order.charge.amount_paid
                )));
            }
            Ok(RemoteResource {
                id: self.next("PAY"),
                status: "IN_ANALYSIS".into(),
            })
        })
    }

    fn capture_payment<'a>(&'a self, remote_payment_id: &'a str) -> BoxFuture<'a, Result<RemoteResource, GatewayError>> {
        Box::pin(async move {
            if self.fail_capture.load(Ordering::SeqCst) {
                return Err(GatewayError::CapturePayment(format!("{remote_payment_id} not capturable")));
            }
            if let Ok(mut captured) = self.captured.lock() {
                captured.push(remote_payment_id.to_owned());
            }
            Ok(RemoteResource {
                id: remote_payment_id.to_owned(),
                status: "AUTHORIZED".into(),
            })
        })
    }
}
