//! Gateway-backed units of work.
//!
//! [`PaymentProcessUnitOfWork`] charges an order; [`CapturePaymentUnitOfWork`]
//! captures the authorized payment once the video is uploaded. Both talk to the
//! processor through [`PaymentGateway`] and keep storage behind
//! [`PaymentRecords`], so they work with any storage backend.

use std::sync::Arc;

use shoutout_core::ports::{
    AlertChannel, CaptureOutcome, CapturePayment, ErrorTracker, PaymentGateway, PaymentRecords,
    ProcessPayment, TransactionData,
};
use shoutout_core::{
    BoxFuture, ChargingShoutoutRequestError, GatewayError, Order, ShoutoutSuccessfullyRequestedEvent,
};

/// Creates the remote order and a delayed-capture payment for an order.
#[derive(Clone)]
pub struct PaymentProcessUnitOfWork {
    gateway: Arc<dyn PaymentGateway>,
    records: Arc<dyn PaymentRecords>,
    error_tracker: Arc<dyn ErrorTracker>,
}

impl PaymentProcessUnitOfWork {
    /// Wires the unit of work.
    #[must_use]
    pub fn new(
        gateway: Arc<dyn PaymentGateway>,
        records: Arc<dyn PaymentRecords>,
        error_tracker: Arc<dyn ErrorTracker>,
    ) -> Self {
        Self {
            gateway,
            records,
            error_tracker,
        }
    }

    async fn authorize(&self, order: &Order, order_id: i64) -> Result<(), ChargingShoutoutRequestError> {
        let remote_order = self.gateway.create_order(order).await?;
        let remote_payment = self.gateway.create_payment(order, &remote_order.id, true).await?;
        self.records
            .persist_transaction_data(order_id, &remote_order.id, &remote_payment.id)
            .await?;
        tracing::info!(
            order_hash = %order.hash_id,
            remote_order = %remote_order.id,
            remote_payment = %remote_payment.id,
            status = %remote_payment.status,
            "payment authorized"
        );
        Ok(())
    }

    async fn run(&self, order: &mut Order) -> Result<ShoutoutSuccessfullyRequestedEvent, ChargingShoutoutRequestError> {
        let order_id = order.id.ok_or(ChargingShoutoutRequestError::UnsavedOrder(order.hash_id))?;
        let outcome = self.authorize(order, order_id).await;

        match &outcome {
            Ok(()) => order.charge.set_processing_status(),
            Err(error) => {
                tracing::error!(order_hash = %order.hash_id, %error, "charging shoutout request failed");
                self.error_tracker.capture_error(error);
                order.charge.set_failed_status();
            }
        }
        metrics::counter!(
            "shoutout_charges_total",
            "outcome" => if outcome.is_ok() { "processing" } else { "failed" }
        )
        .increment(1);

        // The status write always happens, whatever the gateway said.
        if let Err(error) = self.records.persist_charge_status(order_id, order.charge.status).await {
            tracing::error!(order_hash = %order.hash_id, status = %order.charge.status, %error, "charge status not persisted");
            self.error_tracker.capture_error(&error);
        }

        outcome.map(|()| ShoutoutSuccessfullyRequestedEvent { order: order.clone() })
    }
}

impl ProcessPayment for PaymentProcessUnitOfWork {
    fn charge<'a>(
        &'a self,
        order: &'a mut Order,
    ) -> BoxFuture<'a, Result<ShoutoutSuccessfullyRequestedEvent, ChargingShoutoutRequestError>> {
        Box::pin(self.run(order))
    }
}

/// Captures an authorized payment, alerting operators on failure.
#[derive(Clone)]
pub struct CapturePaymentUnitOfWork {
    gateway: Arc<dyn PaymentGateway>,
    alerts: Arc<dyn AlertChannel>,
    error_tracker: Arc<dyn ErrorTracker>,
}

impl CapturePaymentUnitOfWork {
    /// Wires the unit of work.
    #[must_use]
    pub fn new(
        gateway: Arc<dyn PaymentGateway>,
        alerts: Arc<dyn AlertChannel>,
        error_tracker: Arc<dyn ErrorTracker>,
    ) -> Self {
        Self {
            gateway,
            alerts,
            error_tracker,
        }
    }

    async fn alert(&self, transaction: &TransactionData, error: &GatewayError) {
        let message = format!(
            "Falha ao capturar pagamento {} do pedido {}: {error}",
            transaction.wirecard_payment_hash, transaction.order_hash
        );
        if let Err(alert_error) = self.alerts.send_high_priority(&message).await {
            tracing::error!(%alert_error, "capture alert not delivered");
            self.error_tracker.capture_error(&alert_error);
        }
    }
}

impl CapturePayment for CapturePaymentUnitOfWork {
    fn capture<'a>(&'a self, transaction: &'a TransactionData) -> BoxFuture<'a, CaptureOutcome> {
        Box::pin(async move {
            match self.gateway.capture_payment(&transaction.wirecard_payment_hash).await {
                Ok(payment) => {
                    tracing::info!(
                        order_hash = %transaction.order_hash,
                        remote_payment = %payment.id,
                        status = %payment.status,
                        "payment captured"
                    );
                    metrics::counter!("shoutout_captures_total", "outcome" => "captured").increment(1);
                    CaptureOutcome::Captured
                }
                Err(error) => {
                    tracing::error!(order_hash = %transaction.order_hash, %error, "capture failed");
                    self.error_tracker.capture_error(&error);
                    self.alert(transaction, &error).await;
                    metrics::counter!("shoutout_captures_total", "outcome" => "alerted").increment(1);
                    CaptureOutcome::AlertRaised
                }
            }
        })
    }
}
