//! HTTP client for the payment processor.

use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Serialize;

use shoutout_core::ports::{PaymentGateway, RemoteResource};
use shoutout_core::{BoxFuture, GatewayError, Order};

use crate::config::WirecardConfig;
use crate::wire::{CreateOrderRequest, CreatePaymentRequest, ResourceResponse};

/// Payment statuses that mean the authorization did not go through.
const REJECTED_PAYMENT_STATUSES: [&str; 3] = ["CANCELLED", "REFUNDED", "REVERSED"];

/// Wirecard API client.
#[derive(Clone)]
pub struct WirecardClient {
    client: Client,
    config: WirecardConfig,
}

impl WirecardClient {
    /// Builds a client with the configured timeout.
    ///
    /// # Errors
    ///
    /// [`GatewayError::Transport`] if the TLS backend cannot be initialized.
    pub fn new(config: WirecardConfig) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| GatewayError::Transport(e.to_string()))?;
        Ok(Self { client, config })
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &WirecardConfig {
        &self.config
    }

    fn post(&self, url: String) -> RequestBuilder {
        self.client
            .post(url)
            .basic_auth(&self.config.token, Some(&self.config.api_key))
    }

    async fn send_json<B: Serialize + Sync>(
        &self,
        url: String,
        body: &B,
    ) -> Result<Response, GatewayError> {
        self.post(url).json(body).send().await.map_err(transport_error)
    }

    /// Creates the remote order.
    ///
    /// # Errors
    ///
    /// [`GatewayError::CreateOrder`] unless the processor answers `201` with
    /// status `CREATED`.
    pub async fn create_order(&self, order: &Order) -> Result<RemoteResource, GatewayError> {
        let body = CreateOrderRequest::from_order(order)?;
        let response = self.send_json(self.config.orders_url(), &body).await?;
        let resource = expect_resource(response, StatusCode::CREATED, GatewayError::CreateOrder).await?;
        if resource.status != "CREATED" {
            return Err(GatewayError::CreateOrder(format!(
                "unexpected order status {}",
                resource.status
            )));
        }
        tracing::debug!(order_hash = %order.hash_id, remote_order = %resource.id, "remote order created");
        Ok(resource)
    }

    /// Authorizes a credit card payment for a remote order.
    ///
    /// # Errors
    ///
    /// [`GatewayError::CreatePayment`] unless the processor answers `201` with
    /// a status other than `CANCELLED`, `REFUNDED` or `REVERSED`.
    pub async fn create_payment(
        &self,
        order: &Order,
        remote_order_id: &str,
        delay_capture: bool,
    ) -> Result<RemoteResource, GatewayError> {
        let body = CreatePaymentRequest::from_order(order, &self.config.statement_descriptor, delay_capture);
        let response = self
            .send_json(self.config.payments_url(remote_order_id), &body)
            .await?;
        let resource = expect_resource(response, StatusCode::CREATED, GatewayError::CreatePayment).await?;
        if REJECTED_PAYMENT_STATUSES.contains(&resource.status.as_str()) {
            return Err(GatewayError::CreatePayment(format!(
                "payment {} returned status {}",
                resource.id, resource.status
            )));
        }
        Ok(resource)
    }

    /// Captures a delayed payment.
    ///
    /// # Errors
    ///
    /// [`GatewayError::CapturePayment`] unless the processor answers `200`.
    pub async fn capture_payment(&self, remote_payment_id: &str) -> Result<RemoteResource, GatewayError> {
        let response = self
            .post(self.config.capture_url(remote_payment_id))
            .send()
            .await
            .map_err(transport_error)?;
        expect_resource(response, StatusCode::OK, GatewayError::CapturePayment).await
    }
}

fn transport_error(error: reqwest::Error) -> GatewayError {
    if error.is_timeout() {
        GatewayError::Timeout
    } else {
        GatewayError::Transport(error.to_string())
    }
}

async fn expect_resource(
    response: Response,
    expected: StatusCode,
    rejected: fn(String) -> GatewayError,
) -> Result<RemoteResource, GatewayError> {
    let status = response.status();
    if status != expected {
        let body = response.text().await.unwrap_or_default();
        return Err(rejected(format!("{} - {body}", status.as_u16())));
    }
    let body = response
        .json::<ResourceResponse>()
        .await
        .map_err(transport_error)?;
    Ok(RemoteResource {
        id: body.id,
        status: body.status,
    })
}

impl PaymentGateway for WirecardClient {
    fn create_order<'a>(&'a self, order: &'a Order) -> BoxFuture<'a, Result<RemoteResource, GatewayError>> {
        Box::pin(Self::create_order(self, order))
    }

    fn create_payment<'a>(
        &'a self,
        order: &'a Order,
        remote_order_id: &'a str,
        delay_capture: bool,
    ) -> BoxFuture<'a, Result<RemoteResource, GatewayError>> {
        Box::pin(Self::create_payment(self, order, remote_order_id, delay_capture))
    }

    fn capture_payment<'a>(&'a self, remote_payment_id: &'a str) -> BoxFuture<'a, Result<RemoteResource, GatewayError>> {
        Box::pin(Self::capture_payment(self, remote_payment_id))
    }
}
