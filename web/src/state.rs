//! Shared handler state.

use std::sync::Arc;

use shoutout_core::BoxFuture;
use shoutout_postgres::PostgresStore;
use shoutout_runtime::ShoutoutEnvironment;
use shoutout_wirecard::PaymentStatusReconciler;

/// Dependency probed by the readiness endpoint.
pub trait Readiness: Send + Sync {
    /// Whether the dependency answers.
    fn is_ready(&self) -> BoxFuture<'_, bool>;
}

impl Readiness for PostgresStore {
    fn is_ready(&self) -> BoxFuture<'_, bool> {
        Box::pin(async move {
            match self.ping().await {
                Ok(()) => true,
                Err(error) => {
                    tracing::warn!(%error, "database not ready");
                    false
                }
            }
        })
    }
}

/// Fixed answer, for tests and storage-less setups.
#[derive(Debug, Clone, Copy)]
pub struct StaticReadiness(pub bool);

impl Readiness for StaticReadiness {
    fn is_ready(&self) -> BoxFuture<'_, bool> {
        Box::pin(std::future::ready(self.0))
    }
}

/// State shared by every handler.
///
/// Holds only process-wide collaborators; buses are built per request from
/// [`ShoutoutEnvironment`].
#[derive(Clone)]
pub struct AppState {
    /// Saga collaborators
    pub env: ShoutoutEnvironment,
    /// Webhook reconciliation
    pub reconciler: Arc<PaymentStatusReconciler>,
    /// Expected webhook `Authorization` header
    pub webhook_token: Arc<str>,
    /// Readiness probe target
    pub readiness: Arc<dyn Readiness>,
}

impl AppState {
    /// State whose reconciler writes through the environment's payment records.
    #[must_use]
    pub fn new(env: ShoutoutEnvironment, webhook_token: impl Into<Arc<str>>, readiness: Arc<dyn Readiness>) -> Self {
        let reconciler = PaymentStatusReconciler::new(Arc::clone(&env.payment_records), Arc::clone(&env.error_tracker));
        Self {
            env,
            reconciler: Arc::new(reconciler),
            webhook_token: webhook_token.into(),
            readiness,
        }
    }
}
