//! `PostgreSQL` storage for the shoutout saga.
//!
//! [`PostgresStore`] implements every storage port from `shoutout-core`:
//!
//! - Order, talent, profit-percentage and shoutout views
//! - The request and fulfillment units of work, each committing in a single
//!   transaction
//! - Payment records, including the row-locked webhook compare-and-update
//!
//! # Example
//!
//! ```no_run
//! use shoutout_postgres::PostgresStore;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = PostgresStore::connect("postgres://localhost/shoutouts", 10).await?;
//! store.migrate().await?;
//! # Ok(())
//! # }
//! ```

mod payments;
mod rows;
pub mod schema;
mod unit_of_work;
mod views;

pub use unit_of_work::{PostgresFulfillShoutoutRequest, PostgresPersistRequestShoutout};

use shoutout_core::StorageError;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

/// Connection pool plus the storage port implementations.
#[derive(Clone, Debug)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Opens a pool.
    ///
    /// # Errors
    ///
    /// [`StorageError`] if the database cannot be reached.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, StorageError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .map_err(storage_error)?;
        tracing::info!(max_connections, "connected to postgres");
        Ok(Self { pool })
    }

    /// Wraps an existing pool.
    #[must_use]
    pub const fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Underlying pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Creates missing tables.
    ///
    /// # Errors
    ///
    /// [`StorageError`] if a statement fails.
    pub async fn migrate(&self) -> Result<(), StorageError> {
        schema::run_migrations(&self.pool).await.map_err(storage_error)
    }

    /// Round-trip used by the readiness probe.
    ///
    /// # Errors
    ///
    /// [`StorageError`] if the database does not answer.
    pub async fn ping(&self) -> Result<(), StorageError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map(|_| ())
            .map_err(storage_error)
    }
}

pub(crate) fn storage_error(error: sqlx::Error) -> StorageError {
    StorageError(error.to_string())
}
