//! Processor transaction records and charge status.

use chrono::{DateTime, Utc};
use shoutout_core::ports::{
    NotificationOutcome, PaymentRecords, PaymentStatusUpdate, is_stale_notification,
};
use shoutout_core::{BoxFuture, ChargeStatus, StorageError};
use sqlx::PgConnection;

use crate::{PostgresStore, storage_error};

async fn update_charge_status(
    conn: &mut PgConnection,
    order_id: i64,
    status: ChargeStatus,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("UPDATE charges SET status = $1 WHERE order_id = $2")
        .bind(status.as_str())
        .bind(order_id)
        .execute(&mut *conn)
        .await?;
    Ok(result.rows_affected())
}

impl PostgresStore {
    async fn apply_notification(&self, update: &PaymentStatusUpdate) -> Result<NotificationOutcome, sqlx::Error> {
        let mut tx = self.pool().begin().await?;

        let row: Option<(i64, Option<DateTime<Utc>>)> = sqlx::query_as(
            r"
            SELECT order_id, payment_event_last_timestamp
            FROM wirecard_transactions
            WHERE wirecard_payment_hash = $1
            FOR UPDATE
            ",
        )
        .bind(&update.wirecard_payment_hash)
        .fetch_optional(&mut *tx)
        .await?;

        let Some((order_id, last_applied)) = row else {
            return Ok(NotificationOutcome::UnknownPayment);
        };
        if is_stale_notification(update.event_at, last_applied) {
            return Ok(NotificationOutcome::Stale);
        }

        update_charge_status(&mut tx, order_id, update.status).await?;
        sqlx::query(
            "UPDATE wirecard_transactions SET payment_event_last_timestamp = $1 WHERE wirecard_payment_hash = $2",
        )
        .bind(update.event_at)
        .bind(&update.wirecard_payment_hash)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(NotificationOutcome::Applied)
    }
}

impl PaymentRecords for PostgresStore {
    fn persist_transaction_data<'a>(
        &'a self,
        order_id: i64,
        wirecard_order_hash: &'a str,
        wirecard_payment_hash: &'a str,
    ) -> BoxFuture<'a, Result<(), StorageError>> {
        Box::pin(async move {
            sqlx::query(
                r"
                INSERT INTO wirecard_transactions (order_id, wirecard_order_hash, wirecard_payment_hash)
                VALUES ($1, $2, $3)
                ",
            )
            .bind(order_id)
            .bind(wirecard_order_hash)
            .bind(wirecard_payment_hash)
            .execute(self.pool())
            .await
            .map(|_| ())
            .map_err(storage_error)
        })
    }

    fn persist_charge_status(&self, order_id: i64, status: ChargeStatus) -> BoxFuture<'_, Result<(), StorageError>> {
        Box::pin(async move {
            let mut conn = self.pool().acquire().await.map_err(storage_error)?;
            let updated = update_charge_status(&mut conn, order_id, status)
                .await
                .map_err(storage_error)?;
            if updated == 0 {
                return Err(StorageError(format!("charge of order {order_id} not found")));
            }
            Ok(())
        })
    }

    fn apply_payment_notification<'a>(
        &'a self,
        update: &'a PaymentStatusUpdate,
    ) -> BoxFuture<'a, Result<NotificationOutcome, StorageError>> {
        Box::pin(async move { self.apply_notification(update).await.map_err(storage_error) })
    }
}
