//! Read-side ports.

use shoutout_core::ports::{
    OrderViews, ProfitPercentageViews, ShoutoutVideos, TalentViews, TransactionData,
};
use shoutout_core::{
    AgencyProfitPercentage, BoxFuture, Order, OrderLookup, Shoutout, StorageError, Talent,
    TalentProfitPercentage, ViewError,
};
use rust_decimal::Decimal;
use sqlx::Row;
use uuid::Uuid;

use crate::{PostgresStore, rows, storage_error};

fn view_error(error: sqlx::Error) -> ViewError {
    ViewError::Storage(storage_error(error))
}

impl PostgresStore {
    async fn fetch_order(&self, lookup: OrderLookup) -> Result<Order, ViewError> {
        let by_id = format!("{} WHERE o.id = $1", rows::ORDER_SELECT);
        let by_hash = format!("{} WHERE o.hash_id = $1", rows::ORDER_SELECT);
        let query = match lookup {
            OrderLookup::Id(id) => sqlx::query(&by_id).bind(id),
            OrderLookup::Hash(hash) => sqlx::query(&by_hash).bind(hash),
        };
        let row = query
            .fetch_optional(self.pool())
            .await
            .map_err(view_error)?
            .ok_or_else(|| ViewError::not_found("order", lookup))?;
        Ok(rows::order(&row)?)
    }

    async fn fetch_transaction_data(&self, order_hash: Uuid) -> Result<TransactionData, ViewError> {
        let row = sqlx::query(
            r"
            SELECT t.order_id, o.hash_id AS order_hash, t.wirecard_order_hash,
                   t.wirecard_payment_hash, t.payment_event_last_timestamp
            FROM wirecard_transactions t
            JOIN orders o ON o.id = t.order_id
            WHERE o.hash_id = $1
            ",
        )
        .bind(order_hash)
        .fetch_optional(self.pool())
        .await
        .map_err(view_error)?
        .ok_or_else(|| ViewError::not_found("transaction data", order_hash))?;
        rows::transaction(&row).map_err(view_error)
    }

    async fn fetch_talent(&self, talent_id: i64) -> Result<Talent, ViewError> {
        let row = sqlx::query("SELECT id, agency_id, profile_url, full_name, email FROM talents WHERE id = $1")
            .bind(talent_id)
            .fetch_optional(self.pool())
            .await
            .map_err(view_error)?
            .ok_or_else(|| ViewError::not_found("talent", talent_id))?;
        rows::talent(&row).map_err(view_error)
    }

    async fn fetch_percentage(&self, sql: &str, key: Option<i64>) -> Result<Option<Decimal>, ViewError> {
        let mut query = sqlx::query(sql);
        if let Some(key) = key {
            query = query.bind(key);
        }
        let row = query.fetch_optional(self.pool()).await.map_err(view_error)?;
        row.map(|row| row.try_get::<Decimal, _>("value"))
            .transpose()
            .map_err(view_error)
    }

    async fn fetch_shoutout(&self, shoutout_hash: Uuid) -> Result<Shoutout, ViewError> {
        let row = sqlx::query("SELECT hash_id, order_id, talent_id, video_file FROM shoutouts WHERE hash_id = $1")
            .bind(shoutout_hash)
            .fetch_optional(self.pool())
            .await
            .map_err(view_error)?
            .ok_or_else(|| ViewError::not_found("shoutout", shoutout_hash))?;
        rows::shoutout(&row).map_err(view_error)
    }
}

impl OrderViews for PostgresStore {
    fn view_order(&self, lookup: OrderLookup) -> BoxFuture<'_, Result<Order, ViewError>> {
        Box::pin(self.fetch_order(lookup))
    }

    fn view_transaction_data(&self, order_hash: Uuid) -> BoxFuture<'_, Result<TransactionData, ViewError>> {
        Box::pin(self.fetch_transaction_data(order_hash))
    }
}

impl TalentViews for PostgresStore {
    fn view_talent(&self, talent_id: i64) -> BoxFuture<'_, Result<Talent, ViewError>> {
        Box::pin(self.fetch_talent(talent_id))
    }
}

impl ProfitPercentageViews for PostgresStore {
    fn view_customized_talent_profit_percentage(
        &self,
        talent_id: i64,
    ) -> BoxFuture<'_, Result<Option<TalentProfitPercentage>, ViewError>> {
        Box::pin(async move {
            let value = self
                .fetch_percentage(
                    "SELECT value FROM custom_talent_profit_percentages WHERE talent_id = $1",
                    Some(talent_id),
                )
                .await?;
            Ok(value.map(|value| TalentProfitPercentage {
                talent_id: Some(talent_id),
                value,
            }))
        })
    }

    fn view_default_talent_profit_percentage(&self) -> BoxFuture<'_, Result<TalentProfitPercentage, ViewError>> {
        Box::pin(async move {
            self.fetch_percentage("SELECT value FROM default_talent_profit_percentages", None)
                .await?
                .map(|value| TalentProfitPercentage { talent_id: None, value })
                .ok_or_else(|| ViewError::not_found("default talent profit percentage", "-"))
        })
    }

    fn view_agency_profit_percentage(
        &self,
        agency_id: i64,
    ) -> BoxFuture<'_, Result<AgencyProfitPercentage, ViewError>> {
        Box::pin(async move {
            self.fetch_percentage(
                "SELECT value FROM agency_profit_percentages WHERE agency_id = $1",
                Some(agency_id),
            )
            .await?
            .map(|value| AgencyProfitPercentage { agency_id, value })
            .ok_or_else(|| ViewError::not_found("agency profit percentage", agency_id))
        })
    }
}

impl ShoutoutVideos for PostgresStore {
    fn view_shoutout(&self, shoutout_hash: Uuid) -> BoxFuture<'_, Result<Shoutout, ViewError>> {
        Box::pin(self.fetch_shoutout(shoutout_hash))
    }

    fn replace_video_file<'a>(
        &'a self,
        shoutout_hash: Uuid,
        video_file: &'a str,
    ) -> BoxFuture<'a, Result<(), StorageError>> {
        Box::pin(async move {
            let result = sqlx::query("UPDATE shoutouts SET video_file = $1 WHERE hash_id = $2")
                .bind(video_file)
                .bind(shoutout_hash)
                .execute(self.pool())
                .await
                .map_err(storage_error)?;
            if result.rows_affected() == 0 {
                return Err(StorageError(format!("shoutout {shoutout_hash} not found")));
            }
            Ok(())
        })
    }
}
