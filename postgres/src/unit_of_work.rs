//! Transactional units of work.

use shoutout_core::ports::{
    FulfillShoutoutRequestUnitOfWork, PersistRequestShoutoutUnitOfWork, UnitOfWorkFactory,
};
use shoutout_core::{
    AgencyProfit, BoxFuture, Buyer, Charge, CreditCard, Order, PersistingShoutoutRequestError,
    PersistingShoutoutVideoError, Shoutout, TalentProfit,
};
use sqlx::{PgConnection, PgPool};

use crate::PostgresStore;

fn record_commit(unit: &'static str, ok: bool) {
    metrics::counter!(
        "shoutout_unit_of_work_commits_total",
        "unit" => unit,
        "outcome" => if ok { "committed" } else { "rolled_back" }
    )
    .increment(1);
}

/// Writes an order, its charge, card and buyer in one transaction.
#[derive(Debug)]
pub struct PostgresPersistRequestShoutout {
    pool: PgPool,
    order: Option<Order>,
    charge: Option<Charge>,
    credit_card: Option<CreditCard>,
    buyer: Option<Buyer>,
}

impl PostgresPersistRequestShoutout {
    /// Empty unit of work on `pool`.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self {
            pool,
            order: None,
            charge: None,
            credit_card: None,
            buyer: None,
        }
    }

    async fn write(&self) -> Result<i64, PersistingShoutoutRequestError> {
        let order = self.order.as_ref().ok_or(PersistingShoutoutRequestError::Incomplete("order"))?;
        let charge = self.charge.as_ref().ok_or(PersistingShoutoutRequestError::Incomplete("charge"))?;
        let card = self
            .credit_card
            .as_ref()
            .ok_or(PersistingShoutoutRequestError::Incomplete("credit card"))?;
        let buyer = self.buyer.as_ref().ok_or(PersistingShoutoutRequestError::Incomplete("buyer"))?;

        let storage = |e: sqlx::Error| PersistingShoutoutRequestError::Storage(e.to_string());
        let mut tx = self.pool.begin().await.map_err(storage)?;
        let order_id = insert_order(&mut tx, order).await.map_err(storage)?;
        let charge_id = insert_charge(&mut tx, order_id, charge).await.map_err(storage)?;
        insert_credit_card(&mut tx, charge_id, card).await.map_err(storage)?;
        insert_buyer(&mut tx, charge_id, buyer).await.map_err(storage)?;
        tx.commit().await.map_err(storage)?;
        Ok(order_id)
    }
}

async fn insert_order(conn: &mut PgConnection, order: &Order) -> Result<i64, sqlx::Error> {
    let (id,): (i64,) = sqlx::query_as(
        r"
        INSERT INTO orders (
            hash_id, talent_id, video_is_for, is_from, is_to, instruction,
            email, is_public, created_at, expiration_datetime
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        RETURNING id
        ",
    )
    .bind(order.hash_id)
    .bind(order.talent_id)
    .bind(order.video_is_for.as_str())
    .bind(order.raw_is_from().unwrap_or_default())
    .bind(&order.is_to)
    .bind(&order.instruction)
    .bind(&order.email)
    .bind(order.is_public)
    .bind(order.created_at)
    .bind(order.expiration_datetime)
    .fetch_one(&mut *conn)
    .await?;
    Ok(id)
}

async fn insert_charge(conn: &mut PgConnection, order_id: i64, charge: &Charge) -> Result<i64, sqlx::Error> {
    let (id,): (i64,) = sqlx::query_as(
        r"
        INSERT INTO charges (order_id, amount_paid, payment_date, payment_method, status)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id
        ",
    )
    .bind(order_id)
    .bind(charge.amount_paid)
    .bind(charge.payment_date)
    .bind(charge.payment_method.as_str())
    .bind(charge.status.as_str())
    .fetch_one(&mut *conn)
    .await?;
    Ok(id)
}

async fn insert_credit_card(conn: &mut PgConnection, charge_id: i64, card: &CreditCard) -> Result<(), sqlx::Error> {
    sqlx::query(
        r"
        INSERT INTO credit_cards (
            charge_id, fullname, birthdate, tax_document, phone_number, area_code, credit_card_hash
        ) VALUES ($1, $2, $3, $4, $5, $6, $7)
        ",
    )
    .bind(charge_id)
    .bind(&card.holder.fullname)
    .bind(card.holder.birthdate)
    .bind(&card.holder.tax_document)
    .bind(&card.holder.phone_number)
    .bind(&card.holder.area_code)
    .bind(&card.credit_card_hash)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

async fn insert_buyer(conn: &mut PgConnection, charge_id: i64, buyer: &Buyer) -> Result<(), sqlx::Error> {
    sqlx::query(
        r"
        INSERT INTO buyers (charge_id, fullname, birthdate, tax_document, phone_number, area_code)
        VALUES ($1, $2, $3, $4, $5, $6)
        ",
    )
    .bind(charge_id)
    .bind(&buyer.fullname)
    .bind(buyer.birthdate)
    .bind(&buyer.tax_document)
    .bind(&buyer.phone_number)
    .bind(&buyer.area_code)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

impl PersistRequestShoutoutUnitOfWork for PostgresPersistRequestShoutout {
    fn order_repository_add(&mut self, order: Order) {
        self.order = Some(order);
    }

    fn charge_repository_add(&mut self, charge: Charge) {
        self.charge = Some(charge);
    }

    fn credit_card_repository_add(&mut self, credit_card: CreditCard) {
        self.credit_card = Some(credit_card);
    }

    fn buyer_repository_add(&mut self, buyer: Buyer) {
        self.buyer = Some(buyer);
    }

    fn commit(&mut self) -> BoxFuture<'_, Result<(), PersistingShoutoutRequestError>> {
        Box::pin(async move {
            let result = self.write().await;
            record_commit("persist_request_shoutout", result.is_ok());
            let order_id = result?;
            tracing::debug!(order_id, "shoutout request persisted");
            Ok(())
        })
    }
}

/// Writes the shoutout and profit records in one transaction.
#[derive(Debug)]
pub struct PostgresFulfillShoutoutRequest {
    pool: PgPool,
    shoutout: Option<Shoutout>,
    talent_profit: Option<TalentProfit>,
    agency_profit: Option<AgencyProfit>,
}

impl PostgresFulfillShoutoutRequest {
    /// Empty unit of work on `pool`.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self {
            pool,
            shoutout: None,
            talent_profit: None,
            agency_profit: None,
        }
    }

    async fn write(&self) -> Result<(), PersistingShoutoutVideoError> {
        let shoutout = self
            .shoutout
            .as_ref()
            .ok_or(PersistingShoutoutVideoError::Incomplete("shoutout"))?;
        let talent_profit = self
            .talent_profit
            .as_ref()
            .ok_or(PersistingShoutoutVideoError::Incomplete("talent profit"))?;

        let storage = |e: sqlx::Error| PersistingShoutoutVideoError::Storage(e.to_string());
        let mut tx = self.pool.begin().await.map_err(storage)?;

        sqlx::query("INSERT INTO shoutouts (hash_id, order_id, talent_id, video_file) VALUES ($1, $2, $3, $4)")
            .bind(shoutout.hash_id)
            .bind(shoutout.order_id)
            .bind(shoutout.talent_id)
            .bind(&shoutout.video_file)
            .execute(&mut *tx)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(db) if db.is_unique_violation() && db.constraint() == Some("shoutouts_order_id_key") => {
                    PersistingShoutoutVideoError::OrderAlreadyFulfilled {
                        order_id: shoutout.order_id,
                    }
                }
                other => storage(other),
            })?;

        insert_profit(
            &mut tx,
            "talent_profits",
            "talent_id",
            talent_profit.talent_id,
            Profit::from(talent_profit),
        )
        .await
        .map_err(storage)?;

        if let Some(agency_profit) = &self.agency_profit {
            insert_profit(
                &mut tx,
                "agency_profits",
                "agency_id",
                agency_profit.agency_id,
                Profit::from(agency_profit),
            )
            .await
            .map_err(storage)?;
        }

        tx.commit().await.map_err(storage)
    }
}

struct Profit {
    order_id: i64,
    shoutout_price: rust_decimal::Decimal,
    profit_percentage: rust_decimal::Decimal,
    profit: rust_decimal::Decimal,
    paid: bool,
}

impl From<&TalentProfit> for Profit {
    fn from(p: &TalentProfit) -> Self {
        Self {
            order_id: p.order_id,
            shoutout_price: p.shoutout_price,
            profit_percentage: p.profit_percentage,
            profit: p.profit,
            paid: p.paid,
        }
    }
}

impl From<&AgencyProfit> for Profit {
    fn from(p: &AgencyProfit) -> Self {
        Self {
            order_id: p.order_id,
            shoutout_price: p.shoutout_price,
            profit_percentage: p.profit_percentage,
            profit: p.profit,
            paid: p.paid,
        }
    }
}

async fn insert_profit(
    conn: &mut PgConnection,
    table: &'static str,
    payee_column: &'static str,
    payee_id: i64,
    profit: Profit,
) -> Result<(), sqlx::Error> {
    let sql = format!(
        "INSERT INTO {table} ({payee_column}, order_id, shoutout_price, profit_percentage, profit, paid) \
         VALUES ($1, $2, $3, $4, $5, $6)"
    );
    sqlx::query(&sql)
        .bind(payee_id)
        .bind(profit.order_id)
        .bind(profit.shoutout_price)
        .bind(profit.profit_percentage)
        .bind(profit.profit)
        .bind(profit.paid)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

impl FulfillShoutoutRequestUnitOfWork for PostgresFulfillShoutoutRequest {
    fn shoutout_repository_add(&mut self, shoutout: Shoutout) {
        self.shoutout = Some(shoutout);
    }

    fn talent_profit_repository_add(&mut self, profit: TalentProfit) {
        self.talent_profit = Some(profit);
    }

    fn agency_profit_repository_add(&mut self, profit: AgencyProfit) {
        self.agency_profit = Some(profit);
    }

    fn commit(&mut self) -> BoxFuture<'_, Result<(), PersistingShoutoutVideoError>> {
        Box::pin(async move {
            let result = self.write().await;
            record_commit("fulfill_shoutout_request", result.is_ok());
            result
        })
    }
}

impl UnitOfWorkFactory for PostgresStore {
    fn persist_request_shoutout(&self) -> Box<dyn PersistRequestShoutoutUnitOfWork> {
        Box::new(PostgresPersistRequestShoutout::new(self.pool().clone()))
    }

    fn fulfill_shoutout_request(&self) -> Box<dyn FulfillShoutoutRequestUnitOfWork> {
        Box::new(PostgresFulfillShoutoutRequest::new(self.pool().clone()))
    }
}
