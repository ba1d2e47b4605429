//! In-memory implementation of every storage port.
//!
//! Commits run against a copy of the tables and are swapped in only when every
//! write succeeded, so a failure injected at any step leaves nothing behind.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use shoutout_core::ports::{
    FulfillShoutoutRequestUnitOfWork, NotificationOutcome, OrderViews, PaymentRecords,
    PaymentStatusUpdate, PersistRequestShoutoutUnitOfWork, ProfitPercentageViews, ShoutoutVideos,
    TalentViews, TransactionData, UnitOfWorkFactory, is_stale_notification,
};
use shoutout_core::{
    AgencyProfit, AgencyProfitPercentage, BoxFuture, Buyer, Charge, ChargeStatus, CreditCard, Order,
    OrderLookup, PersistingShoutoutRequestError, PersistingShoutoutVideoError, Shoutout, StorageError,
    Talent, TalentProfit, TalentProfitPercentage, ViewError,
};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};
use uuid::Uuid;

/// Write step that can be made to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePoint {
    /// Inserting an order.
    OrderInsert,
    /// Inserting a charge.
    ChargeInsert,
    /// Inserting a credit card.
    CreditCardInsert,
    /// Inserting a buyer.
    BuyerInsert,
    /// Inserting a shoutout.
    ShoutoutInsert,
    /// Inserting a talent profit.
    TalentProfitInsert,
    /// Inserting an agency profit.
    AgencyProfitInsert,
    /// Saving processor transaction ids.
    TransactionInsert,
    /// Updating a charge status.
    ChargeStatusUpdate,
}

#[derive(Debug, Clone, Default)]
struct Tables {
    next_id: i64,
    orders: BTreeMap<i64, Order>,
    charges: BTreeMap<i64, Charge>,
    credit_cards: Vec<CreditCard>,
    buyers: Vec<Buyer>,
    shoutouts: Vec<Shoutout>,
    talent_profits: Vec<TalentProfit>,
    agency_profits: Vec<AgencyProfit>,
    transactions: Vec<TransactionData>,
    talents: HashMap<i64, Talent>,
    default_percentage: Option<Decimal>,
    custom_percentages: HashMap<i64, Decimal>,
    agency_percentages: HashMap<i64, Decimal>,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn find_order(&self, lookup: OrderLookup) -> Option<&Order> {
        match lookup {
            OrderLookup::Id(id) => self.orders.get(&id),
            OrderLookup::Hash(hash) => self.orders.values().find(|order| order.hash_id == hash),
        }
    }

    fn assemble(&self, order: &Order) -> Option<Order> {
        let order_id = order.id?;
        let (charge_id, charge) = self.charges.iter().find(|(_, c)| c.order_id == Some(order_id))?;
        let mut charge = charge.clone();
        charge.id = Some(*charge_id);
        if let Some(card) = self.credit_cards.iter().find(|c| c.charge_id == Some(*charge_id)) {
            charge.funding_instrument = card.clone();
        }
        if let Some(buyer) = self.buyers.iter().find(|b| b.charge_id == Some(*charge_id)) {
            charge.buyer = buyer.clone();
        }
        let shoutout = self.shoutouts.iter().find(|s| s.order_id == order_id).cloned();
        Some(Order::restore(
            order_id,
            order.details(),
            charge,
            shoutout,
            order.created_at,
            order.expiration_datetime,
        ))
    }

    fn charge_mut(&mut self, order_id: i64) -> Option<&mut Charge> {
        self.charges.values_mut().find(|c| c.order_id == Some(order_id))
    }
}

#[derive(Debug, Default)]
struct Inner {
    tables: Tables,
    failure: Option<FailurePoint>,
}

impl Inner {
    fn check(&self, point: FailurePoint) -> Result<(), String> {
        if self.failure == Some(point) {
            Err(format!("injected failure at {point:?}"))
        } else {
            Ok(())
        }
    }
}

/// Shared in-memory database.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    inner: Arc<Mutex<Inner>>,
}

impl InMemoryStore {
    /// Empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>, StorageError> {
        self.inner
            .lock()
            .map_err(|e| StorageError(format!("lock poisoned: {e}")))
    }

    fn read<T>(&self, f: impl FnOnce(&Tables) -> T) -> Option<T> {
        self.inner.lock().ok().map(|inner| f(&inner.tables))
    }

    fn write(&self, f: impl FnOnce(&mut Inner)) {
        if let Ok(mut inner) = self.inner.lock() {
            f(&mut inner);
        }
    }

    /// Makes every subsequent write at `point` fail.
    pub fn fail_on(&self, point: FailurePoint) {
        self.write(|inner| inner.failure = Some(point));
    }

    /// Removes any injected failure.
    pub fn clear_failure(&self) {
        self.write(|inner| inner.failure = None);
    }

    /// Adds a talent.
    pub fn add_talent(&self, talent: Talent) {
        self.write(|inner| {
            inner.tables.talents.insert(talent.id, talent);
        });
    }

    /// Sets the platform default talent percentage.
    pub fn set_default_talent_profit_percentage(&self, value: Decimal) {
        self.write(|inner| inner.tables.default_percentage = Some(value));
    }

    /// Sets a talent-specific percentage.
    pub fn set_custom_talent_profit_percentage(&self, talent_id: i64, value: Decimal) {
        self.write(|inner| {
            inner.tables.custom_percentages.insert(talent_id, value);
        });
    }

    /// Sets an agency percentage.
    pub fn set_agency_profit_percentage(&self, agency_id: i64, value: Decimal) {
        self.write(|inner| {
            inner.tables.agency_percentages.insert(agency_id, value);
        });
    }

    /// Overrides the last applied webhook time of a payment.
    pub fn set_payment_event_last_timestamp(&self, wirecard_payment_hash: &str, at: DateTime<Utc>) {
        self.write(|inner| {
            if let Some(tx) = inner
                .tables
                .transactions
                .iter_mut()
                .find(|tx| tx.wirecard_payment_hash == wirecard_payment_hash)
            {
                tx.payment_event_last_timestamp = Some(at);
            }
        });
    }

    /// Inserts an order aggregate directly, bypassing the unit of work.
    pub fn seed_order(&self, mut order: Order) -> Order {
        self.write(|inner| {
            let tables = &mut inner.tables;
            let order_id = tables.next_id();
            let charge_id = tables.next_id();
            order.id = Some(order_id);
            order.charge.id = Some(charge_id);
            order.charge.order_id = Some(order_id);
            order.charge.funding_instrument.charge_id = Some(charge_id);
            order.charge.buyer.charge_id = Some(charge_id);
            tables.credit_cards.push(order.charge.funding_instrument.clone());
            tables.buyers.push(order.charge.buyer.clone());
            tables.charges.insert(charge_id, order.charge.clone());
            if let Some(shoutout) = &order.shoutout {
                tables.shoutouts.push(Shoutout {
                    order_id,
                    ..shoutout.clone()
                });
            }
            tables.orders.insert(order_id, order.clone());
        });
        order
    }

    /// Rows in the order table.
    #[must_use]
    pub fn order_count(&self) -> usize {
        self.read(|t| t.orders.len()).unwrap_or_default()
    }

    /// Rows in the charge table.
    #[must_use]
    pub fn charge_count(&self) -> usize {
        self.read(|t| t.charges.len()).unwrap_or_default()
    }

    /// Rows in the credit card table.
    #[must_use]
    pub fn credit_card_count(&self) -> usize {
        self.read(|t| t.credit_cards.len()).unwrap_or_default()
    }

    /// Rows in the buyer table.
    #[must_use]
    pub fn buyer_count(&self) -> usize {
        self.read(|t| t.buyers.len()).unwrap_or_default()
    }

    /// All shoutouts.
    #[must_use]
    pub fn shoutouts(&self) -> Vec<Shoutout> {
        self.read(|t| t.shoutouts.clone()).unwrap_or_default()
    }

    /// All talent profits.
    #[must_use]
    pub fn talent_profits(&self) -> Vec<TalentProfit> {
        self.read(|t| t.talent_profits.clone()).unwrap_or_default()
    }

    /// All agency profits.
    #[must_use]
    pub fn agency_profits(&self) -> Vec<AgencyProfit> {
        self.read(|t| t.agency_profits.clone()).unwrap_or_default()
    }

    /// Current charge status of an order.
    #[must_use]
    pub fn charge_status(&self, order_hash: Uuid) -> Option<ChargeStatus> {
        self.read(|t| {
            let order_id = t.find_order(OrderLookup::Hash(order_hash))?.id?;
            t.charges
                .values()
                .find(|c| c.order_id == Some(order_id))
                .map(|c| c.status)
        })
        .flatten()
    }

    /// Transaction record of an order.
    #[must_use]
    pub fn transaction(&self, order_hash: Uuid) -> Option<TransactionData> {
        self.read(|t| t.transactions.iter().find(|tx| tx.order_hash == order_hash).cloned())
            .flatten()
    }
}

// ---------------------------------------------------------------------------
// Views
// ---------------------------------------------------------------------------

impl OrderViews for InMemoryStore {
    fn view_order(&self, lookup: OrderLookup) -> BoxFuture<'_, Result<Order, ViewError>> {
        Box::pin(async move {
            let inner = self.lock()?;
            inner
                .tables
                .find_order(lookup)
                .and_then(|order| inner.tables.assemble(order))
                .ok_or_else(|| ViewError::not_found("order", lookup))
        })
    }

    fn view_transaction_data(&self, order_hash: Uuid) -> BoxFuture<'_, Result<TransactionData, ViewError>> {
        Box::pin(async move {
            let inner = self.lock()?;
            inner
                .tables
                .transactions
                .iter()
                .find(|tx| tx.order_hash == order_hash)
                .cloned()
                .ok_or_else(|| ViewError::not_found("transaction data", order_hash))
        })
    }
}

impl TalentViews for InMemoryStore {
    fn view_talent(&self, talent_id: i64) -> BoxFuture<'_, Result<Talent, ViewError>> {
        Box::pin(async move {
            let inner = self.lock()?;
            inner
                .tables
                .talents
                .get(&talent_id)
                .cloned()
                .ok_or_else(|| ViewError::not_found("talent", talent_id))
        })
    }
}

impl ProfitPercentageViews for InMemoryStore {
    fn view_customized_talent_profit_percentage(
        &self,
        talent_id: i64,
    ) -> BoxFuture<'_, Result<Option<TalentProfitPercentage>, ViewError>> {
        Box::pin(async move {
            let inner = self.lock()?;
            Ok(inner
                .tables
                .custom_percentages
                .get(&talent_id)
                .map(|value| TalentProfitPercentage {
                    talent_id: Some(talent_id),
                    value: *value,
                }))
        })
    }

    fn view_default_talent_profit_percentage(&self) -> BoxFuture<'_, Result<TalentProfitPercentage, ViewError>> {
        Box::pin(async move {
            let inner = self.lock()?;
            inner
                .tables
                .default_percentage
                .map(|value| TalentProfitPercentage { talent_id: None, value })
                .ok_or_else(|| ViewError::not_found("default talent profit percentage", "-"))
        })
    }

    fn view_agency_profit_percentage(
        &self,
        agency_id: i64,
    ) -> BoxFuture<'_, Result<AgencyProfitPercentage, ViewError>> {
        Box::pin(async move {
            let inner = self.lock()?;
            inner
                .tables
                .agency_percentages
                .get(&agency_id)
                .map(|value| AgencyProfitPercentage {
                    agency_id,
                    value: *value,
                })
                .ok_or_else(|| ViewError::not_found("agency profit percentage", agency_id))
        })
    }
}

impl ShoutoutVideos for InMemoryStore {
    fn view_shoutout(&self, shoutout_hash: Uuid) -> BoxFuture<'_, Result<Shoutout, ViewError>> {
        Box::pin(async move {
            let inner = self.lock()?;
            inner
                .tables
                .shoutouts
                .iter()
                .find(|s| s.hash_id == shoutout_hash)
                .cloned()
                .ok_or_else(|| ViewError::not_found("shoutout", shoutout_hash))
        })
    }

    fn replace_video_file<'a>(
        &'a self,
        shoutout_hash: Uuid,
        video_file: &'a str,
    ) -> BoxFuture<'a, Result<(), StorageError>> {
        Box::pin(async move {
            let mut inner = self.lock()?;
            let shoutout = inner
                .tables
                .shoutouts
                .iter_mut()
                .find(|s| s.hash_id == shoutout_hash)
                .ok_or_else(|| StorageError(format!("shoutout {shoutout_hash} not found")))?;
            video_file.clone_into(&mut shoutout.video_file);
            Ok(())
        })
    }
}

// ---------------------------------------------------------------------------
// Units of work
// ---------------------------------------------------------------------------

/// Request unit of work over an [`InMemoryStore`].
#[derive(Debug)]
pub struct InMemoryPersistRequestShoutout {
    store: InMemoryStore,
    order: Option<Order>,
    charge: Option<Charge>,
    credit_card: Option<CreditCard>,
    buyer: Option<Buyer>,
}

impl InMemoryPersistRequestShoutout {
    fn apply(&self, inner: &Inner) -> Result<Tables, PersistingShoutoutRequestError> {
        let order = self.order.clone().ok_or(PersistingShoutoutRequestError::Incomplete("order"))?;
        let charge = self.charge.clone().ok_or(PersistingShoutoutRequestError::Incomplete("charge"))?;
        let card = self
            .credit_card
            .clone()
            .ok_or(PersistingShoutoutRequestError::Incomplete("credit card"))?;
        let buyer = self.buyer.clone().ok_or(PersistingShoutoutRequestError::Incomplete("buyer"))?;
        let storage = PersistingShoutoutRequestError::Storage;

        let mut tables = inner.tables.clone();
        inner.check(FailurePoint::OrderInsert).map_err(storage)?;
        if tables.find_order(OrderLookup::Hash(order.hash_id)).is_some() {
            return Err(storage(format!("duplicate order hash {}", order.hash_id)));
        }
        let order_id = tables.next_id();
        let mut order = order;
        order.id = Some(order_id);
        tables.orders.insert(order_id, order);

        inner.check(FailurePoint::ChargeInsert).map_err(storage)?;
        let charge_id = tables.next_id();
        tables.charges.insert(
            charge_id,
            Charge {
                id: Some(charge_id),
                order_id: Some(order_id),
                ..charge
            },
        );

        inner.check(FailurePoint::CreditCardInsert).map_err(storage)?;
        tables.credit_cards.push(CreditCard {
            charge_id: Some(charge_id),
            ..card
        });

        inner.check(FailurePoint::BuyerInsert).map_err(storage)?;
        tables.buyers.push(Buyer {
            charge_id: Some(charge_id),
            ..buyer
        });
        Ok(tables)
    }
}

impl PersistRequestShoutoutUnitOfWork for InMemoryPersistRequestShoutout {
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
            let mut inner = self
                .store
                .lock()
                .map_err(|e| PersistingShoutoutRequestError::Storage(e.to_string()))?;
            let tables = self.apply(&inner)?;
            inner.tables = tables;
            Ok(())
        })
    }
}

/// Fulfillment unit of work over an [`InMemoryStore`].
#[derive(Debug)]
pub struct InMemoryFulfillShoutoutRequest {
    store: InMemoryStore,
    shoutout: Option<Shoutout>,
    talent_profit: Option<TalentProfit>,
    agency_profit: Option<AgencyProfit>,
}

impl InMemoryFulfillShoutoutRequest {
    fn apply(&self, inner: &Inner) -> Result<Tables, PersistingShoutoutVideoError> {
        let shoutout = self.shoutout.clone().ok_or(PersistingShoutoutVideoError::Incomplete("shoutout"))?;
        let talent_profit = self
            .talent_profit
            .clone()
            .ok_or(PersistingShoutoutVideoError::Incomplete("talent profit"))?;
        let storage = PersistingShoutoutVideoError::Storage;

        let mut tables = inner.tables.clone();
        inner.check(FailurePoint::ShoutoutInsert).map_err(storage)?;
        if tables.shoutouts.iter().any(|s| s.order_id == shoutout.order_id) {
            return Err(PersistingShoutoutVideoError::OrderAlreadyFulfilled {
                order_id: shoutout.order_id,
            });
        }
        tables.shoutouts.push(shoutout);

        inner.check(FailurePoint::TalentProfitInsert).map_err(storage)?;
        tables.talent_profits.push(talent_profit);

        if let Some(agency_profit) = self.agency_profit.clone() {
            inner.check(FailurePoint::AgencyProfitInsert).map_err(storage)?;
            tables.agency_profits.push(agency_profit);
        }
        Ok(tables)
    }
}

impl FulfillShoutoutRequestUnitOfWork for InMemoryFulfillShoutoutRequest {
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
            let mut inner = self
                .store
                .lock()
                .map_err(|e| PersistingShoutoutVideoError::Storage(e.to_string()))?;
            let tables = self.apply(&inner)?;
            inner.tables = tables;
            Ok(())
        })
    }
}

impl UnitOfWorkFactory for InMemoryStore {
    fn persist_request_shoutout(&self) -> Box<dyn PersistRequestShoutoutUnitOfWork> {
        Box::new(InMemoryPersistRequestShoutout {
            store: self.clone(),
            order: None,
            charge: None,
            credit_card: None,
            buyer: None,
        })
    }

    fn fulfill_shoutout_request(&self) -> Box<dyn FulfillShoutoutRequestUnitOfWork> {
        Box::new(InMemoryFulfillShoutoutRequest {
            store: self.clone(),
            shoutout: None,
            talent_profit: None,
            agency_profit: None,
        })
    }
}

// ---------------------------------------------------------------------------
// Payment records
// ---------------------------------------------------------------------------

impl PaymentRecords for InMemoryStore {
    fn persist_transaction_data<'a>(
        &'a self,
        order_id: i64,
        wirecard_order_hash: &'a str,
        wirecard_payment_hash: &'a str,
    ) -> BoxFuture<'a, Result<(), StorageError>> {
        Box::pin(async move {
            let mut inner = self.lock()?;
            inner.check(FailurePoint::TransactionInsert).map_err(StorageError)?;
            let order_hash = inner
                .tables
                .orders
                .get(&order_id)
                .map(|order| order.hash_id)
                .ok_or_else(|| StorageError(format!("order {order_id} not found")))?;
            inner.tables.transactions.push(TransactionData {
                order_id,
                order_hash,
                wirecard_order_hash: wirecard_order_hash.to_owned(),
                wirecard_payment_hash: wirecard_payment_hash.to_owned(),
                payment_event_last_timestamp: None,
            });
            Ok(())
        })
    }

    fn persist_charge_status(&self, order_id: i64, status: ChargeStatus) -> BoxFuture<'_, Result<(), StorageError>> {
        Box::pin(async move {
            let mut inner = self.lock()?;
            inner.check(FailurePoint::ChargeStatusUpdate).map_err(StorageError)?;
            let charge = inner
                .tables
                .charge_mut(order_id)
                .ok_or_else(|| StorageError(format!("charge of order {order_id} not found")))?;
            charge.status = status;
            Ok(())
        })
    }

    fn apply_payment_notification<'a>(
        &'a self,
        update: &'a PaymentStatusUpdate,
    ) -> BoxFuture<'a, Result<NotificationOutcome, StorageError>> {
        Box::pin(async move {
            let mut inner = self.lock()?;
            let tables = &mut inner.tables;
            let Some(tx) = tables
                .transactions
                .iter_mut()
                .find(|tx| tx.wirecard_payment_hash == update.wirecard_payment_hash)
            else {
                return Ok(NotificationOutcome::UnknownPayment);
            };
            if is_stale_notification(update.event_at, tx.payment_event_last_timestamp) {
                return Ok(NotificationOutcome::Stale);
            }
            tx.payment_event_last_timestamp = Some(update.event_at);
            let order_id = tx.order_id;
            if let Some(charge) = tables.charge_mut(order_id) {
                charge.status = update.status;
            }
            Ok(NotificationOutcome::Applied)
        })
    }
}
