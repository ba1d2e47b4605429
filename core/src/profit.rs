//! Revenue-split factories.
//!
//! Both factories only read percentages through [`ProfitPercentageViews`]; they
//! hold no state of their own, so calling them twice yields equal records.

use std::sync::Arc;

use crate::error::ViewError;
use crate::money;
use crate::order::Order;
use crate::ports::ProfitPercentageViews;
use crate::shoutout::{AgencyProfit, TalentProfit};

/// Builds the talent's share of an order.
#[derive(Clone)]
pub struct TalentProfitFactory {
    percentages: Arc<dyn ProfitPercentageViews>,
}

impl TalentProfitFactory {
    /// Creates a factory over a percentage lookup.
    #[must_use]
    pub fn new(percentages: Arc<dyn ProfitPercentageViews>) -> Self {
        Self { percentages }
    }

    /// Uses the talent's custom percentage, falling back to the default one.
    ///
    /// # Errors
    ///
    /// Propagates lookup failures, including a missing default percentage.
    pub async fn build(&self, order: &Order, order_id: i64) -> Result<TalentProfit, ViewError> {
        let percentage = match self
            .percentages
            .view_customized_talent_profit_percentage(order.talent_id)
            .await?
        {
            Some(custom) => custom,
            None => self.percentages.view_default_talent_profit_percentage().await?,
        };
        let price = order.charge.amount_paid;
        Ok(TalentProfit {
            talent_id: order.talent_id,
            order_id,
            shoutout_price: price,
            profit_percentage: percentage.value,
            profit: money::profit_share(price, percentage.value),
            paid: false,
        })
    }
}

/// Builds the agency's share of an order.
#[derive(Clone)]
pub struct AgencyProfitFactory {
    percentages: Arc<dyn ProfitPercentageViews>,
}

impl AgencyProfitFactory {
    /// Creates a factory over a percentage lookup.
    #[must_use]
    pub fn new(percentages: Arc<dyn ProfitPercentageViews>) -> Self {
        Self { percentages }
    }

    /// Only called for talents that belong to `agency_id`.
    ///
    /// # Errors
    ///
    /// Propagates lookup failures; there is no default agency percentage.
    pub async fn build(&self, order: &Order, order_id: i64, agency_id: i64) -> Result<AgencyProfit, ViewError> {
        let percentage = self.percentages.view_agency_profit_percentage(agency_id).await?;
        let price = order.charge.amount_paid;
        Ok(AgencyProfit {
            agency_id,
            order_id,
            shoutout_price: price,
            profit_percentage: percentage.value,
            profit: money::profit_share(price, percentage.value),
            paid: false,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::BoxFuture;
    use crate::charge::{Buyer, Charge, ChargeStatus, CreditCard};
    use crate::order::{OrderDetails, VideoIsFor};
    use crate::talent::{AgencyProfitPercentage, TalentProfitPercentage};
    use chrono::{NaiveDate, Utc};
    use proptest::prelude::*;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use std::collections::HashMap;
    use uuid::Uuid;

    struct Percentages {
        default: Option<Decimal>,
        custom: HashMap<i64, Decimal>,
        agencies: HashMap<i64, Decimal>,
    }

    impl ProfitPercentageViews for Percentages {
        fn view_customized_talent_profit_percentage(
            &self,
            talent_id: i64,
        ) -> BoxFuture<'_, Result<Option<TalentProfitPercentage>, ViewError>> {
            let found = self.custom.get(&talent_id).map(|value| TalentProfitPercentage {
                talent_id: Some(talent_id),
                value: *value,
            });
            Box::pin(async move { Ok(found) })
        }

        fn view_default_talent_profit_percentage(&self) -> BoxFuture<'_, Result<TalentProfitPercentage, ViewError>> {
            let found = self.default;
            Box::pin(async move {
                found
                    .map(|value| TalentProfitPercentage { talent_id: None, value })
                    .ok_or_else(|| ViewError::not_found("default talent profit percentage", "-"))
            })
        }

        fn view_agency_profit_percentage(
            &self,
            agency_id: i64,
        ) -> BoxFuture<'_, Result<AgencyProfitPercentage, ViewError>> {
            let found = self.agencies.get(&agency_id).copied();
            Box::pin(async move {
                found
                    .map(|value| AgencyProfitPercentage { agency_id, value })
                    .ok_or_else(|| ViewError::not_found("agency profit percentage", agency_id))
            })
        }
    }

    fn order(amount: Decimal) -> Order {
        let buyer = Buyer::new(
            "Maria".into(),
            NaiveDate::from_ymd_opt(1990, 1, 1).unwrap(),
            "1".into(),
            "2".into(),
            "11".into(),
        );
        let card = CreditCard::new(buyer.clone(), "h".into());
        let charge = Charge::new(amount, Utc::now(), ChargeStatus::Processing, card, buyer);
        let details = OrderDetails {
            hash_id: Uuid::new_v4(),
            talent_id: 3,
            video_is_for: VideoIsFor::Myself,
            is_from: None,
            is_to: "Ana".into(),
            instruction: "oi".into(),
            email: "ana@example.com".into(),
            is_public: false,
        };
        Order::new(details, charge, Utc::now()).unwrap()
    }

    fn views(default: Option<Decimal>) -> Arc<Percentages> {
        Arc::new(Percentages {
            default,
            custom: HashMap::new(),
            agencies: HashMap::from([(9, dec!(0.05))]),
        })
    }

    #[tokio::test]
    async fn default_percentage_is_used_without_custom_one() {
        let factory = TalentProfitFactory::new(views(Some(dec!(0.75))));
        let profit = factory.build(&order(dec!(1000.00)), 1).await.unwrap();
        assert_eq!(profit.profit, dec!(750.00));
        assert_eq!(profit.profit_percentage, dec!(0.75));
        assert!(!profit.paid);
    }

    #[tokio::test]
    async fn custom_percentage_wins() {
        let mut percentages = Percentages {
            default: Some(dec!(0.75)),
            custom: HashMap::new(),
            agencies: HashMap::new(),
        };
        percentages.custom.insert(3, dec!(0.80));
        let factory = TalentProfitFactory::new(Arc::new(percentages));
        let profit = factory.build(&order(dec!(200.00)), 1).await.unwrap();
        assert_eq!(profit.profit, dec!(160.00));
    }

    #[tokio::test]
    async fn missing_default_percentage_propagates() {
        let factory = TalentProfitFactory::new(views(None));
        let err = factory.build(&order(dec!(10)), 1).await.unwrap_err();
        assert!(matches!(err, ViewError::NotFound { .. }));
    }

    #[tokio::test]
    async fn agency_profit() {
        let factory = AgencyProfitFactory::new(views(Some(dec!(0.75))));
        let profit = factory.build(&order(dec!(1000.00)), 1, 9).await.unwrap();
        assert_eq!(profit.profit, dec!(50.00));
        assert_eq!(profit.agency_id, 9);
        assert!(factory.build(&order(dec!(1)), 1, 10).await.is_err());
    }

    proptest! {
        #[test]
        fn building_twice_is_stable(cents in 1i64..10_000_000, pct in 0u32..=100) {
            let amount = Decimal::new(cents, 2);
            let percentage = Decimal::new(i64::from(pct), 2);
            let factory = TalentProfitFactory::new(views(Some(percentage)));
            let order = order(amount);
            let (first, second) = tokio_test::block_on(async {
                (factory.build(&order, 1).await.unwrap(), factory.build(&order, 1).await.unwrap())
            });
            prop_assert_eq!(&first, &second);
            prop_assert_eq!(first.profit, money::quantize(first.profit));
        }
    }
}
