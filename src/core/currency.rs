//! Currency conversion abstractions

use anyhow::Result;
use async_trait::async_trait;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Multiplicative rates keyed by target currency code, relative to a base.
pub type Rates = HashMap<String, Decimal>;

/// An external source of the latest exchange rates.
#[async_trait]
pub trait RateSource: Send + Sync {
    async fn fetch_latest(&self, base: &str) -> Result<Rates>;
}

/// Rate lookups that degrade to `None` instead of failing.
#[async_trait]
pub trait CurrencyRateProvider: Send + Sync {
    async fn get_rates(&self, base: &str) -> Option<Rates>;

    async fn get_rate(&self, from: &str, to: &str) -> Option<Decimal> {
        if from == to {
            return Some(Decimal::ONE);
        }
        self.get_rates(from).await?.get(to).copied()
    }
}

/// Source of the current time in epoch milliseconds.
pub trait Clock: Send + Sync {
    fn now_millis(&self) -> i64;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

/// A cached set of rates for one base currency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExchangeRateCacheEntry {
    pub base: String,
    pub rates: Rates,
    pub timestamp: i64,
}

impl ExchangeRateCacheEntry {
    /// An entry stamped in the future, or too far in the past to measure, is stale.
    pub fn is_fresh(&self, now_millis: i64, ttl_millis: i64) -> bool {
        now_millis
            .checked_sub(self.timestamp)
            .is_some_and(|age| (0..ttl_millis).contains(&age))
    }
}

/// Converts `amount` at `rate`, rounded to cents with midpoints away from zero.
pub fn convert(amount: Decimal, rate: Decimal) -> Decimal {
    (amount * rate).round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}
