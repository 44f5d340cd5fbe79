//! Time-bounded cache of exchange rates, keyed by base currency.
use crate::core::cache::KeyValueCollection;
use crate::core::currency::{
    Clock, CurrencyRateProvider, ExchangeRateCacheEntry, RateSource, Rates, SystemClock,
};
use async_trait::async_trait;
use futures::future::join_all;
use rust_decimal::Decimal;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Rates are considered valid for one hour after they are fetched.
pub const DEFAULT_TTL: Duration = Duration::from_millis(3_600_000);

/// Name of the store collection holding rate entries.
pub const RATES_COLLECTION: &str = "exchange_rates";

pub fn cache_key(base: &str) -> String {
    format!("exchange_rates_cache_{base}")
}

/// Serves rates from a key-value collection and refreshes them from a
/// [`RateSource`] once they are older than the TTL.
///
/// Concurrent misses for the same base may both fetch; the last write wins.
pub struct RateCache {
    source: Arc<dyn RateSource>,
    collection: Arc<dyn KeyValueCollection>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl RateCache {
    pub fn new(source: Arc<dyn RateSource>, collection: Arc<dyn KeyValueCollection>) -> Self {
        Self {
            source,
            collection,
            ttl: DEFAULT_TTL,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub async fn clear(&self) {
        self.collection.clear().await;
    }

    fn ttl_millis(&self) -> i64 {
        i64::try_from(self.ttl.as_millis()).unwrap_or(i64::MAX)
    }

    async fn read_entry(&self, key: &str) -> Option<ExchangeRateCacheEntry> {
        let bytes = self.collection.get(key.as_bytes()).await?;
        match serde_json::from_slice(&bytes) {
            Ok(entry) => Some(entry),
            Err(e) => {
                debug!("Ignoring unreadable cache entry {}: {}", key, e);
                None
            }
        }
    }

    async fn write_entry(&self, key: &str, entry: &ExchangeRateCacheEntry) {
        match serde_json::to_vec(entry) {
            Ok(bytes) => self.collection.put(key.as_bytes(), bytes).await,
            Err(e) => debug!("Failed to serialize cache entry {}: {}", key, e),
        }
    }
}

#[async_trait]
impl CurrencyRateProvider for RateCache {
    async fn get_rates(&self, base: &str) -> Option<Rates> {
        let key = cache_key(base);
        let now = self.clock.now_millis();

        if let Some(entry) = self.read_entry(&key).await {
            if entry.is_fresh(now, self.ttl_millis()) {
                debug!("Serving cached rates for {}", base);
                return Some(entry.rates);
            }
            debug!("Cached rates for {} expired at {}", base, entry.timestamp);
        }

        match self.source.fetch_latest(base).await {
            Ok(rates) => {
                let entry = ExchangeRateCacheEntry {
                    base: base.to_string(),
                    rates,
                    timestamp: now,
                };
                self.write_entry(&key, &entry).await;
                Some(entry.rates)
            }
            Err(e) => {
                warn!(base, error = %e, "Exchange rate fetch failed");
                None
            }
        }
    }
}

/// Rates resolved up front for a batch of conversions.
///
/// Aggregations resolve every base currency they need once, then convert
/// synchronously against the table.
#[derive(Debug, Default, Clone)]
pub struct RateTable {
    by_base: HashMap<String, Option<Rates>>,
}

impl RateTable {
    /// Resolves rates for every `(from, to)` pair that needs a conversion.
    ///
    /// Each distinct source currency is looked up once, concurrently.
    pub async fn resolve<I>(
        provider: &dyn CurrencyRateProvider,
        pairs: I,
        update_callback: &(dyn Fn() + Sync),
    ) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let bases: BTreeSet<String> = pairs
            .into_iter()
            .filter(|(from, to)| from != to)
            .map(|(from, _)| from)
            .collect();

        let lookups = bases.into_iter().map(|base| async move {
            let rates = provider.get_rates(&base).await;
            update_callback();
            (base, rates)
        });

        Self {
            by_base: join_all(lookups).await.into_iter().collect(),
        }
    }

    pub fn from_rates(by_base: HashMap<String, Rates>) -> Self {
        Self {
            by_base: by_base.into_iter().map(|(k, v)| (k, Some(v))).collect(),
        }
    }

    pub fn rate(&self, from: &str, to: &str) -> Option<Decimal> {
        if from == to {
            return Some(Decimal::ONE);
        }
        self.by_base
            .get(from)
            .and_then(|rates| rates.as_ref())
            .and_then(|rates| rates.get(to))
            .copied()
    }

    /// Converts `amount` into `to`, leaving same-currency amounts untouched.
    pub fn convert(&self, amount: Decimal, from: &str, to: &str) -> Option<Decimal> {
        if from == to {
            return Some(amount);
        }
        self.rate(from, to)
            .map(|rate| crate::core::currency::convert(amount, rate))
    }
}

/// Converts amounts into one target currency against a [`RateTable`],
/// remembering every pair that had no rate.
pub struct Converter<'a> {
    rates: &'a RateTable,
    target: &'a str,
    missing: BTreeSet<String>,
}

impl<'a> Converter<'a> {
    pub fn new(rates: &'a RateTable, target: &'a str) -> Self {
        Self {
            rates,
            target,
            missing: BTreeSet::new(),
        }
    }

    pub fn convert_to_target(&mut self, amount: Decimal, from: &str) -> Option<Decimal> {
        let target = self.target;
        self.convert(amount, from, target)
    }

    /// Converts into an arbitrary currency; `None` means the amount must be
    /// left out of whatever it was going into.
    pub fn convert(&mut self, amount: Decimal, from: &str, to: &str) -> Option<Decimal> {
        let converted = self.rates.convert(amount, from, to);
        if converted.is_none() && self.missing.insert(format!("{from}/{to}")) {
            warn!("No exchange rate from {} to {}, skipping amounts", from, to);
        }
        converted
    }

    pub fn into_missing(self) -> BTreeSet<String> {
        self.missing
    }
}
