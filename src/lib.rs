pub mod cli;
pub mod core;
pub mod providers;
pub mod store;

use crate::core::cache::Store;
use crate::core::config::AppConfig;
use crate::core::ledger::{MemoryLedger, seed_default_categories};
use crate::core::rate_cache::{RATES_COLLECTION, RateCache};
use crate::core::{Dashboard, LedgerReader};
use crate::providers::ExchangeRateApiProvider;
use crate::store::KeyValueStore;
use anyhow::{Context, Result};
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{debug, info};

pub use crate::core::trends::MAX_TREND_MONTHS;

/// Number of months shown by the trend command unless overridden.
pub const DEFAULT_TREND_MONTHS: usize = 6;

#[derive(Debug, Clone, PartialEq)]
pub enum AppCommand {
    Stats,
    Trends {
        months: usize,
    },
    Budgets,
    Goals,
    Rate {
        from: String,
        to: String,
        amount: Option<Decimal>,
    },
    ClearCache,
}

impl AppCommand {
    fn needs_ledger(&self) -> bool {
        !matches!(self, AppCommand::Rate { .. } | AppCommand::ClearCache)
    }
}

fn open_store(config: &AppConfig) -> Result<KeyValueStore> {
    if !config.cache.persist {
        return Ok(KeyValueStore::in_memory());
    }
    let cache_path = config.cache_path()?;
    Ok(KeyValueStore::open(Some(cache_path.as_path())))
}

/// The returned cache reads through collections owned by `store`, which must
/// outlive it.
fn open_rate_cache(config: &AppConfig, store: &KeyValueStore) -> Result<RateCache> {
    let collection = store
        .get_collection(RATES_COLLECTION, store.is_persistent(), true)
        .context("Failed to open exchange rate cache")?;

    let provider_config = &config.providers.exchange_rate;
    let source = ExchangeRateApiProvider::new(
        &provider_config.base_url,
        provider_config.timeout(),
        provider_config.retries,
    )?;
    Ok(RateCache::new(Arc::new(source), collection).with_ttl(config.cache.ttl()))
}

async fn open_ledger(config: &AppConfig) -> Result<MemoryLedger> {
    let path = config.ledger_path()?;
    let ledger = MemoryLedger::load_from_path(&path)
        .with_context(|| format!("Failed to open ledger at {}", path.display()))?;
    seed_default_categories(&ledger).await?;
    Ok(ledger)
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("finboard starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let store = open_store(&config)?;
    let rate_cache = Arc::new(open_rate_cache(&config, &store)?);
    if command == AppCommand::ClearCache {
        rate_cache.clear().await;
        println!("Exchange rate cache cleared.");
        return Ok(());
    }

    let ledger: Arc<dyn LedgerReader> = if command.needs_ledger() {
        Arc::new(open_ledger(&config).await?)
    } else {
        Arc::new(MemoryLedger::default())
    };

    let progress = cli::ui::new_spinner("Resolving exchange rates...");
    let tick = progress.clone();
    let dashboard = Dashboard::new(ledger, rate_cache, config.session())
        .with_progress(Arc::new(move || tick.inc(1)));
    let now = chrono::Utc::now();

    match command {
        AppCommand::Stats => cli::stats::run(&dashboard, &progress, now).await,
        AppCommand::Trends { months } => {
            cli::trends::run(&dashboard, &progress, now, months).await
        }
        AppCommand::Budgets => cli::budgets::run(&dashboard, &progress, now).await,
        AppCommand::Goals => cli::goals::run(&dashboard, &progress).await,
        AppCommand::Rate { from, to, amount } => {
            cli::rate::run(&dashboard, &progress, &from, &to, amount).await
        }
        AppCommand::ClearCache => Ok(()),
    }
}
