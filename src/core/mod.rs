//! Core business logic abstractions

pub mod budgets;
pub mod cache;
pub mod config;
pub mod currency;
pub mod dashboard;
pub mod goals;
pub mod ledger;
pub mod log;
pub mod period;
pub mod ranking;
pub mod rate_cache;
pub mod session;
pub mod stats;
pub mod trends;

// Re-export main types for cleaner imports
pub use currency::{CurrencyRateProvider, RateSource};
pub use dashboard::Dashboard;
pub use ledger::{CategoryStore, LedgerReader};
pub use session::{Scope, Session};
