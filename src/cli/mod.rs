pub mod budgets;
pub mod goals;
pub mod rate;
pub mod setup;
pub mod stats;
pub mod trends;
pub mod ui;
