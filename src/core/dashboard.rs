//! Query surface combining the ledger, exchange rates and the user session.
use crate::core::budgets::{self, BudgetList, BudgetSummary};
use crate::core::currency::{self, CurrencyRateProvider};
use crate::core::goals::{self, GoalProgress, GoalSummary};
use crate::core::ledger::{LedgerReader, TransactionFilter};
use crate::core::period::MonthWindow;
use crate::core::rate_cache::RateTable;
use crate::core::session::Session;
use crate::core::stats::{self, DashboardStats};
use crate::core::trends::{self, TrendSeries};
use anyhow::Result;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::debug;

type ProgressCallback = Arc<dyn Fn() + Send + Sync>;

pub struct Dashboard {
    ledger: Arc<dyn LedgerReader>,
    rates: Arc<dyn CurrencyRateProvider>,
    session: Session,
    on_rate_resolved: Option<ProgressCallback>,
}

impl Dashboard {
    pub fn new(
        ledger: Arc<dyn LedgerReader>,
        rates: Arc<dyn CurrencyRateProvider>,
        session: Session,
    ) -> Self {
        Self {
            ledger,
            rates,
            session,
            on_rate_resolved: None,
        }
    }

    /// Invoked once per base currency looked up while answering a query.
    pub fn with_progress(mut self, callback: ProgressCallback) -> Self {
        self.on_rate_resolved = Some(callback);
        self
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    async fn resolve_rates(&self, pairs: Vec<(String, String)>) -> RateTable {
        let tick = || {
            if let Some(callback) = &self.on_rate_resolved {
                callback();
            }
        };
        RateTable::resolve(self.rates.as_ref(), pairs, &tick).await
    }

    pub async fn get_dashboard_stats(&self, now: DateTime<Utc>) -> Result<DashboardStats> {
        let window = MonthWindow::containing(now);
        let filter = TransactionFilter::between(window.start(), window.end());
        let (accounts, transactions, invoices) = futures::try_join!(
            self.ledger.list_accounts(),
            self.ledger.list_transactions(&filter),
            self.ledger.list_invoices(),
        )?;
        debug!(
            "Computing stats over {} accounts, {} transactions and {} invoices",
            accounts.len(),
            transactions.len(),
            invoices.len()
        );

        let pairs = stats::required_pairs(
            &accounts,
            &transactions,
            &invoices,
            &self.session.display_currency,
        );
        let rates = self.resolve_rates(pairs).await;
        Ok(stats::calculate_dashboard_stats(
            &accounts,
            &transactions,
            &invoices,
            &rates,
            &self.session,
            now,
        ))
    }

    pub async fn get_monthly_trends(
        &self,
        now: DateTime<Utc>,
        months_back: usize,
    ) -> Result<TrendSeries> {
        let windows = trends::trailing_months(now, months_back)?;
        let transactions = match (windows.first(), windows.last()) {
            (Some(oldest), Some(newest)) => {
                let filter = TransactionFilter::between(oldest.start(), newest.end());
                self.ledger.list_transactions(&filter).await?
            }
            _ => Vec::new(),
        };

        let pairs = transactions
            .iter()
            .map(|t| (t.currency.clone(), self.session.display_currency.clone()))
            .collect();
        let rates = self.resolve_rates(pairs).await;
        trends::monthly_trends(&transactions, &rates, &self.session, now, months_back)
    }

    pub async fn list_active_budgets(&self, now: DateTime<Utc>) -> Result<BudgetList> {
        let (list, _) = self.budget_progress(now).await?;
        Ok(list)
    }

    pub async fn get_budget_summary(&self, now: DateTime<Utc>) -> Result<BudgetSummary> {
        let (list, rates) = self.budget_progress(now).await?;
        let mut summary = budgets::summarize(&list.budgets, &rates, &self.session);
        summary.missing_rates.extend(list.missing_rates);
        Ok(summary)
    }

    async fn budget_progress(&self, now: DateTime<Utc>) -> Result<(BudgetList, RateTable)> {
        let window = MonthWindow::containing(now);
        let filter = TransactionFilter::between(window.start(), window.end());
        let (budget_rows, categories, transactions) = futures::try_join!(
            self.ledger.list_budgets(),
            self.ledger.list_categories(),
            self.ledger.list_transactions(&filter),
        )?;

        let pairs = budgets::required_pairs(
            &budget_rows,
            &transactions,
            &self.session.display_currency,
        );
        let rates = self.resolve_rates(pairs).await;
        let list = budgets::list_active(
            &budget_rows,
            &categories,
            &transactions,
            &rates,
            &self.session,
            now,
        );
        Ok((list, rates))
    }

    pub async fn list_active_goals(&self) -> Result<Vec<GoalProgress>> {
        let goal_rows = self.ledger.list_goals().await?;
        Ok(goals::list_active(&goal_rows))
    }

    pub async fn get_goal_summary(&self) -> Result<GoalSummary> {
        let goal_rows = self.ledger.list_goals().await?;
        let pairs = goals::required_pairs(&goal_rows, &self.session.display_currency);
        let rates = self.resolve_rates(pairs).await;
        Ok(goals::summarize(&goal_rows, &rates, &self.session))
    }

    pub async fn get_rate(&self, from: &str, to: &str) -> Option<Decimal> {
        self.rates.get_rate(from, to).await
    }

    pub fn convert(amount: Decimal, rate: Decimal) -> Decimal {
        currency::convert(amount, rate)
    }
}
