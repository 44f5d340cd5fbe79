//! Point-in-time dashboard metrics.
use crate::core::ledger::{Account, AccountType, Invoice, Transaction, TransactionType};
use crate::core::period::MonthWindow;
use crate::core::rate_cache::{Converter, RateTable};
use crate::core::session::Session;
use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use std::collections::BTreeSet;

/// Income and expense totals for one calendar month.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MonthlyFlow {
    pub income: Decimal,
    pub expenses: Decimal,
}

impl MonthlyFlow {
    pub fn net(&self) -> Decimal {
        self.income - self.expenses
    }
}

/// Dashboard metrics, all in the session's display currency.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardStats {
    pub currency: String,
    pub net_worth: Decimal,
    pub monthly_income: Decimal,
    pub monthly_expenses: Decimal,
    pub monthly_savings: Decimal,
    pub pending_invoices: usize,
    pub pending_invoice_amount: Decimal,
    /// Amount owed on credit cards. Already counted in `net_worth`; for
    /// annotation only.
    pub pending_cc_balance: Decimal,
    /// Currency pairs without a rate. Amounts in these pairs were left out.
    pub missing_rates: BTreeSet<String>,
}

impl DashboardStats {
    /// Savings as a whole-number percentage of income, if there was income.
    pub fn savings_rate(&self) -> Option<Decimal> {
        if self.monthly_income <= Decimal::ZERO {
            return None;
        }
        self.monthly_savings
            .checked_div(self.monthly_income)
            .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
            .map(|rate| rate.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
    }

    pub fn is_partial(&self) -> bool {
        !self.missing_rates.is_empty()
    }
}

/// Sums income and expense transactions that fall inside `window`.
///
/// Transfers move money between the user's own accounts and are ignored.
/// Amounts are taken as magnitudes; the transaction kind gives the direction.
pub fn tally_month(
    transactions: &[Transaction],
    window: MonthWindow,
    session: &Session,
    converter: &mut Converter<'_>,
) -> MonthlyFlow {
    let mut flow = MonthlyFlow::default();
    for transaction in transactions {
        if !session.scope.includes(transaction.is_business)
            || !window.contains(transaction.occurred_at)
        {
            continue;
        }
        let bucket = match transaction.kind {
            TransactionType::Income => &mut flow.income,
            TransactionType::Expense => &mut flow.expenses,
            TransactionType::Transfer => continue,
        };
        if let Some(amount) =
            converter.convert_to_target(transaction.amount.abs(), &transaction.currency)
        {
            *bucket += amount;
        }
    }
    flow
}

/// Every currency pair a stats computation may need to convert.
pub fn required_pairs(
    accounts: &[Account],
    transactions: &[Transaction],
    invoices: &[Invoice],
    display_currency: &str,
) -> Vec<(String, String)> {
    accounts
        .iter()
        .map(|a| &a.currency)
        .chain(transactions.iter().map(|t| &t.currency))
        .chain(invoices.iter().map(|i| &i.currency))
        .map(|currency| (currency.clone(), display_currency.to_string()))
        .collect()
}

/// Computes the dashboard metrics for the month containing `now`.
///
/// Amounts whose currency cannot be converted are excluded and reported in
/// `missing_rates` rather than failing the whole computation.
pub fn calculate_dashboard_stats(
    accounts: &[Account],
    transactions: &[Transaction],
    invoices: &[Invoice],
    rates: &RateTable,
    session: &Session,
    now: DateTime<Utc>,
) -> DashboardStats {
    let mut converter = Converter::new(rates, &session.display_currency);

    let mut net_worth = Decimal::ZERO;
    let mut pending_cc_balance = Decimal::ZERO;
    for account in accounts
        .iter()
        .filter(|a| session.scope.includes(a.is_business))
    {
        let Some(contribution) =
            converter.convert_to_target(account.net_worth_contribution(), &account.currency)
        else {
            continue;
        };
        net_worth += contribution;
        if account.account_type == AccountType::CreditCard {
            pending_cc_balance += contribution.abs();
        }
    }

    let flow = tally_month(
        transactions,
        MonthWindow::containing(now),
        session,
        &mut converter,
    );

    let mut pending_invoices = 0;
    let mut pending_invoice_amount = Decimal::ZERO;
    for invoice in invoices.iter().filter(|i| !i.status.is_terminal()) {
        pending_invoices += 1;
        if let Some(total) = converter.convert_to_target(invoice.total, &invoice.currency) {
            pending_invoice_amount += total;
        }
    }

    DashboardStats {
        currency: session.display_currency.clone(),
        net_worth,
        monthly_income: flow.income,
        monthly_expenses: flow.expenses,
        monthly_savings: flow.net(),
        pending_invoices,
        pending_invoice_amount,
        pending_cc_balance,
        missing_rates: converter.into_missing(),
    }
}
