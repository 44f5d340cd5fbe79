use crate::core::ledger::Transaction;
use crate::core::period::MonthWindow;
use crate::core::rate_cache::{Converter, RateTable};
use crate::core::session::Session;
use crate::core::stats::tally_month;
use anyhow::{Context, Result, bail};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::collections::BTreeSet;

/// Longest series a trend query accepts.
pub const MAX_TREND_MONTHS: usize = 120;

#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyTrend {
    pub month: MonthWindow,
    pub label: String,
    pub income: Decimal,
    pub expenses: Decimal,
    pub net: Decimal,
}

/// A fixed-length monthly series plus any pairs that could not be converted.
#[derive(Debug, Clone, PartialEq)]
pub struct TrendSeries {
    pub currency: String,
    pub months: Vec<MonthlyTrend>,
    pub missing_rates: BTreeSet<String>,
}

/// The `months_back` calendar months ending with the one containing `now`,
/// oldest first. Fails rather than return fewer than `months_back` months.
pub fn trailing_months(now: DateTime<Utc>, months_back: usize) -> Result<Vec<MonthWindow>> {
    if months_back > MAX_TREND_MONTHS {
        bail!("Cannot show more than {MAX_TREND_MONTHS} months of trends, got {months_back}");
    }
    let current = MonthWindow::containing(now);
    (0..months_back)
        .rev()
        .map(|offset| {
            u32::try_from(offset)
                .ok()
                .and_then(|offset| current.months_before(offset))
                .with_context(|| format!("{offset} months before {current} is out of range"))
        })
        .collect()
}

/// Builds one entry per trailing month, including months with no activity.
pub fn monthly_trends(
    transactions: &[Transaction],
    rates: &RateTable,
    session: &Session,
    now: DateTime<Utc>,
    months_back: usize,
) -> Result<TrendSeries> {
    let mut converter = Converter::new(rates, &session.display_currency);
    let months = trailing_months(now, months_back)?
        .into_iter()
        .map(|month| {
            let flow = tally_month(transactions, month, session, &mut converter);
            MonthlyTrend {
                month,
                label: month.label(),
                income: flow.income,
                expenses: flow.expenses,
                net: flow.net(),
            }
        })
        .collect();

    Ok(TrendSeries {
        currency: session.display_currency.clone(),
        months,
        missing_rates: converter.into_missing(),
    })
}
