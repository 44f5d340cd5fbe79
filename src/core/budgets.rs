//! Budget utilization for the current month.
use crate::core::ledger::{Budget, Category, Transaction, TransactionType};
use crate::core::period::MonthWindow;
use crate::core::ranking::{TopN, top_n_by};
use crate::core::rate_cache::{Converter, RateTable};
use crate::core::session::Session;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::collections::{BTreeSet, HashMap};
use std::fmt::Display;

/// Share of the limit at which a budget is flagged as close to running out.
const NEAR_LIMIT_PERCENT: Decimal = Decimal::from_parts(80, 0, 0, false, 0);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BudgetStatus {
    OnTrack,
    NearLimit,
    OverBudget,
}

impl BudgetStatus {
    pub fn from_percent(percent_used: Decimal) -> Self {
        if percent_used > Decimal::ONE_HUNDRED {
            BudgetStatus::OverBudget
        } else if percent_used >= NEAR_LIMIT_PERCENT {
            BudgetStatus::NearLimit
        } else {
            BudgetStatus::OnTrack
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            BudgetStatus::OnTrack => "On track",
            BudgetStatus::NearLimit => "Near limit",
            BudgetStatus::OverBudget => "Over budget",
        }
    }
}

impl Display for BudgetStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BudgetProgress {
    pub budget: Budget,
    pub category_name: Option<String>,
    /// Spending this month, in the budget's currency.
    pub spent: Decimal,
    /// `spent / amount * 100`, not capped. `None` when the limit is not positive.
    pub percent_used: Option<Decimal>,
    pub status: BudgetStatus,
}

impl BudgetProgress {
    pub fn remaining(&self) -> Decimal {
        self.budget.amount - self.spent
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BudgetList {
    pub budgets: Vec<BudgetProgress>,
    pub missing_rates: BTreeSet<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BudgetSummary {
    pub currency: String,
    pub active: usize,
    pub over_budget: usize,
    pub near_limit: usize,
    pub total_budgeted: Decimal,
    pub total_spent: Decimal,
    pub missing_rates: BTreeSet<String>,
}

fn utilization(spent: Decimal, limit: Decimal) -> Option<Decimal> {
    if limit <= Decimal::ZERO {
        return None;
    }
    spent
        .checked_div(limit)
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
}

/// Every currency pair needed to track `budgets` and summarize them.
pub fn required_pairs(
    budgets: &[Budget],
    transactions: &[Transaction],
    display_currency: &str,
) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    for budget in budgets.iter().filter(|b| b.is_active) {
        pairs.push((budget.currency.clone(), display_currency.to_string()));
        for transaction in transactions
            .iter()
            .filter(|t| t.category_id.as_ref() == Some(&budget.category_id))
        {
            pairs.push((transaction.currency.clone(), budget.currency.clone()));
        }
    }
    pairs
}

/// Computes spending against every active budget for the month containing
/// `now`, keeping the budgets' input order.
pub fn list_active(
    budgets: &[Budget],
    categories: &[Category],
    transactions: &[Transaction],
    rates: &RateTable,
    session: &Session,
    now: DateTime<Utc>,
) -> BudgetList {
    let window = MonthWindow::containing(now);
    let names: HashMap<&str, &str> = categories
        .iter()
        .map(|c| (c.id.as_str(), c.name.as_str()))
        .collect();
    let mut converter = Converter::new(rates, &session.display_currency);

    let budgets = budgets
        .iter()
        .filter(|b| b.is_active)
        .map(|budget| {
            let spent = transactions
                .iter()
                .filter(|t| {
                    t.kind == TransactionType::Expense
                        && t.category_id.as_ref() == Some(&budget.category_id)
                        && session.scope.includes(t.is_business)
                        && window.contains(t.occurred_at)
                })
                .filter_map(|t| converter.convert(t.amount.abs(), &t.currency, &budget.currency))
                .sum::<Decimal>();
            let percent_used = utilization(spent, budget.amount);
            let status = match percent_used {
                Some(percent) => BudgetStatus::from_percent(percent),
                None if spent > Decimal::ZERO => BudgetStatus::OverBudget,
                None => BudgetStatus::OnTrack,
            };

            BudgetProgress {
                budget: budget.clone(),
                category_name: names.get(budget.category_id.as_str()).map(|n| n.to_string()),
                spent,
                percent_used,
                status,
            }
        })
        .collect();

    BudgetList {
        budgets,
        missing_rates: converter.into_missing(),
    }
}

/// Totals over already-computed budget progress, in the display
/// currency.
pub fn summarize(progress: &[BudgetProgress], rates: &RateTable, session: &Session) -> BudgetSummary {
    let mut converter = Converter::new(rates, &session.display_currency);
    let mut summary = BudgetSummary {
        currency: session.display_currency.clone(),
        active: progress.len(),
        over_budget: 0,
        near_limit: 0,
        total_budgeted: Decimal::ZERO,
        total_spent: Decimal::ZERO,
        missing_rates: BTreeSet::new(),
    };

    for item in progress {
        match item.status {
            BudgetStatus::OverBudget => summary.over_budget += 1,
            BudgetStatus::NearLimit => summary.near_limit += 1,
            BudgetStatus::OnTrack => {}
        }
        let currency = &item.budget.currency;
        if let (Some(budgeted), Some(spent)) = (
            converter.convert_to_target(item.budget.amount, currency),
            converter.convert_to_target(item.spent, currency),
        ) {
            summary.total_budgeted += budgeted;
            summary.total_spent += spent;
        }
    }

    summary.missing_rates = converter.into_missing();
    summary
}

/// The budgets closest to (or furthest past) their limit.
pub fn top_budgets(progress: Vec<BudgetProgress>, n: usize) -> TopN<BudgetProgress> {
    top_n_by(progress, n, |p| p.percent_used)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ledger::CategoryType;
    use crate::core::ranking::DISPLAY_LIMIT;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
    }

    fn budget(id: &str, category_id: &str, amount: Decimal) -> Budget {
        Budget {
            id: id.to_string(),
            category_id: category_id.to_string(),
            amount,
            currency: "USD".to_string(),
            is_active: true,
        }
    }

    fn expense(category_id: &str, amount: Decimal, month: u32) -> Transaction {
        Transaction {
            id: format!("{category_id}-{amount}-{month}"),
            account_id: "checking".to_string(),
            category_id: Some(category_id.to_string()),
            amount,
            currency: "USD".to_string(),
            kind: TransactionType::Expense,
            occurred_at: Utc.with_ymd_and_hms(2024, month, 2, 12, 0, 0).unwrap(),
            is_business: false,
        }
    }

    fn list(budgets: &[Budget], transactions: &[Transaction]) -> Vec<BudgetProgress> {
        list_active(
            budgets,
            &[],
            transactions,
            &RateTable::default(),
            &Session::new("USD"),
            now(),
        )
        .budgets
    }

    #[test]
    fn test_status_bands() {
        assert_eq!(BudgetStatus::from_percent(dec!(79.99)), BudgetStatus::OnTrack);
        assert_eq!(BudgetStatus::from_percent(dec!(80)), BudgetStatus::NearLimit);
        assert_eq!(BudgetStatus::from_percent(dec!(100)), BudgetStatus::NearLimit);
        assert_eq!(BudgetStatus::from_percent(dec!(100.01)), BudgetStatus::OverBudget);
    }

    #[test]
    fn test_over_budget_is_not_capped() {
        let progress = list(
            &[budget("b1", "food", dec!(100))],
            &[expense("food", dec!(100), 6), expense("food", dec!(-50), 6)],
        );

        assert_eq!(progress[0].spent, dec!(150));
        assert_eq!(progress[0].percent_used, Some(dec!(150)));
        assert_eq!(progress[0].status, BudgetStatus::OverBudget);
        assert_eq!(progress[0].remaining(), dec!(-50));

        let summary = summarize(&progress, &RateTable::default(), &Session::new("USD"));
        assert_eq!(summary.over_budget, 1);
        assert_eq!(summary.total_spent, dec!(150));
        assert_eq!(summary.total_budgeted, dec!(100));
    }

    #[test]
    fn test_only_current_month_expenses_in_category() {
        let mut income = expense("food", dec!(500), 6);
        income.kind = TransactionType::Income;
        let mut transfer = expense("food", dec!(500), 6);
        transfer.kind = TransactionType::Transfer;
        let transactions = vec![
            expense("food", dec!(40), 6),
            expense("food", dec!(1000), 5),
            expense("rent", dec!(900), 6),
            income,
            transfer,
        ];

        let progress = list(&[budget("b1", "food", dec!(200))], &transactions);
        assert_eq!(progress[0].spent, dec!(40));
        assert_eq!(progress[0].percent_used, Some(dec!(20)));
        assert_eq!(progress[0].status, BudgetStatus::OnTrack);
    }

    #[test]
    fn test_inactive_budgets_excluded() {
        let mut paused = budget("b2", "travel", dec!(300));
        paused.is_active = false;
        let progress = list(&[budget("b1", "food", dec!(100)), paused], &[]);
        assert_eq!(progress.len(), 1);
        assert_eq!(progress[0].budget.id, "b1");
    }

    #[test]
    fn test_zero_limit_not_computed() {
        let progress = list(
            &[budget("b1", "food", Decimal::ZERO), budget("b2", "fun", Decimal::ZERO)],
            &[expense("food", dec!(5), 6)],
        );
        assert_eq!(progress[0].percent_used, None);
        assert_eq!(progress[0].status, BudgetStatus::OverBudget);
        assert_eq!(progress[1].percent_used, None);
        assert_eq!(progress[1].status, BudgetStatus::OnTrack);
    }

    #[test]
    fn test_category_names_attached() {
        let categories = vec![Category {
            id: "food".to_string(),
            name: "Food & Dining".to_string(),
            kind: CategoryType::Expense,
            color: "#f97316".to_string(),
        }];
        let result = list_active(
            &[budget("b1", "food", dec!(100)), budget("b2", "gone", dec!(100))],
            &categories,
            &[],
            &RateTable::default(),
            &Session::new("USD"),
            now(),
        );
        assert_eq!(result.budgets[0].category_name.as_deref(), Some("Food & Dining"));
        assert_eq!(result.budgets[1].category_name, None);
    }

    #[test]
    fn test_foreign_spending_converted_to_budget_currency() {
        let rates = RateTable::from_rates(HashMap::from([(
            "EUR".to_string(),
            HashMap::from([("USD".to_string(), dec!(1.1))]),
        )]));
        let mut euro_meal = expense("food", dec!(10), 6);
        euro_meal.currency = "EUR".to_string();
        let mut yen_meal = expense("food", dec!(1000), 6);
        yen_meal.currency = "JPY".to_string();

        let result = list_active(
            &[budget("b1", "food", dec!(100))],
            &[],
            &[euro_meal, yen_meal, expense("food", dec!(5), 6)],
            &rates,
            &Session::new("USD"),
            now(),
        );
        assert_eq!(result.budgets[0].spent, dec!(16.00));
        assert!(result.missing_rates.contains("JPY/USD"));
    }

    #[test]
    fn test_summary_counts_bands() {
        let budgets = vec![
            budget("b1", "a", dec!(100)),
            budget("b2", "b", dec!(100)),
            budget("b3", "c", dec!(100)),
        ];
        let transactions = vec![
            expense("a", dec!(120), 6),
            expense("b", dec!(85), 6),
            expense("c", dec!(10), 6),
        ];
        let progress = list(&budgets, &transactions);
        let summary = summarize(&progress, &RateTable::default(), &Session::new("USD"));

        assert_eq!(summary.active, 3);
        assert_eq!(summary.over_budget, 1);
        assert_eq!(summary.near_limit, 1);
        assert_eq!(summary.total_budgeted, dec!(300));
        assert_eq!(summary.total_spent, dec!(215));
        assert!(summary.missing_rates.is_empty());
    }

    #[test]
    fn test_top_three_of_five() {
        let budgets: Vec<_> = ["a", "b", "c", "d", "e"]
            .iter()
            .map(|c| budget(&format!("budget-{c}"), c, dec!(100)))
            .collect();
        let transactions = vec![
            expense("a", dec!(10), 6),
            expense("b", dec!(95), 6),
            expense("c", dec!(50), 6),
            expense("d", dec!(95), 6),
            expense("e", dec!(130), 6),
        ];

        let top = top_budgets(list(&budgets, &transactions), DISPLAY_LIMIT);
        let ids: Vec<_> = top.items.iter().map(|p| p.budget.id.as_str()).collect();
        assert_eq!(ids, vec!["budget-e", "budget-b", "budget-d"]);
        assert_eq!(top.remainder, 2);
    }
}
