use super::ui;
use crate::core::Dashboard;
use crate::core::budgets::{self, BudgetProgress, BudgetSummary};
use crate::core::ranking::{DISPLAY_LIMIT, TopN};
use anyhow::Result;
use chrono::{DateTime, Utc};
use comfy_table::Cell;
use indicatif::ProgressBar;

fn budgets_table(top: &TopN<BudgetProgress>) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Category"),
        ui::header_cell("Spent"),
        ui::header_cell("Limit"),
        ui::header_cell("Used"),
        ui::header_cell("Status"),
    ]);

    for progress in &top.items {
        let name = progress
            .category_name
            .clone()
            .unwrap_or_else(|| progress.budget.category_id.clone());
        let currency = &progress.budget.currency;
        table.add_row(vec![
            Cell::new(name),
            Cell::new(format!("{} {}", ui::format_money(progress.spent), currency)),
            Cell::new(format!("{} {}", ui::format_money(progress.budget.amount), currency)),
            ui::percent_cell(progress.percent_used),
            ui::status_cell(progress.status),
        ]);
    }

    let mut output = table.to_string();
    if top.remainder > 0 {
        output.push_str(&format!(
            "\n{}",
            ui::style_text(&format!("+{} more", top.remainder), ui::StyleType::Subtle)
        ));
    }
    output
}

impl BudgetSummary {
    pub fn display_summary(&self) -> String {
        let mut output = format!(
            "Active: {}  Near limit: {}  Over budget: {}\nSpent {} of {} ({})",
            self.active,
            self.near_limit,
            self.over_budget,
            ui::style_text(&ui::format_money(self.total_spent), ui::StyleType::TotalValue),
            ui::format_money(self.total_budgeted),
            ui::style_text(&self.currency, ui::StyleType::TotalLabel),
        );
        if let Some(note) = ui::partial_note(&self.missing_rates) {
            output.push_str(&format!("\n\n{note}"));
        }
        output
    }
}

pub async fn run(dashboard: &Dashboard, progress: &ProgressBar, now: DateTime<Utc>) -> Result<()> {
    let result = async {
        let list = dashboard.list_active_budgets(now).await?;
        let summary = dashboard.get_budget_summary(now).await?;
        anyhow::Ok((list, summary))
    }
    .await;
    progress.finish_and_clear();
    let (list, summary) = result?;

    println!("{}\n", ui::style_text("Budgets", ui::StyleType::Title));
    if list.budgets.is_empty() {
        println!("No active budgets.");
        return Ok(());
    }
    let top = budgets::top_budgets(list.budgets, DISPLAY_LIMIT);
    println!("{}", budgets_table(&top));
    ui::print_separator();
    println!("{}", summary.display_summary());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::budgets::BudgetStatus;
    use crate::core::ledger::Budget;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use std::collections::BTreeSet;

    fn progress(category: &str, spent: Decimal) -> BudgetProgress {
        let percent = spent;
        BudgetProgress {
            budget: Budget {
                id: category.to_string(),
                category_id: category.to_string(),
                amount: dec!(100),
                currency: "USD".to_string(),
                is_active: true,
            },
            category_name: None,
            spent,
            percent_used: Some(percent),
            status: BudgetStatus::from_percent(percent),
        }
    }

    #[test]
    fn test_table_shows_top_and_remainder() {
        let items = vec![
            progress("food", dec!(90)),
            progress("rent", dec!(100)),
            progress("fun", dec!(120)),
            progress("travel", dec!(10)),
            progress("gifts", dec!(5)),
        ];
        let output = budgets_table(&budgets::top_budgets(items, DISPLAY_LIMIT));
        assert!(output.contains("fun"));
        assert!(output.contains("Over budget"));
        assert!(!output.contains("travel"));
        assert!(output.contains("+2 more"));
    }

    #[test]
    fn test_summary_display() {
        let summary = BudgetSummary {
            currency: "USD".to_string(),
            active: 3,
            over_budget: 1,
            near_limit: 1,
            total_budgeted: dec!(300),
            total_spent: dec!(215),
            missing_rates: BTreeSet::new(),
        };
        let output = summary.display_summary();
        assert!(output.contains("Active: 3"));
        assert!(output.contains("215.00"));
        assert!(output.contains("300.00"));
    }
}
