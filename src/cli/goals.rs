use super::ui;
use crate::core::Dashboard;
use crate::core::goals::{self, GoalProgress, GoalSummary};
use crate::core::ranking::{DISPLAY_LIMIT, TopN};
use anyhow::Result;
use comfy_table::Cell;
use indicatif::ProgressBar;

fn goals_table(top: &TopN<GoalProgress>) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Goal"),
        ui::header_cell("Saved"),
        ui::header_cell("Target"),
        ui::header_cell("Progress"),
        ui::header_cell("Remaining"),
    ]);

    for progress in &top.items {
        let currency = &progress.goal.currency;
        let mut name = Cell::new(&progress.goal.name);
        if progress.target_reached() {
            name = name.fg(comfy_table::Color::Green);
        }
        table.add_row(vec![
            name,
            Cell::new(format!(
                "{} {}",
                ui::format_money(progress.goal.current_amount),
                currency
            )),
            Cell::new(format!(
                "{} {}",
                ui::format_money(progress.goal.target_amount),
                currency
            )),
            ui::percent_cell(progress.display_percent()),
            ui::money_cell(progress.remaining()),
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

impl GoalSummary {
    pub fn display_summary(&self) -> String {
        let percent = self
            .percent_complete
            .map_or("N/A".to_string(), ui::format_percent);
        let mut output = format!(
            "Active: {}  Completed: {}\nSaved {} of {} ({}): {}",
            self.active,
            self.completed,
            ui::style_text(&ui::format_money(self.total_saved), ui::StyleType::TotalValue),
            ui::format_money(self.total_target),
            ui::style_text(&self.currency, ui::StyleType::TotalLabel),
            percent,
        );
        if let Some(note) = ui::partial_note(&self.missing_rates) {
            output.push_str(&format!("\n\n{note}"));
        }
        output
    }
}

pub async fn run(dashboard: &Dashboard, progress: &ProgressBar) -> Result<()> {
    let result = async {
        let active = dashboard.list_active_goals().await?;
        let summary = dashboard.get_goal_summary().await?;
        anyhow::Ok((active, summary))
    }
    .await;
    progress.finish_and_clear();
    let (active, summary) = result?;

    println!("{}\n", ui::style_text("Goals", ui::StyleType::Title));
    if active.is_empty() {
        println!("No active goals.");
    } else {
        println!("{}", goals_table(&goals::top_goals(active, DISPLAY_LIMIT)));
    }
    ui::print_separator();
    println!("{}", summary.display_summary());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::goals::list_active;
    use crate::core::ledger::Goal;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use std::collections::BTreeSet;

    fn goal(name: &str, current: Decimal) -> Goal {
        Goal {
            id: name.to_string(),
            name: name.to_string(),
            target_amount: dec!(200),
            current_amount: current,
            currency: "USD".to_string(),
            color: None,
            is_completed: false,
        }
    }

    #[test]
    fn test_goals_table() {
        let progress = list_active(&[goal("Laptop", dec!(50)), goal("Trip", dec!(250))]);
        let output = goals_table(&goals::top_goals(progress, DISPLAY_LIMIT));
        assert!(output.contains("Laptop"));
        assert!(output.contains("25.0%"));
        assert!(output.contains("100.0%"));
        assert!(!output.contains("more"));
    }

    #[test]
    fn test_summary_without_target() {
        let summary = GoalSummary {
            currency: "USD".to_string(),
            active: 0,
            completed: 0,
            total_saved: Decimal::ZERO,
            total_target: Decimal::ZERO,
            percent_complete: None,
            missing_rates: BTreeSet::new(),
        };
        assert!(summary.display_summary().contains("N/A"));
    }

    #[test]
    fn test_summary_rounds_half_away_from_zero() {
        let summary = GoalSummary {
            currency: "USD".to_string(),
            active: 1,
            completed: 0,
            total_saved: dec!(49),
            total_target: dec!(400),
            percent_complete: Some(dec!(12.25)),
            missing_rates: BTreeSet::new(),
        };
        assert!(summary.display_summary().ends_with("12.3%"));
    }
}
