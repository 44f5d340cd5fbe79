use super::ui;
use crate::core::Dashboard;
use crate::core::stats::DashboardStats;
use anyhow::Result;
use chrono::{DateTime, Utc};
use comfy_table::Cell;
use indicatif::ProgressBar;

impl DashboardStats {
    pub fn display_as_table(&self) -> String {
        let mut table = ui::new_styled_table();
        table.set_header(vec![
            ui::header_cell("Metric"),
            ui::header_cell(&format!("Value ({})", self.currency)),
        ]);

        table.add_row(vec![Cell::new("Net worth"), ui::signed_cell(self.net_worth)]);
        table.add_row(vec![
            Cell::new("Income this month"),
            ui::money_cell(self.monthly_income),
        ]);
        table.add_row(vec![
            Cell::new("Expenses this month"),
            ui::money_cell(self.monthly_expenses),
        ]);
        table.add_row(vec![
            Cell::new("Savings this month"),
            ui::signed_cell(self.monthly_savings),
        ]);
        table.add_row(vec![Cell::new("Savings rate"), ui::percent_cell(self.savings_rate())]);
        table.add_row(vec![
            Cell::new(format!("Pending invoices ({})", self.pending_invoices)),
            ui::money_cell(self.pending_invoice_amount),
        ]);
        table.add_row(vec![
            Cell::new("Owed on credit cards"),
            ui::money_cell(self.pending_cc_balance),
        ]);

        let mut output = format!(
            "{}\n\n{}",
            ui::style_text("Dashboard", ui::StyleType::Title),
            table
        );
        if let Some(note) = ui::partial_note(&self.missing_rates) {
            output.push_str(&format!("\n\n{note}"));
        }
        output
    }
}

pub async fn run(dashboard: &Dashboard, progress: &ProgressBar, now: DateTime<Utc>) -> Result<()> {
    let stats = dashboard.get_dashboard_stats(now).await;
    progress.finish_and_clear();
    println!("{}", stats?.display_as_table());
    Ok(())
}
