use super::ui;
use crate::core::Dashboard;
use crate::core::trends::TrendSeries;
use anyhow::Result;
use chrono::{DateTime, Utc};
use comfy_table::Cell;
use indicatif::ProgressBar;
use rust_decimal::Decimal;

impl TrendSeries {
    pub fn display_as_table(&self) -> String {
        let mut table = ui::new_styled_table();
        table.set_header(vec![
            ui::header_cell("Month"),
            ui::header_cell(&format!("Income ({})", self.currency)),
            ui::header_cell(&format!("Expenses ({})", self.currency)),
            ui::header_cell(&format!("Net ({})", self.currency)),
        ]);

        for month in &self.months {
            table.add_row(vec![
                Cell::new(&month.label),
                ui::money_cell(month.income),
                ui::money_cell(month.expenses),
                ui::signed_cell(month.net),
            ]);
        }

        let total_net: Decimal = self.months.iter().map(|m| m.net).sum();
        let mut output = format!(
            "{}\n\n{}\n\nNet over {} months ({}): {}",
            ui::style_text("Monthly Trend", ui::StyleType::Title),
            table,
            self.months.len(),
            ui::style_text(&self.currency, ui::StyleType::TotalLabel),
            ui::style_text(&ui::format_money(total_net), ui::StyleType::TotalValue)
        );
        if let Some(note) = ui::partial_note(&self.missing_rates) {
            output.push_str(&format!("\n\n{note}"));
        }
        output
    }
}

pub async fn run(
    dashboard: &Dashboard,
    progress: &ProgressBar,
    now: DateTime<Utc>,
    months: usize,
) -> Result<()> {
    let series = dashboard.get_monthly_trends(now, months).await;
    progress.finish_and_clear();
    println!("{}", series?.display_as_table());
    Ok(())
}
