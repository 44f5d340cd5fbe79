use super::ui;
use crate::core::Dashboard;
use anyhow::{Result, bail};
use indicatif::ProgressBar;
use rust_decimal::Decimal;

pub fn format_rate(from: &str, to: &str, rate: Decimal, amount: Option<Decimal>) -> String {
    let mut output = format!(
        "1 {} = {} {}",
        from,
        ui::style_text(&rate.normalize().to_string(), ui::StyleType::TotalValue),
        to
    );
    if let Some(amount) = amount {
        output.push_str(&format!(
            "\n{} {} = {} {}",
            ui::format_money(amount),
            from,
            ui::style_text(
                &ui::format_money(Dashboard::convert(amount, rate)),
                ui::StyleType::TotalValue
            ),
            to
        ));
    }
    output
}

pub async fn run(
    dashboard: &Dashboard,
    progress: &ProgressBar,
    from: &str,
    to: &str,
    amount: Option<Decimal>,
) -> Result<()> {
    let from = from.to_uppercase();
    let to = to.to_uppercase();
    let rate = dashboard.get_rate(&from, &to).await;
    progress.finish_and_clear();

    let Some(rate) = rate else {
        bail!("No exchange rate available from {} to {}", from, to);
    };
    println!("{}", format_rate(&from, &to, rate, amount));
    Ok(())
}
