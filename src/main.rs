use anyhow::Result;
use clap::builder::RangedU64ValueParser;
use clap::{CommandFactory, Parser, Subcommand};
use finboard::cli::setup::setup;
use finboard::core::log::init_logging;
use rust_decimal::Decimal;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

impl From<Commands> for finboard::AppCommand {
    fn from(cmd: Commands) -> finboard::AppCommand {
        match cmd {
            Commands::Stats => finboard::AppCommand::Stats,
            Commands::Trends { months } => finboard::AppCommand::Trends { months },
            Commands::Budgets => finboard::AppCommand::Budgets,
            Commands::Goals => finboard::AppCommand::Goals,
            Commands::Rate { from, to, amount } => finboard::AppCommand::Rate { from, to, amount },
            Commands::ClearCache => finboard::AppCommand::ClearCache,
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration and an example ledger
    Setup,
    /// Display net worth and this month's cash flow
    Stats,
    /// Display income and expenses for recent months
    Trends {
        /// Number of months to show, including the current one
        #[arg(
            short,
            long,
            default_value_t = finboard::DEFAULT_TREND_MONTHS,
            value_parser = RangedU64ValueParser::<usize>::new().range(1..=finboard::MAX_TREND_MONTHS as u64),
        )]
        months: usize,
    },
    /// Display budget utilization for the current month
    Budgets,
    /// Display progress towards savings goals
    Goals,
    /// Look up an exchange rate
    Rate {
        from: String,
        to: String,
        /// Convert this amount at the rate
        #[arg(short, long)]
        amount: Option<Decimal>,
    },
    /// Remove cached exchange rates
    ClearCache,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => match cli.config_path.as_deref() {
            Some(path) => finboard::cli::setup::setup_at_path(path),
            None => setup(),
        },
        Some(cmd) => finboard::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trend_months(args: &[&str]) -> Result<usize, clap::Error> {
        let mut argv = vec!["finboard", "trends"];
        argv.extend_from_slice(args);
        let cli = Cli::try_parse_from(argv)?;
        match cli.command {
            Some(Commands::Trends { months }) => Ok(months),
            _ => unreachable!("parsed a trends command"),
        }
    }

    #[test]
    fn test_trend_months_default_and_limit() {
        assert_eq!(trend_months(&[]).unwrap(), finboard::DEFAULT_TREND_MONTHS);
        assert_eq!(trend_months(&["-m", "120"]).unwrap(), 120);
    }

    #[test]
    fn test_trend_months_out_of_range_rejected() {
        assert!(trend_months(&["-m", "121"]).is_err());
        assert!(trend_months(&["-m", "0"]).is_err());
        assert!(trend_months(&["--months", "100000"]).is_err());
    }
}
