use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};

use tally_core::ledger::{LedgerEntry, Nature};
use tally_core::{aggregate, pipeline, quality};
use tally_ingest::load_wide_csv;

mod config;

#[derive(Parser, Debug)]
#[command(name = "tally", version, about = "Canonical ledger reports from a wide transaction export")]
struct Cli {
    /// Path to the wide CSV export (overrides the config file)
    #[arg(long, global = true)]
    csv: Option<PathBuf>,

    /// Path to the config file (default: ./tally.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Headline figures: net flow, transfer imbalance, expense ratio
    Summary,

    /// Monthly profit and loss, grouped by (nature, account)
    Pnl {
        #[arg(long)]
        month: u32,

        #[arg(long)]
        year: i32,
    },

    /// Top expense sources with an Others collapse
    Top {
        /// Groups to keep before collapsing (default from config)
        #[arg(long)]
        n: Option<usize>,

        /// Restrict to one calendar month (YYYY-MM)
        #[arg(long)]
        period: Option<String>,
    },

    /// Compare top expense sources across calendar months
    Compare {
        /// Periods to compare, as YYYY-MM (repeatable)
        #[arg(long = "period", required = true)]
        periods: Vec<String>,

        #[arg(long)]
        n: Option<usize>,
    },

    /// Net balance per account
    Balances,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = config::load_config(cli.config.as_deref())?;

    let csv_path = cli
        .csv
        .or(config.data.csv_path.clone())
        .unwrap_or_else(|| PathBuf::from("export.csv"));
    if !csv_path.exists() {
        bail!("CSV not found: {} (pass --csv <path>)", csv_path.display());
    }

    let records = load_wide_csv(&csv_path)
        .with_context(|| format!("loading {}", csv_path.display()))?;
    let ledger = pipeline::run(records);

    let report = quality::scan(&ledger);
    if !report.is_clean() {
        eprintln!(
            "warning: ledger has degraded cells ({} rows; null timestamps: {}, null amounts: {}, missing accounts: {}, missing sources: {})",
            report.rows,
            report.null_timestamps,
            report.null_amounts,
            report.missing_accounts,
            report.missing_sources
        );
    }

    match cli.command {
        Command::Summary => print_summary(&ledger),

        Command::Pnl { month, year } => print_pnl(&ledger, month, year),

        Command::Top { n, period } => {
            let n = n.unwrap_or(config.report.top_n);
            print_top(&ledger, n, period.as_deref())?;
        }

        Command::Compare { periods, n } => {
            let n = n.unwrap_or(config.report.top_n);
            print_compare(&ledger, &periods, n)?;
        }

        Command::Balances => print_balances(&ledger),
    }

    Ok(())
}

fn print_summary(ledger: &[LedgerEntry]) {
    let summary = aggregate::summarize(ledger);

    println!("Ledger: {} entries", ledger.len());
    println!();
    for (nature, total) in &summary.totals {
        println!("{:<14} {:>12.2}", nature.to_string(), total);
    }
    println!();
    println!("Net flow:           {:>12.2}", summary.net_flow);
    println!("Transfer imbalance: {:>12.2}", summary.transfer_imbalance);
    println!("Expense ratio:      {:>11.1}%", summary.expense_ratio * 100.0);
}

fn print_pnl(ledger: &[LedgerEntry], month: u32, year: i32) {
    let pnl = aggregate::monthly_profit_and_loss(ledger, month, year);

    println!("P&L for {year}-{month:02}");
    println!();
    for ((nature, account), amount) in &pnl {
        println!("{:<14} {:<24} {:>12.2}", nature.to_string(), account, amount);
    }
}

fn print_top(ledger: &[LedgerEntry], n: usize, period: Option<&str>) -> Result<()> {
    let month = period.map(aggregate::parse_period).transpose()?;

    let expenses: Vec<LedgerEntry> = ledger
        .iter()
        .filter(|e| e.nature == Some(Nature::Expense))
        .filter(|e| match month {
            Some((year, month)) => e
                .timestamp
                .is_some_and(|ts| chrono_month(ts) == (year, month)),
            None => true,
        })
        .cloned()
        .collect();

    match period {
        Some(label) => println!("Top {n} expense sources for {label}"),
        None => println!("Top {n} expense sources"),
    }
    println!();
    for total in aggregate::top_by_source(&expenses, n) {
        println!("{:<24} {:>12.2}", total.source, total.amount);
    }
    Ok(())
}

fn print_compare(ledger: &[LedgerEntry], periods: &[String], n: usize) -> Result<()> {
    let periods: Vec<(i32, u32)> = periods
        .iter()
        .map(|p| aggregate::parse_period(p))
        .collect::<Result<_>>()?;

    println!("Expense comparison (top {n} per period)");
    println!();
    for row in aggregate::compare_top_by_source(ledger, &periods, n) {
        println!("{:<8} {:<24} {:>12.2}", row.period, row.source, row.amount);
    }
    Ok(())
}

fn print_balances(ledger: &[LedgerEntry]) {
    println!("Balance by account");
    println!();
    for (account, balance) in aggregate::balance_by_account(ledger) {
        println!("{:<24} {:>12.2}", account, balance);
    }
}

fn chrono_month(ts: chrono::NaiveDateTime) -> (i32, u32) {
    use chrono::Datelike;
    (ts.year(), ts.month())
}
