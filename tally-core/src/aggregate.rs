//! Read-only aggregate queries over the canonical ledger.
//!
//! Every query is a pure read: null amounts contribute nothing to sums,
//! and rows with a null grouping key are excluded from that grouping.

use std::collections::{BTreeMap, BTreeSet};

use anyhow::{Result, bail};
use chrono::Datelike;

use crate::ledger::{LedgerEntry, Nature};

/// Label of the collapsed remainder bucket in top-N groupings.
pub const OTHERS_LABEL: &str = "Others";

fn in_month(entry: &LedgerEntry, month: u32, year: i32) -> bool {
    entry
        .timestamp
        .is_some_and(|ts| ts.year() == year && ts.month() == month)
}

/// Monthly profit and loss: entries in the given calendar month, grouped
/// by (nature, account) and summed.
///
/// The result covers the full grid of natures observed anywhere in the
/// ledger crossed with accounts observed in the month; absent combinations
/// carry an explicit 0.0 instead of being omitted, so a month with income
/// but no expenses still shows every account's zero expense line.
pub fn monthly_profit_and_loss(
    entries: &[LedgerEntry],
    month: u32,
    year: i32,
) -> BTreeMap<(Nature, String), f64> {
    let natures: BTreeSet<Nature> = entries.iter().filter_map(|e| e.nature.clone()).collect();

    let in_scope: Vec<&LedgerEntry> = entries
        .iter()
        .filter(|e| in_month(e, month, year))
        .collect();

    let accounts: BTreeSet<String> = in_scope
        .iter()
        .filter_map(|e| e.account.clone())
        .collect();

    let mut pnl: BTreeMap<(Nature, String), f64> = natures
        .iter()
        .flat_map(|n| accounts.iter().map(|a| ((n.clone(), a.clone()), 0.0)))
        .collect();

    for entry in in_scope {
        let (Some(nature), Some(account)) = (&entry.nature, &entry.account) else {
            continue;
        };
        let Some(amount) = entry.amount else {
            continue;
        };
        *pnl.entry((nature.clone(), account.clone())).or_insert(0.0) += amount;
    }

    pnl
}

/// One source's total in a top-N grouping.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceTotal {
    pub source: String,
    pub amount: f64,
}

/// Group a pre-filtered set of entries by source, take the absolute value
/// of each group's sum, and sort descending. The first `top_n` groups are
/// kept verbatim; the remainder collapses into one "Others" row, emitted
/// only when its sum is strictly positive.
pub fn top_by_source(entries: &[LedgerEntry], top_n: usize) -> Vec<SourceTotal> {
    let mut sums: BTreeMap<String, f64> = BTreeMap::new();
    for entry in entries {
        let Some(source) = &entry.source else {
            continue;
        };
        let Some(amount) = entry.amount else {
            continue;
        };
        *sums.entry(source.clone()).or_insert(0.0) += amount;
    }

    let mut totals: Vec<SourceTotal> = sums
        .into_iter()
        .map(|(source, sum)| SourceTotal {
            source,
            amount: sum.abs(),
        })
        .collect();

    // Descending by amount; ties resolved by name so output is stable.
    totals.sort_by(|a, b| {
        b.amount
            .total_cmp(&a.amount)
            .then_with(|| a.source.cmp(&b.source))
    });

    let others_sum: f64 = totals.iter().skip(top_n).map(|t| t.amount).sum();
    totals.truncate(top_n);
    if others_sum > 0.0 {
        totals.push(SourceTotal {
            source: OTHERS_LABEL.to_string(),
            amount: others_sum,
        });
    }

    totals
}

/// One source's total within a labeled period, for multi-period comparison.
#[derive(Debug, Clone, PartialEq)]
pub struct PeriodTotal {
    /// "YYYY-MM" display label.
    pub period: String,
    pub source: String,
    pub amount: f64,
}

/// Top-N expense comparison across calendar months: for each (year, month)
/// period, filter to that month's Expense rows, apply the same top-N
/// collapse, and tag the rows with the period label.
pub fn compare_top_by_source(
    entries: &[LedgerEntry],
    periods: &[(i32, u32)],
    top_n: usize,
) -> Vec<PeriodTotal> {
    let mut out = Vec::new();

    for &(year, month) in periods {
        let expenses: Vec<LedgerEntry> = entries
            .iter()
            .filter(|e| e.nature == Some(Nature::Expense) && in_month(e, month, year))
            .cloned()
            .collect();

        let label = format!("{year}-{month:02}");
        for total in top_by_source(&expenses, top_n) {
            out.push(PeriodTotal {
                period: label.clone(),
                source: total.source,
                amount: total.amount,
            });
        }
    }

    out
}

/// Parse a "YYYY-MM" period label into (year, month).
pub fn parse_period(label: &str) -> Result<(i32, u32)> {
    let Some((year, month)) = label.trim().split_once('-') else {
        bail!("invalid period '{label}' (expected YYYY-MM)");
    };
    let year: i32 = year
        .parse()
        .map_err(|_| anyhow::anyhow!("invalid year in period '{label}'"))?;
    let month: u32 = month
        .parse()
        .map_err(|_| anyhow::anyhow!("invalid month in period '{label}'"))?;
    if !(1..=12).contains(&month) {
        bail!("month out of range in period '{label}'");
    }
    Ok((year, month))
}

/// Headline figures for a ledger.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerSummary {
    /// Signed total per nature.
    pub totals: BTreeMap<Nature, f64>,
    /// Income + Expense (expenses are negative, so this is the net).
    pub net_flow: f64,
    /// Transfer-In + Transfer-Out; zero for a consistent ledger.
    pub transfer_imbalance: f64,
    /// |Expense / Income|; 0.0 when there is no income.
    pub expense_ratio: f64,
}

/// Compute the headline figures in one pass.
pub fn summarize(entries: &[LedgerEntry]) -> LedgerSummary {
    let mut totals: BTreeMap<Nature, f64> = BTreeMap::new();
    for entry in entries {
        let (Some(nature), Some(amount)) = (&entry.nature, entry.amount) else {
            continue;
        };
        *totals.entry(nature.clone()).or_insert(0.0) += amount;
    }

    let get = |n: &Nature| totals.get(n).copied().unwrap_or(0.0);
    let income = get(&Nature::Income);
    let expense = get(&Nature::Expense);
    let net_flow = income + expense;
    let transfer_imbalance = get(&Nature::TransferIn) + get(&Nature::TransferOut);
    let expense_ratio = if income == 0.0 {
        0.0
    } else {
        (expense / income).abs()
    };

    LedgerSummary {
        totals,
        net_flow,
        transfer_imbalance,
        expense_ratio,
    }
}

/// Net balance per account across the whole ledger.
pub fn balance_by_account(entries: &[LedgerEntry]) -> BTreeMap<String, f64> {
    let mut balances: BTreeMap<String, f64> = BTreeMap::new();
    for entry in entries {
        let (Some(account), Some(amount)) = (&entry.account, entry.amount) else {
            continue;
        };
        *balances.entry(account.clone()).or_insert(0.0) += amount;
    }
    balances
}

/// One point of an account's running balance.
#[derive(Debug, Clone, PartialEq)]
pub struct BalancePoint {
    pub timestamp: chrono::NaiveDateTime,
    pub account: String,
    pub balance: f64,
}

/// Per-account cumulative balance in timestamp order. Entries without a
/// timestamp, account, or amount carry no balance information and are
/// skipped.
pub fn running_balance(entries: &[LedgerEntry]) -> Vec<BalancePoint> {
    let mut dated: Vec<(&String, chrono::NaiveDateTime, f64)> = entries
        .iter()
        .filter_map(|e| match (&e.account, e.timestamp, e.amount) {
            (Some(account), Some(ts), Some(amount)) => Some((account, ts, amount)),
            _ => None,
        })
        .collect();
    dated.sort_by(|a, b| a.0.cmp(b.0).then(a.1.cmp(&b.1)));

    let mut points = Vec::with_capacity(dated.len());
    let mut current: Option<(&String, f64)> = None;
    for (account, ts, amount) in dated {
        let balance = match current {
            Some((prev, sum)) if prev == account => sum + amount,
            _ => amount,
        };
        current = Some((account, balance));
        points.push(BalancePoint {
            timestamp: ts,
            account: account.clone(),
            balance,
        });
    }
    points
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn entry(
        date: (i32, u32, u32),
        nature: Nature,
        amount: f64,
        source: &str,
        account: &str,
    ) -> LedgerEntry {
        LedgerEntry {
            timestamp: NaiveDate::from_ymd_opt(date.0, date.1, date.2)
                .unwrap()
                .and_hms_opt(12, 0, 0),
            nature: Some(nature),
            amount: Some(amount),
            account: Some(account.to_string()),
            source: Some(source.to_string()),
            description: String::new(),
        }
    }

    fn expense(date: (i32, u32, u32), amount: f64, source: &str) -> LedgerEntry {
        entry(date, Nature::Expense, amount, source, "Checking")
    }

    #[test]
    fn test_top_n_collapse() {
        let entries: Vec<LedgerEntry> = [
            ("Rent", -100.0),
            ("Food", -80.0),
            ("Travel", -60.0),
            ("Books", -40.0),
            ("Misc", -20.0),
        ]
        .iter()
        .map(|(source, amount)| expense((2025, 11, 5), *amount, source))
        .collect();

        let top = top_by_source(&entries, 3);
        assert_eq!(top.len(), 4);
        assert_eq!(top[0].amount, 100.0);
        assert_eq!(top[1].amount, 80.0);
        assert_eq!(top[2].amount, 60.0);
        assert_eq!(top[3].source, OTHERS_LABEL);
        assert_eq!(top[3].amount, 60.0);
    }

    #[test]
    fn test_top_n_covers_all_no_others() {
        let entries: Vec<LedgerEntry> = [("Rent", -100.0), ("Food", -80.0)]
            .iter()
            .map(|(source, amount)| expense((2025, 11, 5), *amount, source))
            .collect();

        let top = top_by_source(&entries, 5);
        assert_eq!(top.len(), 2);
        assert!(top.iter().all(|t| t.source != OTHERS_LABEL));
    }

    #[test]
    fn test_top_n_zero_remainder_no_others() {
        let entries = vec![
            expense((2025, 11, 5), -100.0, "Rent"),
            expense((2025, 11, 6), -50.0, "Food"),
            expense((2025, 11, 7), 50.0, "Food"),
        ];
        // Food nets to zero; the remainder sum is not strictly positive.
        let top = top_by_source(&entries, 1);
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].source, "Rent");
    }

    #[test]
    fn test_top_n_skips_null_keys_and_amounts() {
        let mut no_source = expense((2025, 11, 5), -10.0, "X");
        no_source.source = None;
        let mut no_amount = expense((2025, 11, 5), -10.0, "Rent");
        no_amount.amount = None;

        let top = top_by_source(&[no_source, no_amount], 5);
        // The null-amount row still names its source, at zero.
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].source, "Rent");
        assert_eq!(top[0].amount, 0.0);
    }

    #[test]
    fn test_monthly_pnl_grid_completeness() {
        let entries = vec![
            entry((2025, 11, 3), Nature::Income, 2000.0, "Employer", "Salary"),
            entry((2025, 11, 9), Nature::Income, 100.0, "Side gig", "Freelance"),
            // Expense exists in the ledger, but not in November.
            entry((2025, 10, 2), Nature::Expense, -75.0, "Checking", "Groceries"),
        ];

        let pnl = monthly_profit_and_loss(&entries, 11, 2025);

        assert_eq!(pnl[&(Nature::Income, "Salary".to_string())], 2000.0);
        assert_eq!(pnl[&(Nature::Income, "Freelance".to_string())], 100.0);
        // Zero expense lines appear explicitly for every account in month.
        assert_eq!(pnl[&(Nature::Expense, "Salary".to_string())], 0.0);
        assert_eq!(pnl[&(Nature::Expense, "Freelance".to_string())], 0.0);
        // October's account is not part of November's grid.
        assert!(!pnl.contains_key(&(Nature::Expense, "Groceries".to_string())));
    }

    #[test]
    fn test_monthly_pnl_filters_by_month() {
        let entries = vec![
            entry((2025, 11, 3), Nature::Income, 2000.0, "Employer", "Salary"),
            entry((2025, 12, 3), Nature::Income, 3000.0, "Employer", "Salary"),
        ];
        let pnl = monthly_profit_and_loss(&entries, 11, 2025);
        assert_eq!(pnl[&(Nature::Income, "Salary".to_string())], 2000.0);
    }

    #[test]
    fn test_compare_tags_periods_independently() {
        let entries = vec![
            expense((2025, 11, 5), -100.0, "Rent"),
            expense((2025, 11, 6), -30.0, "Food"),
            expense((2025, 12, 5), -120.0, "Rent"),
        ];

        let rows = compare_top_by_source(&entries, &[(2025, 11), (2025, 12)], 5);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].period, "2025-11");
        assert_eq!(rows[0].source, "Rent");
        assert_eq!(rows[0].amount, 100.0);
        assert_eq!(rows[2].period, "2025-12");
        assert_eq!(rows[2].amount, 120.0);
    }

    #[test]
    fn test_parse_period() {
        assert_eq!(parse_period("2025-11").unwrap(), (2025, 11));
        assert_eq!(parse_period(" 2025-01 ").unwrap(), (2025, 1));
        assert!(parse_period("2025-13").is_err());
        assert!(parse_period("November").is_err());
    }

    #[test]
    fn test_summarize_kpis() {
        let entries = vec![
            entry((2025, 11, 1), Nature::Income, 1000.0, "Employer", "Salary"),
            expense((2025, 11, 2), -300.0, "Rent"),
            entry((2025, 11, 3), Nature::TransferOut, -200.0, "Savings", "Checking"),
            entry((2025, 11, 3), Nature::TransferIn, 200.0, "Checking", "Savings"),
        ];

        let summary = summarize(&entries);
        assert_eq!(summary.net_flow, 700.0);
        assert_eq!(summary.transfer_imbalance, 0.0);
        assert_eq!(summary.expense_ratio, 0.3);
    }

    #[test]
    fn test_summarize_no_income_ratio_zero() {
        let entries = vec![expense((2025, 11, 2), -300.0, "Rent")];
        assert_eq!(summarize(&entries).expense_ratio, 0.0);
    }

    #[test]
    fn test_balance_by_account() {
        let entries = vec![
            entry((2025, 11, 1), Nature::Income, 1000.0, "Employer", "Checking"),
            entry((2025, 11, 2), Nature::Expense, -300.0, "Rent", "Checking"),
            entry((2025, 11, 3), Nature::TransferIn, 200.0, "Checking", "Savings"),
        ];
        let balances = balance_by_account(&entries);
        assert_eq!(balances["Checking"], 700.0);
        assert_eq!(balances["Savings"], 200.0);
    }

    #[test]
    fn test_running_balance_cumulates_per_account() {
        let entries = vec![
            entry((2025, 11, 1), Nature::Income, 1000.0, "Employer", "Checking"),
            entry((2025, 11, 2), Nature::Expense, -300.0, "Rent", "Checking"),
            entry((2025, 11, 3), Nature::TransferIn, 200.0, "Checking", "Savings"),
        ];
        let points = running_balance(&entries);
        assert_eq!(points.len(), 3);
        // BTree-style account order: Checking first, then Savings.
        assert_eq!(points[0].balance, 1000.0);
        assert_eq!(points[1].balance, 700.0);
        assert_eq!(points[2].account, "Savings");
        assert_eq!(points[2].balance, 200.0);
    }
}
