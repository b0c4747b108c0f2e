//! tally-core: canonical ledger types, the normalization pipeline, and
//! read-only aggregate queries.

pub mod aggregate;
pub mod cell;
pub mod ledger;
pub mod pipeline;
pub mod quality;
pub mod record;

pub use aggregate::{
    BalancePoint, LedgerSummary, OTHERS_LABEL, PeriodTotal, SourceTotal, balance_by_account,
    compare_top_by_source, monthly_profit_and_loss, parse_period, running_balance, summarize,
    top_by_source,
};
pub use cell::Cell;
pub use ledger::{LedgerEntry, Nature};
pub use pipeline::{CoalescedRow, run};
pub use quality::{QualityReport, scan};
pub use record::{Family, RawRecord};
