//! Data-quality scan over a finalized ledger.
//!
//! The pipeline degrades malformed cells to null instead of failing;
//! this scan makes that degradation visible so a caller can warn rather
//! than silently aggregate over holes.

use crate::ledger::LedgerEntry;

/// Null/missing counts for a ledger.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QualityReport {
    pub rows: usize,
    pub null_timestamps: usize,
    pub null_amounts: usize,
    pub missing_accounts: usize,
    pub missing_sources: usize,
}

impl QualityReport {
    /// True when no field degraded to null.
    pub fn is_clean(&self) -> bool {
        self.null_timestamps == 0
            && self.null_amounts == 0
            && self.missing_accounts == 0
            && self.missing_sources == 0
    }
}

/// Count degraded fields. Pure read; never fails.
pub fn scan(entries: &[LedgerEntry]) -> QualityReport {
    let mut report = QualityReport {
        rows: entries.len(),
        ..Default::default()
    };
    for entry in entries {
        if entry.timestamp.is_none() {
            report.null_timestamps += 1;
        }
        if entry.amount.is_none() {
            report.null_amounts += 1;
        }
        if entry.account.is_none() {
            report.missing_accounts += 1;
        }
        if entry.source.is_none() {
            report.missing_sources += 1;
        }
    }
    report
}
