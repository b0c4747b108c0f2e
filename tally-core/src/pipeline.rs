//! Normalization pipeline: wide raw records in, canonical ledger out.
//!
//! Stages run in a fixed order, each a pure function:
//! sign normalization, column coalescing, transfer splitting, type
//! enforcement, final sort. Malformed cell contents never fail the
//! pipeline; they coerce to null and the ledger completes.

use chrono::{NaiveDate, NaiveDateTime};

use crate::cell::Cell;
use crate::ledger::{LedgerEntry, Nature};
use crate::record::RawRecord;

/// One row after the column families have been collapsed. Still untyped;
/// the amount may hold text and the timestamp is raw.
#[derive(Debug, Clone, PartialEq)]
pub struct CoalescedRow {
    pub timestamp: Option<String>,
    pub nature: Option<String>,
    pub amount: Option<Cell>,
    pub account: Option<String>,
    pub source: Option<String>,
    pub description: Option<String>,
}

/// Negate the Expense and Transfer-Out amount slots in place, before
/// coalescing. A plain Transfer row's amount lives in a different slot and
/// stays unsigned here; the splitter resolves the outbound leg's sign.
pub fn normalize_signs(record: &mut RawRecord) {
    if let Some(cell) = record.amounts.expense.take() {
        record.amounts.expense = Some(cell.negated());
    }
    if let Some(cell) = record.amounts.transfer_out.take() {
        record.amounts.transfer_out = Some(cell.negated());
    }
}

/// Collapse each column family to its first populated slot. The family
/// columns are consumed; only the unified fields survive.
pub fn coalesce(record: RawRecord) -> CoalescedRow {
    CoalescedRow {
        timestamp: record.timestamp,
        nature: record.nature,
        amount: record.amounts.coalesce(),
        account: record.accounts.coalesce(),
        source: record.sources.coalesce(),
        description: record.notes.coalesce(),
    }
}

/// Transfer test: trimmed, case-insensitive match against "Transfer".
/// Null labels fail the test and pass through as non-transfer rows.
fn is_transfer(nature: Option<&str>) -> bool {
    nature.is_some_and(|label| label.trim().eq_ignore_ascii_case("Transfer"))
}

/// Expand every Transfer row into two balanced legs; everything else
/// passes through unchanged.
///
/// The out leg negates the amount and swaps source/account; the in leg
/// keeps both. The legs' amounts sum to exactly zero, so the output holds
/// `non_transfer + 2 * transfer` rows. Output order is not significant;
/// the finalize stage re-sorts.
pub fn split_transfers(rows: Vec<CoalescedRow>) -> Vec<CoalescedRow> {
    let mut out = Vec::with_capacity(rows.len());

    for row in rows {
        if !is_transfer(row.nature.as_deref()) {
            out.push(row);
            continue;
        }

        let mut outbound = row.clone();
        outbound.amount = outbound.amount.map(Cell::negated);
        std::mem::swap(&mut outbound.source, &mut outbound.account);
        outbound.nature = Some(Nature::TransferOut.as_label().to_string());

        let mut inbound = row;
        inbound.nature = Some(Nature::TransferIn.as_label().to_string());

        out.push(outbound);
        out.push(inbound);
    }

    out
}

/// Timestamp formats accepted from the export, tried in order.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y"];

fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let trimmed = raw.trim();
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Some(dt);
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(trimmed, fmt) {
            return d.and_hms_opt(0, 0, 0);
        }
    }
    None
}

/// Coerce a coalesced row to the canonical schema. Every coercion is
/// null-on-failure; the one non-null guarantee is the description, which
/// defaults to the empty string.
pub fn enforce_types(row: CoalescedRow) -> LedgerEntry {
    LedgerEntry {
        timestamp: row.timestamp.as_deref().and_then(parse_timestamp),
        nature: row.nature.as_deref().map(Nature::parse),
        amount: row.amount.as_ref().and_then(Cell::as_number),
        account: row.account,
        source: row.source,
        description: row.description.unwrap_or_default(),
    }
}

/// Sort ascending by timestamp, stable, nulls last.
pub fn finalize(entries: &mut [LedgerEntry]) {
    entries.sort_by_key(|e| (e.timestamp.is_none(), e.timestamp));
}

/// Run the whole pipeline. Pure and deterministic: identical input always
/// yields an identical ledger.
pub fn run(records: Vec<RawRecord>) -> Vec<LedgerEntry> {
    let coalesced: Vec<CoalescedRow> = records
        .into_iter()
        .map(|mut record| {
            normalize_signs(&mut record);
            coalesce(record)
        })
        .collect();

    let mut entries: Vec<LedgerEntry> = split_transfers(coalesced)
        .into_iter()
        .map(enforce_types)
        .collect();

    finalize(&mut entries);
    entries
}
