//! Wide CSV export reader.
//!
//! The export carries one column set per transaction nature: each of the
//! four field families (amount, account, source, note) is split across
//! five columns, and a row populates the columns of its nature only.
//! Failure to read the file at all is fatal; blank or odd cell contents
//! are not (they flow through as missing/untyped values).

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result, bail};

use tally_core::cell::Cell;
use tally_core::record::{Family, RawRecord};

pub const TIMESTAMP_COL: &str = "Timestamp";
pub const NATURE_COL: &str = "Nature of Record";

/// Family columns in coalescing priority order.
///
/// Note the export's crossed naming for Expense and Transfer-Out: their
/// "Source" column belongs to the account family and vice versa.
const AMOUNT_COLS: [&str; 5] = [
    "Income Amount",
    "Expense Amount",
    "Transfer Amount",
    "Transfer-In Amount",
    "Transfer-Out Amount",
];

const ACCOUNT_COLS: [&str; 5] = [
    "Income Account",
    "Expense Source",
    "Transfer Account",
    "Transfer-In Account",
    "Transfer-Out Source",
];

const SOURCE_COLS: [&str; 5] = [
    "Income Source",
    "Expense Account",
    "Transfer Source",
    "Transfer-In Source",
    "Transfer-Out Account",
];

const NOTE_COLS: [&str; 5] = [
    "Income Note",
    "Expense Note",
    "Transfer Note",
    "Transfer-In Note",
    "Transfer-Out Note",
];

/// Load the wide export from a CSV file.
pub fn load_wide_csv(path: impl AsRef<Path>) -> Result<Vec<RawRecord>> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path.as_ref())
        .with_context(|| format!("opening {}", path.as_ref().display()))?;
    read_records(&mut rdr)
}

/// Parse the wide export from any reader (tests, stdin, ...).
pub fn parse_wide_csv<R: Read>(reader: R) -> Result<Vec<RawRecord>> {
    let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    read_records(&mut rdr)
}

fn read_records<R: Read>(rdr: &mut csv::Reader<R>) -> Result<Vec<RawRecord>> {
    let headers = rdr.headers().context("reading CSV header")?;
    let index: HashMap<String, usize> = headers
        .iter()
        .enumerate()
        .map(|(i, name)| (name.trim().to_string(), i))
        .collect();

    // Timestamp and nature are required; a family column missing from the
    // header just yields empty slots.
    for required in [TIMESTAMP_COL, NATURE_COL] {
        if !index.contains_key(required) {
            bail!("missing required column '{required}' in CSV header");
        }
    }

    let mut records = Vec::new();
    for result in rdr.records() {
        let record = result.context("reading CSV record")?;

        let get = |name: &str| -> Option<String> {
            let i = *index.get(name)?;
            let value = record.get(i)?.trim();
            (!value.is_empty()).then(|| value.to_string())
        };

        records.push(RawRecord {
            timestamp: get(TIMESTAMP_COL),
            nature: get(NATURE_COL),
            amounts: cell_family(&AMOUNT_COLS, &get),
            accounts: text_family(&ACCOUNT_COLS, &get),
            sources: text_family(&SOURCE_COLS, &get),
            notes: text_family(&NOTE_COLS, &get),
        });
    }

    Ok(records)
}

fn text_family(cols: &[&str; 5], get: &impl Fn(&str) -> Option<String>) -> Family<String> {
    Family {
        income: get(cols[0]),
        expense: get(cols[1]),
        transfer: get(cols[2]),
        transfer_in: get(cols[3]),
        transfer_out: get(cols[4]),
    }
}

fn cell_family(cols: &[&str; 5], get: &impl Fn(&str) -> Option<String>) -> Family<Cell> {
    Family {
        income: get(cols[0]).as_deref().and_then(Cell::from_raw),
        expense: get(cols[1]).as_deref().and_then(Cell::from_raw),
        transfer: get(cols[2]).as_deref().and_then(Cell::from_raw),
        transfer_in: get(cols[3]).as_deref().and_then(Cell::from_raw),
        transfer_out: get(cols[4]).as_deref().and_then(Cell::from_raw),
    }
}
