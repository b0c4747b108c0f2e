//! Canonical ledger types: the narrow schema every consumer reads.

use std::fmt;

use chrono::NaiveDateTime;
use serde::{Serialize, Serializer};

/// Category tag of a canonical ledger entry.
///
/// Plain `Transfer` never appears here: the splitter expands every transfer
/// into a `TransferIn`/`TransferOut` pair. Labels that match none of the
/// four known natures pass through verbatim as `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Nature {
    Income,
    Expense,
    TransferIn,
    TransferOut,
    Other(String),
}

impl Nature {
    /// Parse a raw label, trimming whitespace and ignoring case for the
    /// known natures. Unknown labels are kept as-is (trimmed).
    pub fn parse(label: &str) -> Nature {
        let trimmed = label.trim();
        if trimmed.eq_ignore_ascii_case("Income") {
            Nature::Income
        } else if trimmed.eq_ignore_ascii_case("Expense") {
            Nature::Expense
        } else if trimmed.eq_ignore_ascii_case("Transfer-In") {
            Nature::TransferIn
        } else if trimmed.eq_ignore_ascii_case("Transfer-Out") {
            Nature::TransferOut
        } else {
            Nature::Other(trimmed.to_string())
        }
    }

    /// Canonical display label.
    pub fn as_label(&self) -> &str {
        match self {
            Nature::Income => "Income",
            Nature::Expense => "Expense",
            Nature::TransferIn => "Transfer-In",
            Nature::TransferOut => "Transfer-Out",
            Nature::Other(label) => label,
        }
    }
}

impl fmt::Display for Nature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_label())
    }
}

impl Serialize for Nature {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_label())
    }
}

/// One normalized, signed transaction in the canonical narrow schema.
///
/// Sign convention: Income and Transfer-In are positive, Expense and
/// Transfer-Out are negative. Entries are immutable once the pipeline has
/// produced them; aggregate queries only read.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LedgerEntry {
    /// Null when the raw value did not parse as a date-time.
    pub timestamp: Option<NaiveDateTime>,
    /// Null when the raw label was absent.
    pub nature: Option<Nature>,
    /// Null when the raw value did not parse as a number; never silently
    /// zero.
    pub amount: Option<f64>,
    /// The "other side" of the transaction.
    pub account: Option<String>,
    /// The originating account or bucket.
    pub source: Option<String>,
    /// Never null; empty string is the default.
    pub description: String,
}

impl LedgerEntry {
    /// True for negative-amount entries.
    pub fn is_outflow(&self) -> bool {
        self.amount.is_some_and(|a| a < 0.0)
    }

    /// True for positive-amount entries.
    pub fn is_inflow(&self) -> bool {
        self.amount.is_some_and(|a| a > 0.0)
    }

    /// Absolute amount, zero when the amount is null.
    pub fn abs_amount(&self) -> f64 {
        self.amount.map_or(0.0, f64::abs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_labels() {
        assert_eq!(Nature::parse("Income"), Nature::Income);
        assert_eq!(Nature::parse("  expense "), Nature::Expense);
        assert_eq!(Nature::parse("transfer-in"), Nature::TransferIn);
        assert_eq!(Nature::parse("Transfer-Out"), Nature::TransferOut);
    }

    #[test]
    fn test_parse_unknown_label_passes_through() {
        assert_eq!(
            Nature::parse(" Adjustment "),
            Nature::Other("Adjustment".to_string())
        );
    }

    #[test]
    fn test_labels_round_trip() {
        assert_eq!(Nature::TransferOut.as_label(), "Transfer-Out");
        assert_eq!(Nature::parse(Nature::TransferIn.as_label()), Nature::TransferIn);
    }

    #[test]
    fn test_serializes_as_canonical_label() {
        let json = serde_json::to_string(&Nature::TransferIn).unwrap();
        assert_eq!(json, "\"Transfer-In\"");
    }

    #[test]
    fn test_entry_flow_helpers() {
        let entry = LedgerEntry {
            timestamp: None,
            nature: Some(Nature::Expense),
            amount: Some(-42.0),
            account: None,
            source: None,
            description: String::new(),
        };
        assert!(entry.is_outflow());
        assert!(!entry.is_inflow());
        assert_eq!(entry.abs_amount(), 42.0);
    }
}
