//! Wide-schema input records: one row per source transaction, with one
//! column family per field and one populated slot per family.

use serde::{Deserialize, Serialize};

use crate::cell::Cell;

/// One column family of the wide export: five mutually-exclusive slots,
/// one per transaction nature, in fixed coalescing priority order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Family<T> {
    pub income: Option<T>,
    pub expense: Option<T>,
    pub transfer: Option<T>,
    pub transfer_in: Option<T>,
    pub transfer_out: Option<T>,
}

// Not derived: the slots are all optional, so no `T: Default` bound is
// needed for an empty family.
impl<T> Default for Family<T> {
    fn default() -> Self {
        Self {
            income: None,
            expense: None,
            transfer: None,
            transfer_in: None,
            transfer_out: None,
        }
    }
}

impl<T> Family<T> {
    /// First populated slot in declaration order. An empty family yields
    /// None; that is missing data, not an error.
    pub fn coalesce(self) -> Option<T> {
        self.income
            .or(self.expense)
            .or(self.transfer)
            .or(self.transfer_in)
            .or(self.transfer_out)
    }
}

/// One row of the wide export, untyped. The input contract says at most one
/// slot per family is populated and it matches the row's nature label; the
/// pipeline does not enforce this, it coalesces by priority.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    /// Raw timestamp text, typed later.
    pub timestamp: Option<String>,
    /// Raw nature label, may carry incidental whitespace.
    pub nature: Option<String>,
    pub amounts: Family<Cell>,
    pub accounts: Family<String>,
    pub sources: Family<String>,
    pub notes: Family<String>,
}
