//! Untyped spreadsheet cells as they arrive from the wide export.
//!
//! Exports mix numbers and free text in the same columns, so a cell keeps
//! whatever it held until the typing pass at the end of the pipeline. This
//! matters for coalescing: a malformed amount is still a *populated* cell
//! and must win its priority slot before it coerces to null.

use serde::{Deserialize, Serialize};

/// One raw cell from the export: a number if the text parsed as one,
/// otherwise the text itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Cell {
    Number(f64),
    Text(String),
}

impl Cell {
    /// Build a cell from raw CSV text. Blank cells are absent, not empty.
    pub fn from_raw(raw: &str) -> Option<Cell> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        match trimmed.parse::<f64>() {
            Ok(n) => Some(Cell::Number(n)),
            Err(_) => Some(Cell::Text(trimmed.to_string())),
        }
    }

    /// Numeric view of the cell. Text that parses as a number counts;
    /// anything else is null (coerce-on-failure, never an error).
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number(n) => Some(*n),
            Cell::Text(s) => s.trim().parse().ok(),
        }
    }

    /// Flip the sign of a numeric cell. Text that parses as a number is
    /// flipped numerically; other text passes through unchanged and will
    /// coerce to null in the typing pass.
    pub fn negated(self) -> Cell {
        match self {
            Cell::Number(n) => Cell::Number(-n),
            Cell::Text(s) => match s.trim().parse::<f64>() {
                Ok(n) => Cell::Number(-n),
                Err(_) => Cell::Text(s),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_raw_blank_is_none() {
        assert_eq!(Cell::from_raw(""), None);
        assert_eq!(Cell::from_raw("   "), None);
    }

    #[test]
    fn test_from_raw_parses_numbers() {
        assert_eq!(Cell::from_raw("150.0"), Some(Cell::Number(150.0)));
        assert_eq!(Cell::from_raw(" -12.5 "), Some(Cell::Number(-12.5)));
        assert_eq!(
            Cell::from_raw("oops"),
            Some(Cell::Text("oops".to_string()))
        );
    }

    #[test]
    fn test_negated_flips_numbers_only() {
        assert_eq!(Cell::Number(150.0).negated(), Cell::Number(-150.0));
        assert_eq!(Cell::Text("80".into()).negated(), Cell::Number(-80.0));
        assert_eq!(
            Cell::Text("oops".to_string()).negated(),
            Cell::Text("oops".to_string())
        );
    }

    #[test]
    fn test_as_number_coerces() {
        assert_eq!(Cell::Number(3.0).as_number(), Some(3.0));
        assert_eq!(Cell::Text("3.5".into()).as_number(), Some(3.5));
        assert_eq!(Cell::Text("not-a-number".into()).as_number(), None);
    }
}
