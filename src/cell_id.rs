//! Structural cell identifiers.
//!
//! A cell is addressed by its position in the rendered guide: 1-based table
//! index, row index (0 is the header row, data rows start at 1), and 0-based
//! column index. The textual form `table_<t>_row_<r>_col_<c>` doubles as a
//! DOM attribute value and as the key of the annotation mapping, so it must
//! round-trip through parse/format.

use std::fmt;
use std::str::FromStr;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::error::Error;

/// Structural `table/row/column` key for a table cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellId {
    /// 1-based table index.
    pub table: u32,
    /// Row index; 0 is the header row.
    pub row: u32,
    /// 0-based column index.
    pub col: u32,
}

impl CellId {
    pub fn new(table: u32, row: u32, col: u32) -> Self {
        Self { table, row, col }
    }
}

impl fmt::Display for CellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "table_{}_row_{}_col_{}", self.table, self.row, self.col)
    }
}

fn malformed(raw: &str) -> Error {
    Error::MalformedIdentifier {
        raw: raw.to_string(),
    }
}

impl FromStr for CellId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        let rest = s.strip_prefix("table_").ok_or_else(|| malformed(s))?;
        let (table, rest) = rest.split_once("_row_").ok_or_else(|| malformed(s))?;
        let (row, col) = rest.split_once("_col_").ok_or_else(|| malformed(s))?;
        let parse = |part: &str| {
            if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                return Err(malformed(s));
            }
            part.parse::<u32>().map_err(|_| malformed(s))
        };
        Ok(CellId {
            table: parse(table)?,
            row: parse(row)?,
            col: parse(col)?,
        })
    }
}

impl Serialize for CellId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for CellId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_in_attribute_form() {
        assert_eq!(CellId::new(1, 0, 2).to_string(), "table_1_row_0_col_2");
    }

    #[test]
    fn round_trips_through_parse() {
        for id in [
            CellId::new(1, 0, 0),
            CellId::new(3, 12, 7),
            CellId::new(42, 1, 99),
        ] {
            assert_eq!(id.to_string().parse::<CellId>().unwrap(), id);
        }
    }

    #[test]
    fn rejects_malformed_strings() {
        for raw in [
            "",
            "table_1_row_0",
            "table_1_row_0_col_",
            "table_x_row_0_col_1",
            "table_1_row_-2_col_1",
            "table_1_row_0_col_1_extra",
            "row_0_col_1",
            "table_+1_row_0_col_1",
        ] {
            let err = raw.parse::<CellId>().unwrap_err();
            assert!(
                matches!(err, Error::MalformedIdentifier { .. }),
                "expected MalformedIdentifier for {:?}",
                raw
            );
        }
    }

    #[test]
    fn serde_uses_textual_form() {
        let id = CellId::new(2, 5, 1);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"table_2_row_5_col_1\"");
        let back: CellId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
