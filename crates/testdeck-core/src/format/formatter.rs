//! Cell-to-string coercion

use std::fmt::Write;

use crate::cell::{Cell, CellValue};
use crate::format::DateSystem;

/// Default rendering for date-formatted numeric cells
pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Renders cells as plain strings.
///
/// Type information stops here: callers of the tabular reader only ever see
/// the strings this produces.
///
/// | Cell | Rendering |
/// |---|---|
/// | text | as-is |
/// | number with a date format | `date_format` applied to the serial |
/// | other number | truncated toward zero, base 10 |
/// | boolean | `true` / `false` |
/// | formula | formula source without `=` |
/// | empty, error | empty string |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellFormatter {
    date_system: DateSystem,
    date_format: String,
}

impl Default for CellFormatter {
    fn default() -> Self {
        Self::new(DateSystem::V1900)
    }
}

impl CellFormatter {
    /// Formatter for a workbook using `date_system`, with the default date format
    pub fn new(date_system: DateSystem) -> Self {
        Self {
            date_system,
            date_format: DEFAULT_DATE_FORMAT.to_string(),
        }
    }

    /// Override the chrono format string used for date cells
    pub fn with_date_format<S: Into<String>>(mut self, format: S) -> Self {
        self.date_format = format.into();
        self
    }

    /// The workbook date system this formatter converts serials with
    pub fn date_system(&self) -> DateSystem {
        self.date_system
    }

    /// Coerce an optional cell; a missing cell renders as an empty string
    pub fn format_opt(&self, cell: Option<&Cell>) -> String {
        cell.map(|c| self.format(c)).unwrap_or_default()
    }

    /// Coerce a cell to its string representation
    pub fn format(&self, cell: &Cell) -> String {
        match &cell.value {
            CellValue::Empty | CellValue::Error(_) => String::new(),
            CellValue::Text(s) => s.clone(),
            CellValue::Boolean(b) => b.to_string(),
            CellValue::Formula(source) => source.clone(),
            CellValue::Number(n) if cell.format.is_date_format() => self.format_date(*n),
            CellValue::Number(n) => truncate(*n),
        }
    }

    fn format_date(&self, serial: f64) -> String {
        let Some(dt) = self.date_system.to_datetime(serial) else {
            return truncate(serial);
        };

        // chrono reports a bad format string through fmt::Error
        let mut out = String::new();
        if write!(out, "{}", dt.format(&self.date_format)).is_err() {
            return dt.format(DEFAULT_DATE_FORMAT).to_string();
        }
        out
    }
}

/// Saturating truncation toward zero; NaN becomes 0
fn truncate(n: f64) -> String {
    (n as i64).to_string()
}
