//! Cell value types

use std::fmt;

use crate::format::NumberFormat;

/// What a spreadsheet cell holds, before any coercion to text.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CellValue {
    /// Nothing stored
    #[default]
    Empty,

    /// Shared, inline or formula-result string
    Text(String),

    /// Any number; dates are serials distinguished only by the cell format
    Number(f64),

    /// `t="b"` cell
    Boolean(bool),

    /// Formula source text, stored without the leading `=`
    Formula(String),

    /// Error literal such as `#N/A`
    Error(String),
}

impl CellValue {
    /// Text value
    pub fn text<S: Into<String>>(s: S) -> Self {
        CellValue::Text(s.into())
    }

    /// Create a new formula value; a leading `=` is stripped
    pub fn formula<S: AsRef<str>>(source: S) -> Self {
        let source = source.as_ref();
        CellValue::Formula(source.strip_prefix('=').unwrap_or(source).to_string())
    }

    /// True for [`CellValue::Empty`]
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// True for [`CellValue::Formula`]
    pub fn is_formula(&self) -> bool {
        matches!(self, CellValue::Formula(_))
    }

    /// The number, if this is a numeric cell
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Formula source without `=`
    pub fn formula_text(&self) -> Option<&str> {
        match self {
            CellValue::Formula(text) => Some(text),
            _ => None,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Text(s) => write!(f, "{}", s),
            CellValue::Number(n) => write!(f, "{}", n),
            CellValue::Boolean(b) => write!(f, "{}", b),
            CellValue::Formula(text) => write!(f, "={}", text),
            CellValue::Error(e) => write!(f, "{}", e),
        }
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Boolean(b)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<i64> for CellValue {
    fn from(n: i64) -> Self {
        CellValue::Number(n as f64)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::text(s)
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

/// A cell as read from a sheet: its value and the number format applied to it.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Cell {
    /// Cell value
    pub value: CellValue,
    /// Number format from the cell's style
    pub format: NumberFormat,
}

impl Cell {
    /// Create a cell with the General format
    pub fn new(value: CellValue) -> Self {
        Self {
            value,
            format: NumberFormat::General,
        }
    }

    /// Create a cell with an explicit number format
    pub fn with_format(value: CellValue, format: NumberFormat) -> Self {
        Self { value, format }
    }

    /// True when the value is numeric and displayed as a date or time
    pub fn is_date(&self) -> bool {
        matches!(self.value, CellValue::Number(_)) && self.format.is_date_format()
    }
}

impl From<CellValue> for Cell {
    fn from(value: CellValue) -> Self {
        Cell::new(value)
    }
}
