//! # testdeck-core
//!
//! Cell model for testdeck's tabular test data.
//!
//! - [`CellValue`] and [`Cell`] - typed cell contents plus number format
//! - [`CellAddress`] - A1-style addressing
//! - [`NumberFormat`] and [`DateSystem`] - what makes a number a date
//! - [`CellFormatter`] - the one place cells become strings
//! - [`TabularRow`] - a header-keyed row of strings
//!
//! ## Example
//!
//! ```rust
//! use testdeck_core::{Cell, CellFormatter, CellValue, NumberFormat};
//!
//! let formatter = CellFormatter::default();
//! assert_eq!(formatter.format(&Cell::new(CellValue::Number(42.7))), "42");
//!
//! let date = Cell::with_format(CellValue::Number(45292.0), NumberFormat::BuiltIn(14));
//! assert_eq!(formatter.format(&date), "2024-01-01 00:00:00");
//! ```

pub mod cell;
pub mod error;
pub mod format;
pub mod row;

pub use cell::{Cell, CellAddress, CellValue};
pub use error::{Error, Result};
pub use format::{CellFormatter, DateSystem, NumberFormat, DEFAULT_DATE_FORMAT};
pub use row::TabularRow;

/// Maximum number of rows in a worksheet
pub const MAX_ROWS: u32 = 1_048_576;

/// Maximum number of columns in a worksheet
pub const MAX_COLS: u16 = 16_384;
