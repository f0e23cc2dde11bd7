//! Number formats, date systems and cell-to-string coercion

mod date;
mod formatter;
mod number_format;

pub use date::DateSystem;
pub use formatter::{CellFormatter, DEFAULT_DATE_FORMAT};
pub use number_format::NumberFormat;
