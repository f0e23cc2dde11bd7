//! # testdeck-xlsx
//!
//! XLSX (Office Open XML) reader for testdeck.
//!
//! [`XlsxWorkbook`] opens a workbook archive and parses sheets on demand;
//! [`TabularDataReader`] builds on it to hand out header-keyed rows of strings
//! for data-driven tests.
//!
//! ```rust,no_run
//! use testdeck_xlsx::TabularDataReader;
//!
//! let reader = TabularDataReader::new("testdata/users.xlsx");
//! for row in reader.read_sheet("TestData") {
//!     println!("{:?}", row);
//! }
//! ```

pub mod error;
pub mod reader;
pub mod sheet;
pub mod tabular;

mod formula;
mod styles;

pub use error::{XlsxError, XlsxResult};
pub use reader::XlsxWorkbook;
pub use sheet::{Row, Sheet};
pub use tabular::{ReadOptions, TabularDataReader};
