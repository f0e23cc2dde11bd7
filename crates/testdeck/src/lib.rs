//! # testdeck
//!
//! Scaffolding for data-driven UI test suites.
//!
//! ## Features
//!
//! - Read test data from XLSX sheets as header-keyed rows of strings
//! - Record per-test outcomes with a screenshot for every failure
//! - Write an HTML run report at suite end
//!
//! ## Example
//!
//! ```rust,no_run
//! use testdeck::prelude::*;
//!
//! # fn main() -> testdeck::report::ReportResult<()> {
//! let mut recorder = TestLifecycleRecorder::new(ReportConfig::default());
//! recorder.on_suite_start()?;
//!
//! let reader = TabularDataReader::new("testdata/users.xlsx");
//! for row in reader.read_sheet("Logins") {
//!     let ctx = recorder.on_test_start(&format!("login_{}", &row["username"]))?;
//!     let outcome = if row["password"].is_empty() {
//!         TestOutcome::failed("missing password")
//!     } else {
//!         TestOutcome::Passed
//!     };
//!     recorder.on_test_end(ctx, outcome, || Ok(Vec::new()))?;
//! }
//!
//! recorder.on_suite_end()?;
//! # Ok(())
//! # }
//! ```

pub mod prelude;

#[cfg(feature = "xlsx")]
pub use testdeck_xlsx as xlsx;

#[cfg(feature = "report")]
pub use testdeck_report as report;

// Re-export core types
pub use testdeck_core::{
    Cell, CellAddress, CellFormatter, CellValue, DateSystem, Error, NumberFormat, Result,
    TabularRow, DEFAULT_DATE_FORMAT, MAX_COLS, MAX_ROWS,
};

// Re-export I/O types
#[cfg(feature = "xlsx")]
pub use testdeck_xlsx::{ReadOptions, TabularDataReader, XlsxError, XlsxResult, XlsxWorkbook};

// Re-export report types
#[cfg(feature = "report")]
pub use testdeck_report::{
    BrowserError, BrowserHandle, FailureDetail, HtmlReporter, ReportConfig, ReportError,
    ReportResult, ReportSink, TestContext, TestLifecycleRecorder, TestOutcome,
};
