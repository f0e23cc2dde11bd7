//! # testdeck-report
//!
//! Test lifecycle recording for testdeck.
//!
//! [`TestLifecycleRecorder`] is driven by a harness's suite and test hooks.
//! Each test gets a report entry; failed tests additionally get a screenshot
//! under `<output_dir>/screenshots/`. At suite end the entries are written out
//! by a [`ReportSink`], an HTML page by default.

pub mod browser;
pub mod config;
pub mod entry;
pub mod error;
pub mod html;
pub mod recorder;
pub mod sink;

pub use browser::BrowserHandle;
pub use config::{ReportConfig, DEFAULT_OUTPUT_DIR};
pub use entry::{EntryId, FailureDetail, ReportEntry, Status, TestOutcome};
pub use error::{BrowserError, ReportError, ReportResult};
pub use html::HtmlReporter;
pub use recorder::{ReportSession, TestContext, TestLifecycleRecorder, PASS_MESSAGE, SKIP_MESSAGE};
pub use sink::{EntryLog, ReportSink};
