//! Prelude module - common imports for testdeck users
//!
//! ```rust
//! use testdeck::prelude::*;
//! ```

pub use crate::{CellValue, TabularRow};

#[cfg(feature = "xlsx")]
pub use crate::{ReadOptions, TabularDataReader};

#[cfg(feature = "report")]
pub use crate::{
    BrowserError, BrowserHandle, FailureDetail, ReportConfig, TestContext,
    TestLifecycleRecorder, TestOutcome,
};
