//! Report error types

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::entry::EntryId;

/// Result type for report operations
pub type ReportResult<T> = std::result::Result<T, ReportError>;

/// Errors raised by the recorder and report sinks
#[derive(Debug, Error)]
pub enum ReportError {
    /// A lifecycle hook ran before `on_suite_start`
    #[error("suite has not been started")]
    SuiteNotStarted,

    /// `on_suite_start` ran while a suite was already running
    #[error("suite already started")]
    SuiteAlreadyStarted,

    /// A lifecycle hook ran after `on_suite_end`
    #[error("suite already finished")]
    SuiteFinished,

    /// The sink has no entry with this id
    #[error("unknown report entry {0}")]
    UnknownEntry(EntryId),

    /// The entry already has its outcome
    #[error("report entry {0} is already finalized")]
    EntryFinalized(EntryId),

    /// Writing the report document failed
    #[error("failed to write report {path}: {source}")]
    Write {
        /// Target file or directory
        path: PathBuf,
        /// Underlying error
        #[source]
        source: io::Error,
    },

    /// Releasing the browser failed
    #[error("browser error: {0}")]
    Browser(#[from] BrowserError),
}

/// Errors from a browser-automation handle
#[derive(Debug, Error)]
pub enum BrowserError {
    /// The test never attached a browser
    #[error("no browser session")]
    NotInitialized,

    /// Taking a screenshot failed
    #[error("screenshot failed: {0}")]
    Screenshot(String),

    /// Quitting the browser failed
    #[error("failed to quit browser: {0}")]
    Release(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Why a failure screenshot was not saved. Logged, never returned to the caller.
#[derive(Debug, Error)]
pub(crate) enum ScreenshotError {
    #[error("capture failed: {0}")]
    Capture(#[from] BrowserError),

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
