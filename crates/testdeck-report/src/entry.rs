//! Report entries and test outcomes

use std::error::Error as StdError;
use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Local};

use crate::error::{ReportError, ReportResult};

/// Handle to an entry inside a report sink
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EntryId(pub usize);

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Status of a report entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Status {
    /// Test started, outcome not yet recorded
    Pending,
    /// Test passed
    Pass,
    /// Test failed
    Fail,
    /// Test skipped
    Skip,
}

impl Status {
    /// Lowercase label, also used as CSS class
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Pending => "pending",
            Status::Pass => "pass",
            Status::Fail => "fail",
            Status::Skip => "skip",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What went wrong in a failed test
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FailureDetail {
    /// One-line summary
    pub message: String,
    /// Further context such as a cause chain or a backtrace
    pub detail: Option<String>,
}

impl FailureDetail {
    /// Failure with a message only
    pub fn new<S: Into<String>>(message: S) -> Self {
        Self {
            message: message.into(),
            detail: None,
        }
    }

    /// Attach detail text
    pub fn with_detail<S: Into<String>>(mut self, detail: S) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// Build from an error, listing its `source()` chain as the detail
    pub fn from_error(err: &(dyn StdError + 'static)) -> Self {
        let mut causes = Vec::new();
        let mut source = err.source();
        while let Some(cause) = source {
            causes.push(format!("caused by: {}", cause));
            source = cause.source();
        }

        Self {
            message: err.to_string(),
            detail: (!causes.is_empty()).then(|| causes.join("\n")),
        }
    }
}

impl fmt::Display for FailureDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)?;
        if let Some(detail) = &self.detail {
            write!(f, "\n{}", detail)?;
        }
        Ok(())
    }
}

impl From<&str> for FailureDetail {
    fn from(message: &str) -> Self {
        FailureDetail::new(message)
    }
}

impl From<String> for FailureDetail {
    fn from(message: String) -> Self {
        FailureDetail::new(message)
    }
}

/// Outcome handed to the recorder when a test ends
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TestOutcome {
    /// The test passed
    Passed,
    /// The test failed
    Failed(FailureDetail),
    /// The test was skipped
    Skipped,
}

impl TestOutcome {
    /// Failed outcome from anything convertible into a [`FailureDetail`]
    pub fn failed<D: Into<FailureDetail>>(detail: D) -> Self {
        TestOutcome::Failed(detail.into())
    }

    /// Map a test body's result to an outcome
    pub fn from_result<T, E: StdError + 'static>(result: &Result<T, E>) -> Self {
        match result {
            Ok(_) => TestOutcome::Passed,
            Err(e) => TestOutcome::Failed(FailureDetail::from_error(e)),
        }
    }

    /// Status recorded for this outcome
    pub fn status(&self) -> Status {
        match self {
            TestOutcome::Passed => Status::Pass,
            TestOutcome::Failed(_) => Status::Fail,
            TestOutcome::Skipped => Status::Skip,
        }
    }
}

/// One test's record in the report
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ReportEntry {
    id: EntryId,
    name: String,
    status: Status,
    message: Option<String>,
    failure: Option<FailureDetail>,
    screenshot: Option<PathBuf>,
    started_at: DateTime<Local>,
    ended_at: Option<DateTime<Local>>,
}

impl ReportEntry {
    /// A pending entry started now
    pub fn new<S: Into<String>>(id: EntryId, name: S) -> Self {
        Self {
            id,
            name: name.into(),
            status: Status::Pending,
            message: None,
            failure: None,
            screenshot: None,
            started_at: Local::now(),
            ended_at: None,
        }
    }

    /// Entry id
    pub fn id(&self) -> EntryId {
        self.id
    }

    /// Test name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current status
    pub fn status(&self) -> Status {
        self.status
    }

    /// Message recorded with a pass or skip
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Failure detail recorded with a fail
    pub fn failure(&self) -> Option<&FailureDetail> {
        self.failure.as_ref()
    }

    /// Attached screenshot
    pub fn screenshot(&self) -> Option<&Path> {
        self.screenshot.as_deref()
    }

    /// When the test started
    pub fn started_at(&self) -> DateTime<Local> {
        self.started_at
    }

    /// When the outcome was recorded
    pub fn ended_at(&self) -> Option<DateTime<Local>> {
        self.ended_at
    }

    /// Time from start to outcome, `None` while pending
    pub fn duration(&self) -> Option<Duration> {
        self.ended_at.map(|end| end - self.started_at)
    }

    /// True once an outcome has been recorded
    pub fn is_finalized(&self) -> bool {
        self.status != Status::Pending
    }

    pub(crate) fn finalize(
        &mut self,
        status: Status,
        message: Option<String>,
        failure: Option<FailureDetail>,
    ) -> ReportResult<()> {
        if self.is_finalized() {
            return Err(ReportError::EntryFinalized(self.id));
        }
        self.status = status;
        self.message = message;
        self.failure = failure;
        self.ended_at = Some(Local::now());
        Ok(())
    }

    pub(crate) fn set_screenshot(&mut self, path: PathBuf) {
        self.screenshot = Some(path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Inner;

    impl fmt::Display for Inner {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("connection refused")
        }
    }

    impl StdError for Inner {}

    #[derive(Debug)]
    struct Outer(Inner);

    impl fmt::Display for Outer {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("login page did not load")
        }
    }

    impl StdError for Outer {
        fn source(&self) -> Option<&(dyn StdError + 'static)> {
            Some(&self.0)
        }
    }

    #[test]
    fn test_failure_from_error_chain() {
        let detail = FailureDetail::from_error(&Outer(Inner));
        assert_eq!(detail.message, "login page did not load");
        assert_eq!(detail.detail.as_deref(), Some("caused by: connection refused"));

        let flat = FailureDetail::from_error(&Inner);
        assert_eq!(flat.detail, None);
    }

    #[test]
    fn test_outcome_from_result() {
        let ok: Result<(), Inner> = Ok(());
        assert_eq!(TestOutcome::from_result(&ok), TestOutcome::Passed);

        let err: Result<(), Inner> = Err(Inner);
        assert_eq!(
            TestOutcome::from_result(&err),
            TestOutcome::failed("connection refused")
        );
    }

    #[test]
    fn test_finalize_once() {
        let mut entry = ReportEntry::new(EntryId(0), "search");
        assert!(!entry.is_finalized());
        assert!(entry.duration().is_none());

        entry.finalize(Status::Pass, Some("Test passed".into()), None).unwrap();
        assert_eq!(entry.status(), Status::Pass);
        assert!(entry.duration().is_some());

        assert!(matches!(
            entry.finalize(Status::Fail, None, None),
            Err(ReportError::EntryFinalized(EntryId(0)))
        ));
        assert_eq!(entry.status(), Status::Pass);
    }
}
