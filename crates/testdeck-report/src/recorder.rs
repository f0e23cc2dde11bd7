//! Test lifecycle recorder
//!
//! Drives a [`ReportSink`] from the suite/test hooks of a test harness:
//!
//! ```no_run
//! use testdeck_report::{ReportConfig, TestLifecycleRecorder, TestOutcome};
//!
//! # fn main() -> testdeck_report::ReportResult<()> {
//! let mut recorder = TestLifecycleRecorder::new(ReportConfig::default());
//! recorder.on_suite_start()?;
//!
//! let ctx = recorder.on_test_start("loginWorks")?;
//! recorder.on_test_end(ctx, TestOutcome::Passed, || Ok(Vec::new()))?;
//!
//! recorder.on_suite_end()?;
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::fs;
use std::path::Path;

use chrono::{DateTime, Local};
use log::{debug, warn};

use crate::browser::BrowserHandle;
use crate::config::ReportConfig;
use crate::entry::{EntryId, TestOutcome};
use crate::error::{BrowserError, ReportError, ReportResult, ScreenshotError};
use crate::html::HtmlReporter;
use crate::sink::ReportSink;

/// Message recorded for a passing test
pub const PASS_MESSAGE: &str = "Test passed";

/// Message recorded for a skipped test
pub const SKIP_MESSAGE: &str = "Test skipped";

type SinkFactory<S> = Box<dyn FnMut(&ReportConfig) -> S>;

/// Per-test state handed out by [`TestLifecycleRecorder::on_test_start`]
pub struct TestContext {
    entry: EntryId,
    test_name: String,
    browser: Option<Box<dyn BrowserHandle>>,
}

impl TestContext {
    /// Attach the browser session used by this test
    pub fn with_browser(mut self, browser: Box<dyn BrowserHandle>) -> Self {
        self.browser = Some(browser);
        self
    }

    /// Attach or replace the browser session, returning the previous one
    pub fn set_browser(&mut self, browser: Box<dyn BrowserHandle>) -> Option<Box<dyn BrowserHandle>> {
        self.browser.replace(browser)
    }

    /// Name passed to `on_test_start`
    pub fn test_name(&self) -> &str {
        &self.test_name
    }

    /// Report entry this test finalizes
    pub fn entry_id(&self) -> EntryId {
        self.entry
    }

    /// Whether a browser session is attached
    pub fn has_browser(&self) -> bool {
        self.browser.is_some()
    }

    /// Mutable access to the attached browser
    pub fn browser_mut(&mut self) -> Option<&mut (dyn BrowserHandle + 'static)> {
        self.browser.as_deref_mut()
    }
}

impl fmt::Debug for TestContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestContext")
            .field("entry", &self.entry)
            .field("test_name", &self.test_name)
            .field("has_browser", &self.has_browser())
            .finish()
    }
}

/// A running or finished report session
#[derive(Debug)]
pub struct ReportSession<S> {
    sink: S,
    started_at: DateTime<Local>,
}

impl<S> ReportSession<S> {
    /// Sink receiving this session's entries
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// When `on_suite_start` ran
    pub fn started_at(&self) -> DateTime<Local> {
        self.started_at
    }
}

enum SessionState<S> {
    NotStarted,
    Running(ReportSession<S>),
    Finished(ReportSession<S>),
}

impl<S> SessionState<S> {
    fn running_mut(&mut self) -> ReportResult<&mut ReportSession<S>> {
        match self {
            SessionState::Running(session) => Ok(session),
            SessionState::NotStarted => Err(ReportError::SuiteNotStarted),
            SessionState::Finished(_) => Err(ReportError::SuiteFinished),
        }
    }
}

/// Records suite and test lifecycle events into a report.
///
/// Failed tests get a screenshot at `<output_dir>/<screenshot_dir>/<test name>.png`.
/// Screenshot problems are logged and never fail the hook.
pub struct TestLifecycleRecorder<S: ReportSink = HtmlReporter> {
    config: ReportConfig,
    make_sink: SinkFactory<S>,
    state: SessionState<S>,
}

impl TestLifecycleRecorder<HtmlReporter> {
    /// Recorder writing an HTML report
    pub fn new(config: ReportConfig) -> Self {
        Self::with_sink_factory(config, HtmlReporter::new)
    }
}

impl Default for TestLifecycleRecorder<HtmlReporter> {
    fn default() -> Self {
        Self::new(ReportConfig::default())
    }
}

impl<S: ReportSink> TestLifecycleRecorder<S> {
    /// Recorder building its sink with `make_sink` on every suite start
    pub fn with_sink_factory<F>(config: ReportConfig, make_sink: F) -> Self
    where
        F: FnMut(&ReportConfig) -> S + 'static,
    {
        Self {
            config,
            make_sink: Box::new(make_sink),
            state: SessionState::NotStarted,
        }
    }

    /// Settings used for every session of this recorder
    pub fn config(&self) -> &ReportConfig {
        &self.config
    }

    /// Current session, running or finished
    pub fn session(&self) -> Option<&ReportSession<S>> {
        match &self.state {
            SessionState::NotStarted => None,
            SessionState::Running(session) | SessionState::Finished(session) => Some(session),
        }
    }

    /// Sink of the current session
    pub fn sink(&self) -> Option<&S> {
        self.session().map(ReportSession::sink)
    }

    /// Between `on_suite_start` and `on_suite_end`
    pub fn is_running(&self) -> bool {
        matches!(self.state, SessionState::Running(_))
    }

    /// After `on_suite_end`
    pub fn is_finished(&self) -> bool {
        matches!(self.state, SessionState::Finished(_))
    }

    /// Open the report session
    pub fn on_suite_start(&mut self) -> ReportResult<()> {
        match self.state {
            SessionState::NotStarted => {}
            SessionState::Running(_) => return Err(ReportError::SuiteAlreadyStarted),
            SessionState::Finished(_) => return Err(ReportError::SuiteFinished),
        }

        let sink = (self.make_sink)(&self.config);
        self.state = SessionState::Running(ReportSession {
            sink,
            started_at: Local::now(),
        });
        debug!("Report session started in {}", self.config.output_dir().display());
        Ok(())
    }

    /// Create a pending entry for `test_name`
    pub fn on_test_start(&mut self, test_name: &str) -> ReportResult<TestContext> {
        let session = self.state.running_mut()?;
        let entry = session.sink.create_entry(test_name);
        Ok(TestContext {
            entry,
            test_name: test_name.to_string(),
            browser: None,
        })
    }

    /// Finalize the test's entry. On failure, `capture` supplies the screenshot bytes.
    ///
    /// The context's browser, if any, is released afterwards.
    pub fn on_test_end<C>(&mut self, ctx: TestContext, outcome: TestOutcome, capture: C) -> ReportResult<()>
    where
        C: FnOnce() -> Result<Vec<u8>, BrowserError>,
    {
        self.finish(ctx, outcome, |_| capture())
    }

    /// Like [`on_test_end`](Self::on_test_end), capturing from the context's own browser
    pub fn on_test_end_with_browser(&mut self, ctx: TestContext, outcome: TestOutcome) -> ReportResult<()> {
        self.finish(ctx, outcome, |browser| match browser {
            Some(browser) => browser.capture_screenshot(),
            None => Err(BrowserError::NotInitialized),
        })
    }

    /// Write the report and close the session
    pub fn on_suite_end(&mut self) -> ReportResult<()> {
        match std::mem::replace(&mut self.state, SessionState::NotStarted) {
            SessionState::Running(mut session) => {
                let flushed = session.sink.flush();
                debug!(
                    "Report session closed after {}ms",
                    (Local::now() - session.started_at).num_milliseconds()
                );
                self.state = SessionState::Finished(session);
                flushed
            }
            SessionState::NotStarted => Err(ReportError::SuiteNotStarted),
            finished @ SessionState::Finished(_) => {
                self.state = finished;
                Err(ReportError::SuiteFinished)
            }
        }
    }

    fn finish<F>(&mut self, ctx: TestContext, outcome: TestOutcome, capture: F) -> ReportResult<()>
    where
        F: FnOnce(Option<&mut (dyn BrowserHandle + 'static)>) -> Result<Vec<u8>, BrowserError>,
    {
        let TestContext {
            entry,
            test_name,
            mut browser,
        } = ctx;

        let finalized = self.record(entry, &test_name, outcome, || capture(browser.as_deref_mut()));

        let released = match browser {
            Some(browser) => browser.release().map_err(ReportError::from),
            None => Ok(()),
        };

        finalized.and(released)
    }

    fn record<C>(&mut self, entry: EntryId, test_name: &str, outcome: TestOutcome, capture: C) -> ReportResult<()>
    where
        C: FnOnce() -> Result<Vec<u8>, BrowserError>,
    {
        let session = self.state.running_mut()?;

        match outcome {
            TestOutcome::Passed => session.sink.mark_pass(entry, PASS_MESSAGE),
            TestOutcome::Skipped => session.sink.mark_skip(entry, SKIP_MESSAGE),
            TestOutcome::Failed(detail) => {
                session.sink.mark_fail(entry, &detail)?;

                let path = self.config.screenshot_path(test_name);
                match capture().map_err(ScreenshotError::from).and_then(|bytes| save_screenshot(&path, &bytes)) {
                    Ok(()) => session.sink.attach_screenshot(entry, &path),
                    Err(err) => {
                        warn!("No screenshot for failed test '{}': {}", test_name, err);
                        Ok(())
                    }
                }
            }
        }
    }
}

impl<S: ReportSink + fmt::Debug> fmt::Debug for TestLifecycleRecorder<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestLifecycleRecorder")
            .field("config", &self.config)
            .field("session", &self.session())
            .finish()
    }
}

fn save_screenshot(path: &Path, bytes: &[u8]) -> Result<(), ScreenshotError> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).map_err(|source| ScreenshotError::Write {
            path: dir.to_path_buf(),
            source,
        })?;
    }
    fs::write(path, bytes).map_err(|source| ScreenshotError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    debug!("Saved screenshot {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::Status;
    use crate::sink::EntryLog;
    use crate::{FailureDetail, ReportEntry};
    use std::cell::Cell;
    use std::path::Path;
    use std::rc::Rc;

    #[derive(Debug, Default)]
    struct MemorySink {
        log: EntryLog,
        flushes: usize,
    }

    impl ReportSink for MemorySink {
        fn create_entry(&mut self, name: &str) -> EntryId {
            self.log.create(name)
        }
        fn mark_pass(&mut self, id: EntryId, message: &str) -> ReportResult<()> {
            self.log.finalize(id, Status::Pass, Some(message.to_string()), None)
        }
        fn mark_fail(&mut self, id: EntryId, detail: &FailureDetail) -> ReportResult<()> {
            self.log.finalize(id, Status::Fail, None, Some(detail.clone()))
        }
        fn mark_skip(&mut self, id: EntryId, message: &str) -> ReportResult<()> {
            self.log.finalize(id, Status::Skip, Some(message.to_string()), None)
        }
        fn attach_screenshot(&mut self, id: EntryId, path: &Path) -> ReportResult<()> {
            self.log.attach(id, path)
        }
        fn entries(&self) -> &[ReportEntry] {
            self.log.entries()
        }
        fn flush(&mut self) -> ReportResult<()> {
            self.flushes += 1;
            Ok(())
        }
    }

    fn recorder() -> TestLifecycleRecorder<MemorySink> {
        TestLifecycleRecorder::with_sink_factory(ReportConfig::new("unused"), |_| MemorySink::default())
    }

    #[test]
    fn test_hooks_require_running_session() {
        let mut rec = recorder();
        assert!(matches!(rec.on_test_start("a"), Err(ReportError::SuiteNotStarted)));
        assert!(matches!(rec.on_suite_end(), Err(ReportError::SuiteNotStarted)));

        rec.on_suite_start().unwrap();
        assert!(matches!(rec.on_suite_start(), Err(ReportError::SuiteAlreadyStarted)));

        rec.on_suite_end().unwrap();
        assert!(rec.is_finished());
        assert_eq!(rec.sink().unwrap().flushes, 1);
        assert!(matches!(rec.on_test_start("b"), Err(ReportError::SuiteFinished)));
        assert!(matches!(rec.on_suite_end(), Err(ReportError::SuiteFinished)));
        assert!(matches!(rec.on_suite_start(), Err(ReportError::SuiteFinished)));
    }

    #[test]
    fn test_pass_and_skip_messages() {
        let mut rec = recorder();
        rec.on_suite_start().unwrap();

        let a = rec.on_test_start("a").unwrap();
        let b = rec.on_test_start("b").unwrap();
        rec.on_test_end(a, TestOutcome::Passed, || panic!("no capture on pass")).unwrap();
        rec.on_test_end(b, TestOutcome::Skipped, || panic!("no capture on skip")).unwrap();

        let entries = rec.sink().unwrap().entries();
        assert_eq!(entries[0].status(), Status::Pass);
        assert_eq!(entries[0].message(), Some(PASS_MESSAGE));
        assert_eq!(entries[1].status(), Status::Skip);
        assert_eq!(entries[1].message(), Some(SKIP_MESSAGE));
    }

    struct CountingBrowser {
        shots: usize,
        released: Rc<Cell<usize>>,
    }

    impl BrowserHandle for CountingBrowser {
        fn capture_screenshot(&mut self) -> Result<Vec<u8>, BrowserError> {
            self.shots += 1;
            Ok(vec![0; self.shots])
        }

        fn release(self: Box<Self>) -> Result<(), BrowserError> {
            self.released.set(self.released.get() + 1);
            Ok(())
        }
    }

    fn counting(released: &Rc<Cell<usize>>) -> Box<CountingBrowser> {
        Box::new(CountingBrowser {
            shots: 0,
            released: Rc::clone(released),
        })
    }

    #[test]
    fn test_set_browser_hands_back_previous_session() {
        let mut rec = recorder();
        rec.on_suite_start().unwrap();
        let released = Rc::new(Cell::new(0));

        let mut ctx = rec.on_test_start("swap").unwrap();
        assert!(ctx.browser_mut().is_none());
        assert!(ctx.set_browser(counting(&released)).is_none());

        let previous = ctx.set_browser(counting(&released)).unwrap();
        previous.release().unwrap();
        assert_eq!(released.get(), 1);

        let shot = ctx.browser_mut().unwrap().capture_screenshot().unwrap();
        assert_eq!(shot.len(), 1);

        rec.on_test_end(ctx, TestOutcome::Passed, || Ok(Vec::new())).unwrap();
        assert_eq!(released.get(), 2);
    }

    #[test]
    fn test_session_records_start_time() {
        let mut rec = recorder();
        assert!(rec.session().is_none());
        let before = Local::now();
        rec.on_suite_start().unwrap();

        let started = rec.session().unwrap().started_at();
        assert!(started >= before && started <= Local::now());
        assert!(rec.is_running());
        assert_eq!(rec.config().output_dir(), Path::new("unused"));
    }

    #[test]
    fn test_context_debug_hides_browser() {
        let mut rec = recorder();
        rec.on_suite_start().unwrap();
        let ctx = rec.on_test_start("x").unwrap();
        assert_eq!(ctx.test_name(), "x");
        assert_eq!(ctx.entry_id(), EntryId(0));
        assert!(format!("{:?}", ctx).contains("has_browser: false"));
    }
}
