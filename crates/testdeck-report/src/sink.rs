//! Report sinks
//!
//! A sink owns the entries of one suite and turns them into a document when
//! flushed. [`EntryLog`] holds the bookkeeping every sink needs; sinks differ
//! only in what `flush` produces.

use std::path::Path;

use crate::entry::{EntryId, FailureDetail, ReportEntry, Status};
use crate::error::{ReportError, ReportResult};

/// Destination for test report entries
pub trait ReportSink {
    /// Start a pending entry for `name`
    fn create_entry(&mut self, name: &str) -> EntryId;

    /// Finalize an entry as passed
    fn mark_pass(&mut self, id: EntryId, message: &str) -> ReportResult<()>;

    /// Finalize an entry as failed
    fn mark_fail(&mut self, id: EntryId, detail: &FailureDetail) -> ReportResult<()>;

    /// Finalize an entry as skipped
    fn mark_skip(&mut self, id: EntryId, message: &str) -> ReportResult<()>;

    /// Attach a screenshot file to an entry
    fn attach_screenshot(&mut self, id: EntryId, path: &Path) -> ReportResult<()>;

    /// All entries in creation order
    fn entries(&self) -> &[ReportEntry];

    /// Look up one entry
    fn entry(&self, id: EntryId) -> Option<&ReportEntry> {
        self.entries().get(id.0)
    }

    /// Persist the report
    fn flush(&mut self) -> ReportResult<()>;
}

/// In-memory entry storage with the finalize-once rule enforced
#[derive(Debug, Clone, Default)]
pub struct EntryLog {
    entries: Vec<ReportEntry>,
}

impl EntryLog {
    /// Empty log
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a pending entry
    pub fn create(&mut self, name: &str) -> EntryId {
        let id = EntryId(self.entries.len());
        self.entries.push(ReportEntry::new(id, name));
        id
    }

    /// Record an outcome on a pending entry
    pub fn finalize(
        &mut self,
        id: EntryId,
        status: Status,
        message: Option<String>,
        failure: Option<FailureDetail>,
    ) -> ReportResult<()> {
        self.get_mut(id)?.finalize(status, message, failure)
    }

    /// Attach a screenshot path
    pub fn attach(&mut self, id: EntryId, path: &Path) -> ReportResult<()> {
        self.get_mut(id)?.set_screenshot(path.to_path_buf());
        Ok(())
    }

    /// Entries in creation order
    pub fn entries(&self) -> &[ReportEntry] {
        &self.entries
    }

    /// Count entries with a given status
    pub fn count(&self, status: Status) -> usize {
        self.entries.iter().filter(|e| e.status() == status).count()
    }

    fn get_mut(&mut self, id: EntryId) -> ReportResult<&mut ReportEntry> {
        self.entries
            .get_mut(id.0)
            .ok_or(ReportError::UnknownEntry(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_sequential() {
        let mut log = EntryLog::new();
        assert_eq!(log.create("a"), EntryId(0));
        assert_eq!(log.create("b"), EntryId(1));
        assert_eq!(log.entries()[1].name(), "b");
    }

    #[test]
    fn test_unknown_entry() {
        let mut log = EntryLog::new();
        assert!(matches!(
            log.finalize(EntryId(3), Status::Pass, None, None),
            Err(ReportError::UnknownEntry(EntryId(3)))
        ));
        assert!(log.attach(EntryId(0), Path::new("x.png")).is_err());
    }

    #[test]
    fn test_counts() {
        let mut log = EntryLog::new();
        let a = log.create("a");
        let b = log.create("b");
        log.create("c");
        log.finalize(a, Status::Pass, None, None).unwrap();
        log.finalize(b, Status::Fail, None, Some(FailureDetail::new("boom"))).unwrap();

        assert_eq!(log.count(Status::Pass), 1);
        assert_eq!(log.count(Status::Fail), 1);
        assert_eq!(log.count(Status::Pending), 1);
    }
}
