//! Browser-automation seam

use crate::error::BrowserError;

/// A live browser session owned by one test.
///
/// `release` consumes the handle, so a session is quit at most once.
pub trait BrowserHandle {
    /// PNG bytes of the current viewport
    fn capture_screenshot(&mut self) -> Result<Vec<u8>, BrowserError>;

    /// Quit the session
    fn release(self: Box<Self>) -> Result<(), BrowserError>;
}
