//! Status and diagnostic output trait

/// Trait for progress and result output
///
/// `message` lines go to the host console; `set_status` replaces the short
/// persistent status line (LCD).
pub trait StatusSink {
    /// Emit a full message line
    fn message(&mut self, line: &str);

    /// Replace the persistent status line
    fn set_status(&mut self, status: &str);
}

impl<T: StatusSink + ?Sized> StatusSink for &mut T {
    fn message(&mut self, line: &str) {
        (**self).message(line)
    }

    fn set_status(&mut self, status: &str) {
        (**self).set_status(status)
    }
}
