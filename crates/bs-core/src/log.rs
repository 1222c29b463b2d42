//! Message sink for human-readable project output.
//!
//! Projects and definition readers never print directly; they hand every
//! message to a [`LogSink`]. A message printed with `add_new_line == false`
//! is the start of a line that later messages continue (progress output
//! such as `Simulating house: 10% 20% ... End`).

use std::cell::RefCell;
use std::rc::Rc;

/// Destination for project messages.
pub trait LogSink {
    /// Emit `message`, terminating the current line when `add_new_line` is set.
    fn print(&mut self, message: &str, add_new_line: bool);

    /// Emit `message` as a complete line.
    fn line(&mut self, message: &str) {
        self.print(message, true);
    }
}

/// Forwards complete lines to `tracing` at INFO level.
///
/// Partial lines are buffered until a message arrives with
/// `add_new_line == true`.
#[derive(Debug, Default)]
pub struct TracingSink {
    pending: String,
}

impl TracingSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LogSink for TracingSink {
    fn print(&mut self, message: &str, add_new_line: bool) {
        self.pending.push_str(message);
        if add_new_line {
            let line = std::mem::take(&mut self.pending);
            tracing::info!(target: "bsim", "{line}");
        }
    }
}

impl Drop for TracingSink {
    fn drop(&mut self) {
        if !self.pending.is_empty() {
            tracing::info!(target: "bsim", "{}", self.pending);
        }
    }
}

/// Captures lines in memory. Clones share the same buffer, so a caller can
/// keep one handle and give the other to a project.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    inner: Rc<RefCell<MemoryLines>>,
}

#[derive(Debug, Default)]
struct MemoryLines {
    lines: Vec<String>,
    pending: String,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Completed lines, oldest first. An unterminated line is not included.
    pub fn lines(&self) -> Vec<String> {
        self.inner.borrow().lines.clone()
    }

    /// Whether any completed line contains `needle`.
    pub fn contains(&self, needle: &str) -> bool {
        self.inner.borrow().lines.iter().any(|l| l.contains(needle))
    }

    pub fn clear(&self) {
        let mut inner = self.inner.borrow_mut();
        inner.lines.clear();
        inner.pending.clear();
    }
}

impl LogSink for MemorySink {
    fn print(&mut self, message: &str, add_new_line: bool) {
        let mut inner = self.inner.borrow_mut();
        inner.pending.push_str(message);
        if add_new_line {
            let line = std::mem::take(&mut inner.pending);
            inner.lines.push(line);
        }
    }
}
