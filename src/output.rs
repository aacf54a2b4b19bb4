//! Output sinks handed to subjects while a case runs.
//!
//! Subjects print through [`Call::print`](crate::runner::Call::print) rather
//! than `println!`, which lets the executor decide per run whether the text is
//! buffered and attached to the case report or written straight to stdout.

use std::io::Write;

/// Sink for text printed by a subject.
pub trait OutputSink {
    fn emit(&mut self, text: &str);
}

/// Collects output into a String so it can be shown next to the case result.
#[derive(Debug, Default)]
pub struct OutputBuffer {
    buffer: String,
}

impl OutputBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn as_str(&self) -> &str {
        &self.buffer
    }

    pub fn into_string(self) -> String {
        self.buffer
    }
}

impl OutputSink for OutputBuffer {
    fn emit(&mut self, text: &str) {
        self.buffer.push_str(text);
    }
}

/// Writes output straight to the process stdout.
pub struct StdoutSink;

impl OutputSink for StdoutSink {
    fn emit(&mut self, text: &str) {
        let mut stdout = std::io::stdout().lock();
        let _ = stdout.write_all(text.as_bytes());
        let _ = stdout.flush();
    }
}
