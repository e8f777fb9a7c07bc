//! Output sinks

use std::io::Write;

/// Destination for the dump text
pub trait OutputSink {
    /// Write one line of output; failures are not reported to the caller
    fn write(&mut self, text: &str);
}

/// Sink over any [`std::io::Write`]
pub struct WriterSink<W: Write> {
    inner: W,
}

impl<W: Write> WriterSink<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl WriterSink<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write> OutputSink for WriterSink<W> {
    fn write(&mut self, text: &str) {
        let result = writeln!(self.inner, "{}", text).and_then(|_| self.inner.flush());
        if let Err(e) = result {
            tracing::warn!("Failed to write output: {}", e);
        }
    }
}

/// Collects lines in memory
impl OutputSink for Vec<String> {
    fn write(&mut self, text: &str) {
        self.push(text.to_string());
    }
}
