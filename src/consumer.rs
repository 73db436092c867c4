// Log consumer - drains producer rings, renders records, writes the sink

use crate::format;
use crate::logger::Core;
use crate::record::Record;
use std::fmt::Write as _;
use std::io::Write;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::thread;

/// Output sink for rendered log lines
pub trait LogSink: Send {
    /// Write one rendered line (newline included)
    fn write_line(&mut self, line: &[u8]);

    /// Flush any buffered output
    fn flush(&mut self);
}

/// Standard output sink (writes to stdout)
pub struct StdoutSink {
    stdout: std::io::Stdout,
}

impl StdoutSink {
    pub fn new() -> Self {
        Self {
            stdout: std::io::stdout(),
        }
    }
}

impl Default for StdoutSink {
    fn default() -> Self {
        Self::new()
    }
}

impl LogSink for StdoutSink {
    fn write_line(&mut self, line: &[u8]) {
        let _ = self.stdout.write_all(line);
    }

    fn flush(&mut self) {
        let _ = self.stdout.flush();
    }
}

/// Standard error sink (writes to stderr)
pub struct StderrSink {
    stderr: std::io::Stderr,
}

impl StderrSink {
    pub fn new() -> Self {
        Self {
            stderr: std::io::stderr(),
        }
    }
}

impl Default for StderrSink {
    fn default() -> Self {
        Self::new()
    }
}

impl LogSink for StderrSink {
    fn write_line(&mut self, line: &[u8]) {
        let _ = self.stderr.write_all(line);
    }

    fn flush(&mut self) {
        let _ = self.stderr.flush();
    }
}

/// Sink over any byte writer (a file, a pipe, a test buffer)
pub struct WriterSink<W: Write + Send> {
    inner: W,
}

impl<W: Write + Send> WriterSink<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }
}

impl<W: Write + Send> LogSink for WriterSink<W> {
    fn write_line(&mut self, line: &[u8]) {
        let _ = self.inner.write_all(line);
    }

    fn flush(&mut self) {
        let _ = self.inner.flush();
    }
}

/// The single background worker.
///
/// Round-robins over every registered producer ring, draining up to
/// `batch` records per ring per pass. A node that is inactive and empty
/// stays linked but is skipped. After shutdown is signalled the worker
/// drains every ring to empty (active or not) before exiting.
pub(crate) struct Consumer {
    core: Arc<Core>,
    sink: Box<dyn LogSink>,
    line: String,
}

impl Consumer {
    pub(crate) fn new(core: Arc<Core>, sink: Box<dyn LogSink>) -> Self {
        Self {
            core,
            sink,
            line: String::new(),
        }
    }

    pub(crate) fn run(mut self) {
        while !self.core.done.load(Ordering::Acquire) {
            if self.pass() == 0 {
                thread::yield_now();
            }
        }
        self.drain_all();
        self.sink.flush();
    }

    /// One round-robin pass. Returns the number of records consumed.
    fn pass(&mut self) -> usize {
        let core = Arc::clone(&self.core);
        let batch = core.config.batch;
        let mut consumed = 0;

        for node in core.producers.iter() {
            // The acquire pairs with the release in the handle's Drop:
            // once inactive is observed, the ring's final contents are
            // visible, so inactive + empty means empty forever.
            if !node.active.load(Ordering::Acquire) && node.ring.is_empty() {
                continue;
            }
            let mut drained = 0;
            while drained < batch {
                match node.ring.dequeue() {
                    Some(record) => {
                        self.emit(&record);
                        drained += 1;
                    }
                    None => break,
                }
            }
            consumed += drained;
        }

        if consumed > 0 {
            self.sink.flush();
        }
        consumed
    }

    /// Final drain: empty every ring regardless of batch and liveness.
    fn drain_all(&mut self) {
        let core = Arc::clone(&self.core);
        for node in core.producers.iter() {
            while let Some(record) = node.ring.dequeue() {
                self.emit(&record);
            }
        }
    }

    fn emit(&mut self, record: &Record) {
        self.line.clear();
        match self.core.formats.lookup(record.format_id()) {
            Some(literal) => format::render_into(&mut self.line, literal, record.args()),
            None => {
                // A record whose id was never registered is a build bug;
                // report it and keep going.
                let _ = write!(self.line, "<unknown fmt id={}>", record.format_id());
            }
        }
        format::truncate_to_boundary(&mut self.line, self.core.config.max_msg_len - 1);
        self.line.push('\n');
        self.sink.write_line(self.line.as_bytes());
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Sink that captures whole lines for assertions.
    pub(crate) struct TestSink {
        lines: Arc<Mutex<Vec<String>>>,
    }

    impl TestSink {
        pub(crate) fn new() -> (Self, Arc<Mutex<Vec<String>>>) {
            let lines = Arc::new(Mutex::new(Vec::new()));
            (
                Self {
                    lines: Arc::clone(&lines),
                },
                lines,
            )
        }
    }

    impl LogSink for TestSink {
        fn write_line(&mut self, line: &[u8]) {
            let text = String::from_utf8_lossy(line);
            self.lines
                .lock()
                .unwrap()
                .push(text.trim_end_matches('\n').to_string());
        }

        fn flush(&mut self) {}
    }

    #[test]
    fn test_writer_sink_appends() {
        let mut sink = WriterSink::new(Vec::new());
        sink.write_line(b"one\n");
        sink.write_line(b"two\n");
        sink.flush();
        assert_eq!(sink.inner, b"one\ntwo\n");
    }

    #[test]
    fn test_stdout_sink_does_not_panic() {
        let mut sink = StdoutSink::new();
        sink.write_line(b"[INFO] stdout sink check\n");
        sink.flush();
    }

    #[test]
    fn test_stderr_sink_does_not_panic() {
        let mut sink = StderrSink::new();
        sink.write_line(b"[ERROR] stderr sink check\n");
        sink.flush();
    }
}
