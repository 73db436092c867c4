// End-to-end scenarios through the macro surface and the process-wide
// logger. Everything lives in one test function because the global
// logger is installed once per process and shutdown is terminal.

use hotlog::{log_debug, log_info, log_warn, Config, LogSink};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

struct CaptureSink {
    lines: Arc<Mutex<Vec<String>>>,
}

impl LogSink for CaptureSink {
    fn write_line(&mut self, line: &[u8]) {
        let text = String::from_utf8_lossy(line);
        self.lines
            .lock()
            .unwrap()
            .push(text.trim_end_matches('\n').to_string());
    }

    fn flush(&mut self) {}
}

fn wait_until(lines: &Arc<Mutex<Vec<String>>>, predicate: impl Fn(&[String]) -> bool) {
    let deadline = Instant::now() + Duration::from_secs(5);
    loop {
        if predicate(&lines.lock().unwrap()) {
            return;
        }
        assert!(Instant::now() < deadline, "consumer did not catch up in time");
        thread::sleep(Duration::from_millis(2));
    }
}

#[test]
fn test_global_logger_scenarios() {
    let lines = Arc::new(Mutex::new(Vec::new()));
    hotlog::init_with_sink(
        Config::default(),
        Box::new(CaptureSink {
            lines: Arc::clone(&lines),
        }),
    )
    .expect("first init in this process");

    // --- Single thread: program order reaches the sink in order ---
    log_info!("Test {}", 42);
    log_debug!("Hello {}", "world");
    log_warn!("Number: {}", 1.234);

    wait_until(&lines, |l| l.len() >= 3);
    {
        let lines = lines.lock().unwrap();
        assert_eq!(lines[0], "[INFO] Test 42");
        assert_eq!(lines[1], "[DEBUG] Hello world");
        assert!(
            lines[2].starts_with("[WARNING] Number: 1.234"),
            "got {:?}",
            lines[2]
        );
    }

    // --- Two threads: both substreams arrive, each in program order ---
    let worker = thread::spawn(|| {
        for i in 0..5u32 {
            log_debug!("T{}", i);
        }
    });
    for i in 0..5u32 {
        log_info!("M{}", i);
    }
    worker.join().unwrap();

    wait_until(&lines, |l| l.len() >= 13);
    {
        let lines = lines.lock().unwrap();
        let t_stream: Vec<&String> = lines.iter().filter(|l| l.starts_with("[DEBUG] T")).collect();
        let m_stream: Vec<&String> = lines.iter().filter(|l| l.starts_with("[INFO] M")).collect();
        assert_eq!(t_stream.len(), 5);
        assert_eq!(m_stream.len(), 5);
        for i in 0..5 {
            assert_eq!(*t_stream[i], format!("[DEBUG] T{}", i));
            assert_eq!(*m_stream[i], format!("[INFO] M{}", i));
        }
    }

    // --- Shutdown flushes everything enqueued before the call ---
    log_info!("Before shutdown");
    hotlog::shutdown();
    assert!(lines
        .lock()
        .unwrap()
        .iter()
        .any(|l| l == "[INFO] Before shutdown"));

    // Idempotent: a second shutdown is a no-op.
    let count = lines.lock().unwrap().len();
    hotlog::shutdown();
    assert_eq!(lines.lock().unwrap().len(), count);

    // Nothing was dropped along the way.
    assert_eq!(hotlog::dropped(), 0);
}
