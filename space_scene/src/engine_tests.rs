//! Unit tests for the Engine log sink
//!
//! LOGGER is a global OnceLock shared across all tests, so every test
//! touching it runs with #[serial].

use crate::space::Engine;
use crate::space::log::{Logger, LogEntry, LogSeverity};
use std::sync::{Arc, Mutex};
use serial_test::serial;

// ============================================================================
// TEST HELPERS
// ============================================================================

#[derive(Clone)]
struct TestLogger {
    entries: Arc<Mutex<Vec<(LogSeverity, String, bool)>>>,
}

impl TestLogger {
    fn new() -> Self {
        Self { entries: Arc::new(Mutex::new(Vec::new())) }
    }
}

impl Logger for TestLogger {
    fn log(&self, entry: &LogEntry) {
        // Unserialized tests elsewhere may log concurrently
        if entry.source != "space::Test" {
            return;
        }
        self.entries.lock().unwrap().push((
            entry.severity,
            entry.message.clone(),
            entry.file.is_some(),
        ));
    }
}

// ============================================================================
// LOGGER API TESTS
// ============================================================================

#[test]
#[serial]
fn test_set_logger_receives_simple_logs() {
    let logger = TestLogger::new();
    Engine::set_logger(logger.clone());

    Engine::log(LogSeverity::Info, "space::Test", "hello".to_string());

    let entries = logger.entries.lock().unwrap().clone();
    Engine::reset_logger();
    assert_eq!(entries, vec![(LogSeverity::Info, "hello".to_string(), false)]);
}

#[test]
#[serial]
fn test_log_detailed_carries_location() {
    let logger = TestLogger::new();
    Engine::set_logger(logger.clone());

    Engine::log_detailed(LogSeverity::Error, "space::Test", "boom".to_string(), "x.rs", 3);

    let entries = logger.entries.lock().unwrap().clone();
    Engine::reset_logger();
    assert_eq!(entries.len(), 1);
    assert!(entries[0].2);
}

#[test]
#[serial]
fn test_macros_route_through_engine() {
    let logger = TestLogger::new();
    Engine::set_logger(logger.clone());

    crate::engine_trace!("space::Test", "t {}", 1);
    crate::engine_debug!("space::Test", "d");
    crate::engine_info!("space::Test", "i");
    crate::engine_warn!("space::Test", "w");
    crate::engine_error!("space::Test", "e");

    let severities: Vec<LogSeverity> =
        logger.entries.lock().unwrap().iter().map(|e| e.0).collect();
    Engine::reset_logger();
    assert_eq!(severities, vec![
        LogSeverity::Trace,
        LogSeverity::Debug,
        LogSeverity::Info,
        LogSeverity::Warn,
        LogSeverity::Error,
    ]);
}

#[test]
#[serial]
fn test_reset_logger_detaches_custom_logger() {
    let logger = TestLogger::new();
    Engine::set_logger(logger.clone());
    Engine::reset_logger();

    Engine::log(LogSeverity::Error, "space::Test", "not captured".to_string());
    assert!(logger.entries.lock().unwrap().is_empty());
}
