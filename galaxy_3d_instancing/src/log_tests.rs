//! Unit tests for log.rs
//!
//! Tests Logger trait, LogEntry, LogSeverity, DefaultLogger and MemoryLogger.

use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger, MemoryLogger};
use std::time::SystemTime;

fn entry(severity: LogSeverity, message: &str) -> LogEntry {
    LogEntry {
        severity,
        timestamp: SystemTime::now(),
        source: "galaxy3d::Test".to_string(),
        message: message.to_string(),
        file: None,
        line: None,
    }
}

// ============================================================================
// LOG SEVERITY TESTS
// ============================================================================

#[test]
fn test_log_severity_ordering() {
    assert!(LogSeverity::Trace < LogSeverity::Debug);
    assert!(LogSeverity::Debug < LogSeverity::Info);
    assert!(LogSeverity::Info < LogSeverity::Warn);
    assert!(LogSeverity::Warn < LogSeverity::Error);
}

#[test]
fn test_log_severity_debug() {
    assert_eq!(format!("{:?}", LogSeverity::Trace), "Trace");
    assert_eq!(format!("{:?}", LogSeverity::Warn), "Warn");
    assert_eq!(format!("{:?}", LogSeverity::Error), "Error");
}

// ============================================================================
// LOG ENTRY TESTS
// ============================================================================

#[test]
fn test_log_entry_creation_without_file_line() {
    let e = entry(LogSeverity::Info, "Partition created");
    assert_eq!(e.severity, LogSeverity::Info);
    assert_eq!(e.source, "galaxy3d::Test");
    assert_eq!(e.message, "Partition created");
    assert!(e.file.is_none());
    assert!(e.line.is_none());
}

#[test]
fn test_log_entry_creation_with_file_line() {
    let e = LogEntry {
        file: Some("partition.rs"),
        line: Some(42),
        ..entry(LogSeverity::Error, "Broken back-reference")
    };
    assert_eq!(e.file, Some("partition.rs"));
    assert_eq!(e.line, Some(42));
}

// ============================================================================
// DEFAULT LOGGER TESTS
// ============================================================================

#[test]
fn test_default_logger_all_severities() {
    let logger = DefaultLogger;
    for severity in [
        LogSeverity::Trace,
        LogSeverity::Debug,
        LogSeverity::Info,
        LogSeverity::Warn,
        LogSeverity::Error,
    ] {
        logger.log(&entry(severity, "message"));
    }
}

#[test]
fn test_logger_trait_is_send_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<DefaultLogger>();
    assert_send_sync::<MemoryLogger>();
}

// ============================================================================
// MEMORY LOGGER TESTS
// ============================================================================

#[test]
fn test_memory_logger_records_entries() {
    let logger = MemoryLogger::new();
    logger.log(&entry(LogSeverity::Info, "first"));
    logger.log(&entry(LogSeverity::Warn, "second"));

    let entries = logger.entries();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].message, "first");
    assert_eq!(entries[1].message, "second");
}

#[test]
fn test_memory_logger_clones_share_storage() {
    let logger = MemoryLogger::new();
    let installed = logger.clone();
    installed.log(&entry(LogSeverity::Warn, "shared"));
    assert_eq!(logger.entries().len(), 1);
}

#[test]
fn test_memory_logger_filter_by_severity() {
    let logger = MemoryLogger::new();
    logger.log(&entry(LogSeverity::Debug, "a"));
    logger.log(&entry(LogSeverity::Warn, "b"));
    logger.log(&entry(LogSeverity::Warn, "c"));

    let warnings = logger.entries_with_severity(LogSeverity::Warn);
    assert_eq!(warnings.len(), 2);
    assert!(warnings.iter().all(|e| e.severity == LogSeverity::Warn));
}

#[test]
fn test_memory_logger_clear() {
    let logger = MemoryLogger::new();
    logger.log(&entry(LogSeverity::Info, "x"));
    logger.clear();
    assert!(logger.entries().is_empty());
}
