//! Tests for `src/logging.rs`.

use genesis_kernel::logging::LoggingGuard;

#[test]
fn logging_guard_is_send() {
    fn assert_send<T: Send>() {}
    assert_send::<LoggingGuard>();
}

#[test]
fn init_production_creates_logs_dir() {
    let tmp = tempfile::tempdir().expect("should create temp dir");
    let logs_dir = tmp.path().join("logs");
    assert!(!logs_dir.exists());

    // Only one global subscriber can exist per process, so the call may
    // return an error if another test got there first. The directory is
    // created before the subscriber is installed either way.
    let _result = genesis_kernel::logging::init_production(&logs_dir, "info");
    assert!(logs_dir.exists(), "logs directory should be created");
}

#[test]
fn init_cli_is_idempotent() {
    genesis_kernel::logging::init_cli("debug");
    genesis_kernel::logging::init_cli("debug");
}
