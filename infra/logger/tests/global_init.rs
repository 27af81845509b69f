use depot_logger::{Logger, LoggerError};
use serial_test::serial;

#[test]
#[serial]
fn console_logger_installs_once() {
    let logger = Logger::builder().name("depot-console").init().unwrap();
    assert!(!logger.writes_files());

    let err = Logger::builder().name("depot-console-again").init().unwrap_err();
    assert!(matches!(err, LoggerError::Subscriber { .. }), "{err}");
}
