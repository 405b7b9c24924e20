use std::thread;

use herald::telemetry::{TracingConfig, TracingError, init_global_tracing};

// A global subscriber can be installed once per process, so this binary holds a single test.
#[test]
fn global_tracing_installs_once_for_all_threads() {
    let config = TracingConfig {
        log_to_stderr: false,
        ..TracingConfig::default()
    };

    let _guard = init_global_tracing(&config).expect("first install succeeds");

    let seen_on_worker = thread::spawn(tracing::dispatcher::has_been_set)
        .join()
        .unwrap();
    assert!(seen_on_worker);

    let err = init_global_tracing(&config).unwrap_err();
    assert!(matches!(err, TracingError::AlreadyInstalled(_)));
}
