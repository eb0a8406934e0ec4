use std::sync::Once;

static INIT: Once = Once::new();

/// Wire the tracing output to the test run; honoured via RUST_LOG.
pub fn init_logs() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}
