//! Shared helpers for tracked integration tests.

#![allow(dead_code)]

use std::sync::Once;

use tracked::EventLog;
use tracing_subscriber::EnvFilter;

static INIT: Once = Once::new();

/// Install a test-writer subscriber once per test binary.
///
/// Honors `RUST_LOG`; defaults to `warn` so passing runs stay quiet.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}

/// The log as `(subject, relation, outcome)` triples.
pub fn triples(log: &EventLog) -> Vec<(String, char, bool)> {
    log.snapshot()
        .iter()
        .map(|e| (e.subject().name(), e.relation().symbol(), e.outcome()))
        .collect()
}

/// Build an expected triple.
pub fn ev(subject: &str, relation: char, outcome: bool) -> (String, char, bool) {
    (subject.to_owned(), relation, outcome)
}
