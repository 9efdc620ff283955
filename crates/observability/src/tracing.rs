use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber: JSON lines to stdout, filtered by
/// `RUST_LOG` (default `info`).
///
/// Safe to call more than once; later calls are no-ops, which keeps test
/// binaries that each call it from panicking.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .json()
        .with_env_filter(filter)
        .with_current_span(true)
        .try_init();
}
