use tracing_subscriber::EnvFilter;

/// Initializes the stderr subscriber. An explicit `RUST_LOG` wins over the
/// level derived from the command line.
pub fn init(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    // Ignore errors when setting, since tests can initialize this
    // multiple times.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
