use tracing_subscriber::EnvFilter;

/// Install the global subscriber once. Output goes to stderr so stdio MCP
/// framing on stdout stays clean. `RUST_LOG` overrides the `info` default.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Log a metric line and feed the `metrics` facade. `*_ms` metrics are
/// recorded as histograms, everything else as counters.
pub fn log_metric(op: &str, metric: &str, value: f64) {
    tracing::info!(op, metric, value, "metric");
    if metric.ends_with("_ms") {
        metrics::histogram!(metric.to_owned(), "op" => op.to_owned()).record(value);
    } else {
        metrics::counter!(metric.to_owned(), "op" => op.to_owned()).increment(value as u64);
    }
}
