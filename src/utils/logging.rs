use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;

/// Install the stderr subscriber. `RUST_LOG` overrides the default `warn` level.
///
/// Safe to call more than once; later calls are ignored.
pub fn setup_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = fmt().with_env_filter(filter).with_writer(std::io::stderr).without_time().try_init();
}
