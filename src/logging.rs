//! Tracing subscriber setup for the binary and the API server.

use tracing_subscriber::EnvFilter;

/// Default filter when `RUST_LOG` is unset.
const DEFAULT_FILTER: &str = "info";

/// Installs a stderr fmt subscriber filtered by `RUST_LOG`.
///
/// Safe to call more than once; later calls are no-ops. `verbose` raises the
/// fallback filter to `debug` when `RUST_LOG` is not set.
pub fn init(verbose: bool) {
    let fallback = if verbose { "debug" } else { DEFAULT_FILTER };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::init;

    #[test]
    fn init_is_idempotent() {
        init(false);
        init(true);
        tracing::info!("logging initialised twice without panicking");
    }
}
