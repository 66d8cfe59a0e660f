//! Logging init for the CLI: structured logs on stderr, filtered by `RUST_LOG` or `-v`.

use tracing_subscriber::EnvFilter;

/// Default filter for a given number of `-v` flags.
pub fn default_filter(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info,domimages_core=debug,domimages_net=debug",
        _ => "trace",
    }
}

/// Initialize logging to stderr. `RUST_LOG` wins over `verbosity` when set.
/// Safe to call more than once; later calls are ignored.
pub fn init_logging(verbosity: u8) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbosity)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .try_init();
}
