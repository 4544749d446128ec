use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Environment variable that overrides the log filter, e.g. `ARSYNC_LOG=debug`.
pub const LOG_ENV: &str = "ARSYNC_LOG";

/// Maps the number of `-v` flags to a default log level.
pub fn default_level(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    }
}

/// Setup logging to stderr, so rsync output on stdout stays clean.
///
/// `ARSYNC_LOG` takes precedence over the verbosity flags. Calling this more
/// than once keeps the first subscriber.
pub fn setup_logging(verbosity: u8) {
    let env_filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(default_level(verbosity)));

    let result = tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .without_time(),
        )
        .try_init();

    if result.is_ok() {
        tracing::debug!("Logging initialized: verbosity={verbosity}");
    }
}
