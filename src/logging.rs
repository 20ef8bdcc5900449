use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::stderr_buffer::BufferedStderr;

/// Environment variable holding filter directives, e.g. `sunan_radar=trace`.
pub const LOG_ENV: &str = "SUNAN_RADAR_LOG";

fn default_directives(verbose: bool) -> &'static str {
    if verbose {
        "sunan_radar=debug"
    } else {
        "sunan_radar=warn"
    }
}

/// Install the global subscriber. Events go to stderr through the stderr
/// buffer, so nothing is printed over the dashboard while it is open.
/// Calling this twice is harmless.
pub fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(default_directives(verbose)));

    let result = tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(BufferedStderr)
                .with_ansi(false)
                .with_target(verbose)
                .without_time(),
        )
        .try_init();

    if result.is_err() {
        tracing::debug!("logging already initialised");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directives() {
        assert_eq!(default_directives(true), "sunan_radar=debug");
        assert_eq!(default_directives(false), "sunan_radar=warn");
    }

    #[test]
    fn test_init_twice_is_harmless() {
        init_logging(false);
        init_logging(true);
    }
}
