//! Logging setup. Records go to stderr: stdout carries the plugin response.
use anyhow::Context;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

pub const LOG_ENV: &str = "TWIRPGEN_LOG";
const DEFAULT_FILTER: &str = "warn";

/// Installs the global subscriber. `level` wins over [`LOG_ENV`], which wins over `warn`.
///
/// An invalid `level` is an error. An invalid [`LOG_ENV`] falls back to `warn`.
pub fn init(level: Option<&str>) -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(filter(level)?)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .without_time()
                .compact(),
        )
        .init();
    Ok(())
}

fn filter(level: Option<&str>) -> anyhow::Result<EnvFilter> {
    match level {
        Some(level) => {
            EnvFilter::try_new(level).with_context(|| format!("Invalid log filter '{level}'"))
        }
        None => Ok(EnvFilter::try_from_env(LOG_ENV)
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_filters() {
        assert!(filter(Some("debug")).is_ok());
        assert!(filter(Some("twirpgen_core=trace,warn")).is_ok());
    }

    #[test]
    fn test_invalid_filter_is_an_error() {
        let err = filter(Some("twirpgen_core=loud")).unwrap_err();
        assert_eq!(err.to_string(), "Invalid log filter 'twirpgen_core=loud'");
    }
}
