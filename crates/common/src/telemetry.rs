//! Tracing subscriber setup.

use {
    courier_config::LoggingConfig,
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

use crate::error::{Error, Result};

fn build_filter(level: &str) -> Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    EnvFilter::try_new(level).map_err(|e| Error::InvalidFilter {
        directive: level.to_string(),
        message: e.to_string(),
    })
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over `config.level`. Fails when the level is
/// not a valid filter directive or a global subscriber already exists.
pub fn init_telemetry(config: &LoggingConfig) -> Result<()> {
    let registry = tracing_subscriber::registry().with(build_filter(&config.level)?);

    if config.json {
        registry
            .with(fmt::layer().json().with_target(true).with_thread_ids(false))
            .try_init()?;
    } else {
        registry
            .with(fmt::layer().with_target(false).with_ansi(true))
            .try_init()?;
    }
    Ok(())
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bad_directive_is_rejected() {
        if std::env::var_os("RUST_LOG").is_some() {
            return;
        }
        let err = build_filter("courier=notalevel").unwrap_err();
        assert!(matches!(err, Error::InvalidFilter { .. }));
    }

    #[test]
    fn second_init_is_rejected() {
        let config = LoggingConfig::default();
        // Another test in this binary may have installed one already.
        let _ = init_telemetry(&config);
        let err = init_telemetry(&LoggingConfig {
            json: true,
            ..config
        })
        .unwrap_err();
        assert!(matches!(err, Error::Subscriber(_)));
    }
}
