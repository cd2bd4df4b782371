use anyhow::{Context, Result};
use tracing_subscriber::{
    fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry,
};

use crate::config::{Config, LogFormat, LoggingConfig, StoreTarget};

/// Build the level filter; `RUST_LOG` wins over the configured level
pub fn env_filter(level: &str) -> Result<EnvFilter> {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .context("Invalid log level configuration")
}

/// Initialize the tracing subscriber
///
/// Everything is written to stderr; stdout belongs to the session.
pub fn init_telemetry(config: &LoggingConfig) -> Result<()> {
    let registry = Registry::default().with(env_filter(&config.level)?);

    match config.format {
        LogFormat::Pretty => {
            let fmt_layer = fmt::layer()
                .pretty()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_file(true)
                .with_line_number(true);

            registry.with(fmt_layer).init();
        }
        LogFormat::Json => {
            let fmt_layer = fmt::layer()
                .json()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_span_list(true)
                .flatten_event(true);

            registry.with(fmt_layer).init();
        }
        LogFormat::Compact => {
            let fmt_layer = fmt::layer()
                .compact()
                .with_writer(std::io::stderr)
                .with_target(false);

            registry.with(fmt_layer).init();
        }
    }

    tracing::debug!(
        log_level = %config.level,
        log_format = ?config.format,
        "Telemetry initialized"
    );

    Ok(())
}

/// Log where the session is going to connect
pub fn log_startup_info(config: &Config, target: &StoreTarget) {
    tracing::info!(
        store = %target.describe(),
        connect_timeout_s = config.database.connect_timeout,
        statement_timeout_s = config.database.statement_timeout,
        init_schema = config.database.init_schema,
        "todo starting up"
    );
}

/// Log an error together with its cause chain
pub fn report_error(error: &anyhow::Error, context: &str) {
    tracing::error!(
        error = %error,
        context = context,
        "Operation failed"
    );

    for (depth, cause) in error.chain().skip(1).enumerate() {
        tracing::error!(
            error = %cause,
            depth = depth + 1,
            "Error cause"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_filter_accepts_known_levels() {
        for level in ["trace", "debug", "info", "warn", "error"] {
            assert!(env_filter(level).is_ok(), "level {level} rejected");
        }
    }

    #[test]
    fn test_report_error_walks_the_chain() {
        let error = anyhow::anyhow!("socket closed").context("connect failed");
        // Only checks that reporting without a subscriber does not panic
        report_error(&error, "startup");
        assert_eq!(error.chain().count(), 2);
    }
}
