//! Logging setup for the digest binary.
//!
//! Library code only emits `tracing` events; installing a subscriber is the
//! binary's job. `RUST_LOG` always wins over the configured levels.

use crate::config::DigestConfig;
use tracing::Level;

/// Configuration for the logging subscriber.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Log level for dependencies (DataFusion, sqlx, lettre, ...)
    pub level: Level,
    /// Log level for this crate
    pub digest_level: Level,
    /// Whether to use JSON output format
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Level::WARN,
            digest_level: Level::INFO,
            json_format: false,
        }
    }
}

impl LoggingConfig {
    /// Creates a configuration for scheduled production runs: JSON lines for
    /// a log collector.
    pub fn production() -> Self {
        Self {
            json_format: true,
            ..Self::default()
        }
    }

    /// Picks the preset named by `DQ_LOG_FORMAT`.
    pub fn from_config(config: &DigestConfig) -> Self {
        if config.json_logs {
            Self::production()
        } else {
            Self::default()
        }
    }

    /// Builds the environment filter string.
    pub fn env_filter(&self) -> String {
        format!(
            "{},dq_digest={}",
            self.level.as_str().to_lowercase(),
            self.digest_level.as_str().to_lowercase()
        )
    }
}

/// Installs the global subscriber.
///
/// # Examples
///
/// ```rust,no_run
/// use dq_digest::logging::{init_logging, LoggingConfig};
///
/// init_logging(LoggingConfig::production()).unwrap();
/// ```
pub fn init_logging(config: LoggingConfig) -> Result<(), Box<dyn std::error::Error>> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(config.env_filter()));

    let fmt_layer = if config.json_format {
        tracing_subscriber::fmt::layer().json().boxed()
    } else {
        tracing_subscriber::fmt::layer().boxed()
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter() {
        assert_eq!(LoggingConfig::default().env_filter(), "warn,dq_digest=info");
    }

    #[test]
    fn test_log_format_selects_preset() {
        let lookup = |format: &'static str| {
            move |key: &str| {
                let value = match key {
                    "DQ_LOG_FORMAT" => format,
                    "DATABASE_URL" => "postgres://dq@localhost/warehouse",
                    "EMAIL_ADDRESS" => "digest@example.com",
                    "EMAIL_PASSWORD" => "secret",
                    "RECIPIENT_EMAIL" => "owner@example.com",
                    _ => return None,
                };
                Some(value.to_string())
            }
        };

        let json = DigestConfig::from_lookup(lookup("json")).unwrap();
        let config = LoggingConfig::from_config(&json);
        assert!(config.json_format);
        assert_eq!(config.env_filter(), "warn,dq_digest=info");

        let text = DigestConfig::from_lookup(lookup("text")).unwrap();
        assert!(!LoggingConfig::from_config(&text).json_format);
    }
}
