//! Subscriber setup for binaries and tests embedding the provider.
//!
//! The crates themselves only emit `tracing` events. Nothing here runs unless
//! the application asks for it.

use std::collections::BTreeMap;

use serde::Deserialize;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("invalid log filter `{directives}`: {source}")]
    InvalidFilter {
        directives: String,
        #[source]
        source: ParseError,
    },

    #[error("a global tracing subscriber is already installed")]
    AlreadyInstalled(#[from] TryInitError),
}

/// Line format of emitted events.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// What to log and how. Deserializable so it can sit in an app config file.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Level for every target without an override, e.g. `"info"`.
    pub level: String,
    /// Per-crate levels, keyed by crate name (`multirpc-http` or `multirpc_http`).
    pub overrides: BTreeMap<String, String>,
    pub format: LogFormat,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            overrides: BTreeMap::new(),
            format: LogFormat::Text,
        }
    }
}

impl LogConfig {
    /// `EnvFilter` directive string, e.g. `"info,multirpc_core=debug"`.
    pub fn directives(&self) -> String {
        std::iter::once(self.level.clone())
            .chain(
                self.overrides
                    .iter()
                    .map(|(target, level)| format!("{}={level}", target.replace('-', "_"))),
            )
            .collect::<Vec<_>>()
            .join(",")
    }

    pub fn filter(&self) -> Result<EnvFilter, LoggingError> {
        let directives = self.directives();
        EnvFilter::try_new(&directives)
            .map_err(|source| LoggingError::InvalidFilter { directives, source })
    }
}

/// Install the global subscriber described by `config`.
///
/// A malformed level or override is reported instead of being replaced by a
/// default, and nothing is installed in that case.
pub fn init_tracing(config: &LogConfig) -> Result<(), LoggingError> {
    let filter = config.filter()?;
    let json = (config.format == LogFormat::Json).then(|| fmt::layer().json());
    let text = (config.format == LogFormat::Text).then(fmt::layer);

    tracing_subscriber::registry()
        .with(filter)
        .with(json)
        .with(text)
        .try_init()?;
    Ok(())
}
