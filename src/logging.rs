//! Log subscriber setup for the binary.
//!
//! `RUST_LOG` wins when set; otherwise `warn`, or `tekstil=debug` with
//! `--verbose`. Output goes to stderr so command output on stdout stays
//! pipeable. `TEKSTIL_LOG_FORMAT=json` switches to JSON lines.

use tracing::Subscriber;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::util::SubscriberInitExt;

pub const LOG_FORMAT_ENV: &str = "TEKSTIL_LOG_FORMAT";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl LogFormat {
    pub fn from_env_value(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_ascii_lowercase()) {
            Some(v) if v == "json" => LogFormat::Json,
            _ => LogFormat::Text,
        }
    }
}

pub fn default_directive(verbose: bool) -> &'static str {
    if verbose { "tekstil=debug" } else { "warn" }
}

/// Build the stderr subscriber without installing it.
pub fn subscriber(
    verbose: bool,
    format: LogFormat,
    filter: EnvFilter,
) -> Box<dyn Subscriber + Send + Sync> {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(verbose);

    match format {
        LogFormat::Json => Box::new(builder.json().finish()),
        LogFormat::Text => Box::new(builder.finish()),
    }
}

/// Install the global subscriber. A second call is a no-op.
pub fn init(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));
    let format = LogFormat::from_env_value(std::env::var(LOG_FORMAT_ENV).ok().as_deref());

    let _ = subscriber(verbose, format, filter).try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_env_value() {
        assert_eq!(LogFormat::from_env_value(Some("JSON")), LogFormat::Json);
        assert_eq!(LogFormat::from_env_value(Some("text")), LogFormat::Text);
        assert_eq!(LogFormat::from_env_value(None), LogFormat::Text);
    }

    #[test]
    fn test_default_directive() {
        assert_eq!(default_directive(false), "warn");
        assert_eq!(default_directive(true), "tekstil=debug");
    }

    #[test]
    fn test_default_directives_filter_levels() {
        let quiet = subscriber(false, LogFormat::Text, EnvFilter::new(default_directive(false)));
        tracing::subscriber::with_default(quiet, || {
            assert!(tracing::enabled!(tracing::Level::WARN));
            assert!(!tracing::enabled!(tracing::Level::DEBUG));
        });

        let verbose = subscriber(true, LogFormat::Json, EnvFilter::new(default_directive(true)));
        tracing::subscriber::with_default(verbose, || {
            assert!(tracing::enabled!(tracing::Level::DEBUG));
        });
    }
}
