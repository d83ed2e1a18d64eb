//! Structured logging.
//!
//! `init_logging` installs the process-wide subscriber exactly once, at
//! process start, and hands back a [`LoggingHandle`]. The handle owns the
//! non-blocking writer guards (dropping it flushes pending records) and the
//! root [`Logger`], which is passed explicitly into every service constructor.

use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::Span;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

#[derive(thiserror::Error, Debug)]
pub enum LoggingError {
    #[error("invalid log level '{level}': {reason}")]
    InvalidLevel { level: String, reason: String },
    #[error("failed to install subscriber: {0}")]
    Init(String),
}

#[derive(Debug, Default, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Default, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Rotation {
    #[default]
    Daily,
    Hourly,
    Never,
}

impl From<Rotation> for tracing_appender::rolling::Rotation {
    fn from(value: Rotation) -> Self {
        match value {
            Rotation::Daily => Self::DAILY,
            Rotation::Hourly => Self::HOURLY,
            Rotation::Never => Self::NEVER,
        }
    }
}

/// Rolling file sink. Records are always written as JSON.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct FileLogConfig {
    pub directory: PathBuf,
    pub file_name_prefix: String,
    #[serde(default)]
    pub rotation: Rotation,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive, e.g. `info` or `calculator=debug,tower_http=info`.
    /// `RUST_LOG` takes precedence when set.
    pub level: String,
    pub format: LogFormat,
    pub file: Option<FileLogConfig>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            format: LogFormat::Pretty,
            file: None,
        }
    }
}

fn level_rank(level: &str) -> Option<u8> {
    match level.trim().to_ascii_lowercase().as_str() {
        "off" => Some(0),
        "error" => Some(1),
        "warn" => Some(2),
        "info" => Some(3),
        "debug" => Some(4),
        "trace" => Some(5),
        _ => None,
    }
}

/// Map `-v` occurrences onto a filter level (-v info, -vv debug, -vvv trace).
///
/// Zero keeps the configured level. A plain configured level that is already
/// more verbose than the flag is kept; a per-target directive such as
/// `calculator=debug` is replaced by the flag's level.
#[must_use]
pub fn level_for_verbosity(verbose: u8, configured: &str) -> String {
    let requested = match verbose {
        0 => return configured.to_owned(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    match (level_rank(configured), level_rank(requested)) {
        (Some(have), Some(want)) if have >= want => configured.to_owned(),
        _ => requested.to_owned(),
    }
}

/// Logging capability handed to services.
///
/// Cloning is cheap. Request handlers open a child span per request through
/// [`Logger::request_span`] and emit their events inside it, so every record
/// carries the service name and request id.
#[derive(Clone, Debug)]
pub struct Logger {
    service: Arc<str>,
    root: Span,
}

impl Logger {
    #[must_use]
    pub fn new(service: &str) -> Self {
        let root = tracing::info_span!("service", service = %service);
        Self {
            service: Arc::from(service),
            root,
        }
    }

    /// A logger with no root span. Events still reach whatever subscriber is
    /// active; intended for tests and embedded use.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            service: Arc::from("disabled"),
            root: Span::none(),
        }
    }

    #[must_use]
    pub fn service(&self) -> &str {
        &self.service
    }

    #[must_use]
    pub fn root_span(&self) -> &Span {
        &self.root
    }

    /// Logger for a component embedded in this service. Its root span is a
    /// child of this logger's root.
    #[must_use]
    pub fn child(&self, service: &str) -> Self {
        let root = tracing::info_span!(parent: &self.root, "service", service = %service);
        Self {
            service: Arc::from(service),
            root,
        }
    }

    /// Child span for one request.
    ///
    /// The span's target is this crate, so per-target filters may drop it;
    /// callers also put `request_id` on the events they emit.
    #[must_use]
    pub fn request_span(&self, operation: &'static str, request_id: &str) -> Span {
        tracing::info_span!(
            parent: &self.root,
            "request",
            service = %self.service,
            operation,
            request_id = %request_id,
        )
    }
}

/// Owns the logging lifecycle for the process.
///
/// Keep it alive for as long as the process runs; dropping it flushes and
/// stops the background writers.
pub struct LoggingHandle {
    logger: Logger,
    _guards: Vec<WorkerGuard>,
}

impl LoggingHandle {
    #[must_use]
    pub fn logger(&self) -> Logger {
        self.logger.clone()
    }
}

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

fn build_filter(level: &str) -> Result<EnvFilter, LoggingError> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    EnvFilter::try_new(level).map_err(|e| LoggingError::InvalidLevel {
        level: level.to_owned(),
        reason: e.to_string(),
    })
}

/// Install the global subscriber and return the process logging handle.
///
/// Console output goes to stdout in the configured format; the optional
/// rolling file receives JSON records.
///
/// # Errors
/// Returns [`LoggingError::InvalidLevel`] for an unparsable filter and
/// [`LoggingError::Init`] if a global subscriber is already installed.
pub fn init_logging(cfg: &LoggingConfig, service_name: &str) -> Result<LoggingHandle, LoggingError> {
    let filter = build_filter(&cfg.level)?;

    let mut guards = Vec::new();
    let mut layers: Vec<BoxedLayer> = Vec::new();

    let (stdout, guard) = tracing_appender::non_blocking(std::io::stdout());
    guards.push(guard);
    let console = match cfg.format {
        LogFormat::Pretty => tracing_subscriber::fmt::layer()
            .with_writer(stdout)
            .with_target(true)
            .boxed(),
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .with_writer(stdout)
            .with_current_span(true)
            .with_span_list(false)
            .boxed(),
    };
    layers.push(console);

    if let Some(file) = &cfg.file {
        let appender = tracing_appender::rolling::RollingFileAppender::new(
            file.rotation.into(),
            &file.directory,
            &file.file_name_prefix,
        );
        let (writer, guard) = tracing_appender::non_blocking(appender);
        guards.push(guard);
        layers.push(
            tracing_subscriber::fmt::layer()
                .json()
                .with_ansi(false)
                .with_writer(writer)
                .boxed(),
        );
    }

    tracing_subscriber::registry()
        .with(layers)
        .with(filter)
        .try_init()
        .map_err(|e| LoggingError::Init(e.to_string()))?;

    let logger = Logger::new(service_name);
    tracing::debug!(
        parent: logger.root_span(),
        format = ?cfg.format,
        file = cfg.file.is_some(),
        "logging initialized"
    );

    Ok(LoggingHandle {
        logger,
        _guards: guards,
    })
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn verbosity_maps_to_levels() {
        assert_eq!(level_for_verbosity(0, "warn"), "warn");
        assert_eq!(level_for_verbosity(1, "warn"), "info");
        assert_eq!(level_for_verbosity(2, "warn"), "debug");
        assert_eq!(level_for_verbosity(3, "warn"), "trace");
        assert_eq!(level_for_verbosity(9, "warn"), "trace");
    }

    #[test]
    fn verbosity_never_lowers_configured_level() {
        assert_eq!(level_for_verbosity(1, "debug"), "debug");
        assert_eq!(level_for_verbosity(2, "TRACE"), "TRACE");
        assert_eq!(level_for_verbosity(3, "debug"), "trace");
    }

    #[test]
    fn verbosity_replaces_per_target_directives() {
        assert_eq!(level_for_verbosity(2, "calculator=trace"), "debug");
        assert_eq!(level_for_verbosity(0, "calculator=trace"), "calculator=trace");
    }

    #[test]
    fn logging_config_deserializes_partial_input() {
        let cfg: LoggingConfig = serde_json::from_value(serde_json::json!({
            "format": "json",
            "file": { "directory": "logs", "file_name_prefix": "calculator.log" }
        }))
        .unwrap();

        assert_eq!(cfg.level, "info");
        assert_eq!(cfg.format, LogFormat::Json);
        let file = cfg.file.unwrap();
        assert_eq!(file.rotation, Rotation::Daily);
        assert_eq!(file.file_name_prefix, "calculator.log");
    }

    #[test]
    fn invalid_level_is_rejected() {
        temp_env::with_var_unset("RUST_LOG", || {
            let err = build_filter("calculator=[[nope").unwrap_err();
            assert!(matches!(err, LoggingError::InvalidLevel { .. }));
        });
    }

    #[test]
    fn disabled_logger_produces_spans_without_panicking() {
        let logger = Logger::disabled();
        assert_eq!(logger.service(), "disabled");
        let span = logger.request_span("add", "req-1");
        span.in_scope(|| tracing::info!("inside"));
    }

    #[test]
    fn child_logger_has_its_own_name() {
        let parent = Logger::new("calculator-gateway");
        let child = parent.child("calculator");
        assert_eq!(child.service(), "calculator");
        assert_eq!(parent.service(), "calculator-gateway");
        child.request_span("add", "req-2").in_scope(|| tracing::info!("inside child"));
    }

    #[test]
    fn logger_keeps_service_name() {
        let logger = Logger::new("calculator");
        assert_eq!(logger.service(), "calculator");
        assert_eq!(logger.clone().service(), "calculator");
    }
}
