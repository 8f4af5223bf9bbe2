//! Log output setup and the span every account operation runs in

use std::str::FromStr;

use tracing::Span;
use tracing_subscriber::{EnvFilter, fmt::format::FmtSpan};
use uuid::Uuid;

/// Log line layout
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Multi-line, colored
    Pretty,
    #[default]
    Compact,
    /// One JSON object per line
    Json,
}

impl LogFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogFormat::Pretty => "pretty",
            LogFormat::Compact => "compact",
            LogFormat::Json => "json",
        }
    }
}

impl FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "compact" => Ok(LogFormat::Compact),
            "json" => Ok(LogFormat::Json),
            other => Err(anyhow::anyhow!("unknown log format: {other}")),
        }
    }
}

/// Subscriber settings for the account service
#[derive(Debug, Clone)]
pub struct LogConfig {
    pub format: LogFormat,
    /// `EnvFilter` directive, e.g. `info,iam_core=debug`
    pub filter: String,
    /// Emit an event with busy/idle timings when an `account_operation` span closes
    pub span_timings: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self { format: LogFormat::default(), filter: "info".to_string(), span_timings: false }
    }
}

impl LogConfig {
    pub fn new(format: LogFormat, filter: impl Into<String>) -> Self {
        Self { format, filter: filter.into(), ..Default::default() }
    }
}

/// Install the global subscriber.
///
/// Fails on a malformed filter directive or when a subscriber is already set.
pub fn init_logging(config: &LogConfig) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_new(&config.filter)?;
    let span_events = if config.span_timings { FmtSpan::CLOSE } else { FmtSpan::NONE };
    let builder = tracing_subscriber::fmt().with_env_filter(env_filter).with_span_events(span_events);

    let installed = match config.format {
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Compact => builder.compact().with_target(false).try_init(),
        LogFormat::Json => builder.json().with_current_span(true).try_init(),
    };
    installed.map_err(|e| anyhow::anyhow!("failed to install {} subscriber: {e}", config.format.as_str()))?;

    tracing::info!(format = config.format.as_str(), filter = %config.filter, "Logging initialized");
    Ok(())
}

/// Create the span an account operation runs in.
///
/// Each span carries a fresh `request_id`; `outcome` is filled in by
/// [`record_outcome`] once the operation finishes.
pub fn account_span(operation: &str, account_name: &str) -> Span {
    tracing::info_span!(
        "account_operation",
        operation = operation,
        account_name = account_name,
        request_id = %Uuid::new_v4(),
        outcome = tracing::field::Empty,
        duration_ms = tracing::field::Empty,
    )
}

/// Record the result of an account operation on its span
pub fn record_outcome(span: &Span, outcome: &str, duration_ms: u128) {
    span.record("outcome", outcome);
    span.record("duration_ms", duration_ms);
}
