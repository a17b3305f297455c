use tracing::Subscriber;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

use crate::{
    config::LoggerConfig,
    error::{LoggerError, LoggerResult},
    format::LoggerFormat,
    timer::Rfc3339Timer,
};

/// Install the global tracing subscriber described by `cfg`.
///
/// Call once, early in `main`. With `tz = local`, call it before the tokio
/// runtime starts so offset detection can succeed.
pub fn init_logger(cfg: &LoggerConfig) -> LoggerResult<()> {
    match cfg.format {
        LoggerFormat::Text => text(cfg),
        LoggerFormat::Json => json(cfg),
        LoggerFormat::Journald => journald(cfg),
    }
}

fn span_events(cfg: &LoggerConfig) -> FmtSpan {
    if cfg.span_events {
        FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    }
}

fn text(cfg: &LoggerConfig) -> LoggerResult<()> {
    let layer = fmt::layer()
        .with_ansi(cfg.should_use_color())
        .with_target(cfg.with_targets)
        .with_span_events(span_events(cfg))
        .with_timer(Rfc3339Timer::new(cfg.tz));

    install(
        tracing_subscriber::registry()
            .with(cfg.level.to_env_filter()?)
            .with(layer),
    )
}

fn json(cfg: &LoggerConfig) -> LoggerResult<()> {
    let layer = fmt::layer()
        .json()
        .with_ansi(false)
        .with_target(cfg.with_targets)
        .with_current_span(true)
        .with_span_events(span_events(cfg))
        .with_timer(Rfc3339Timer::new(cfg.tz));

    install(
        tracing_subscriber::registry()
            .with(cfg.level.to_env_filter()?)
            .with(layer),
    )
}

#[cfg(target_os = "linux")]
fn journald(cfg: &LoggerConfig) -> LoggerResult<()> {
    let layer = tracing_journald::layer()
        .map_err(|e| LoggerError::JournaldInitFailed(e.to_string()))?
        .with_syslog_identifier("nong-agentd".to_string());

    install(
        tracing_subscriber::registry()
            .with(cfg.level.to_env_filter()?)
            .with(layer),
    )
}

#[cfg(not(target_os = "linux"))]
fn journald(_cfg: &LoggerConfig) -> LoggerResult<()> {
    Err(LoggerError::JournaldNotSupported)
}

fn install<S>(subscriber: S) -> LoggerResult<()>
where
    S: Subscriber + Send + Sync + 'static,
{
    subscriber
        .try_init()
        .map_err(|_| LoggerError::AlreadyInitialized)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn span_events_follow_config() {
        let mut cfg = LoggerConfig::default();
        assert_eq!(span_events(&cfg), FmtSpan::NONE);
        cfg.span_events = true;
        assert_eq!(span_events(&cfg), FmtSpan::CLOSE);
    }

    #[test]
    fn second_install_is_rejected() {
        let cfg = LoggerConfig {
            use_color: false,
            ..LoggerConfig::default()
        };
        // Whichever test installs first wins; the global default can be set only once.
        let _ = init_logger(&cfg);
        assert!(matches!(
            init_logger(&cfg),
            Err(LoggerError::AlreadyInitialized)
        ));
    }

    #[test]
    #[cfg(not(target_os = "linux"))]
    fn journald_is_unsupported_off_linux() {
        let cfg = LoggerConfig {
            format: LoggerFormat::Journald,
            ..LoggerConfig::default()
        };
        assert!(matches!(
            init_logger(&cfg),
            Err(LoggerError::JournaldNotSupported)
        ));
    }
}
