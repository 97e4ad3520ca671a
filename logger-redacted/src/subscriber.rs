use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt::{self, time::ChronoUtc},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer, Registry,
};

use crate::config::{LogFormat, LoggerConfig};
use crate::error::{LoggerError, Result};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Install the global tracing subscriber.
///
/// Console output goes to stderr.
/// `RUST_LOG` takes precedence over `config.level`. The returned guard must be
/// kept alive for as long as file logging should flush; it is `None` when no
/// file output is configured.
pub fn init_tracing(config: &LoggerConfig) -> Result<Option<WorkerGuard>> {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.level).map_err(|e| LoggerError::InvalidFilter {
            directive: config.level.clone(),
            reason: e.to_string(),
        })?,
    };

    let mut layers: Vec<BoxedLayer> = Vec::new();

    let console: BoxedLayer = match config.format {
        LogFormat::Pretty => fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_thread_ids(true)
            .with_line_number(true)
            .with_timer(ChronoUtc::rfc_3339())
            .with_ansi(config.ansi)
            .boxed(),
        LogFormat::Json => fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_timer(ChronoUtc::rfc_3339())
            .with_ansi(false)
            .json()
            .boxed(),
    };
    layers.push(console);

    let mut guard = None;
    if let Some(file) = &config.file {
        let appender = tracing_appender::rolling::daily(&file.directory, &file.file_prefix);
        let (writer, file_guard) = tracing_appender::non_blocking(appender);
        layers.push(
            fmt::layer()
                .with_writer(writer)
                .with_timer(ChronoUtc::rfc_3339())
                .with_ansi(false)
                .json()
                .boxed(),
        );
        guard = Some(file_guard);
    }

    tracing_subscriber::registry()
        .with(layers)
        .with(env_filter)
        .try_init()
        .map_err(|e| LoggerError::AlreadyInitialized(e.to_string()))?;

    tracing::debug!(
        format = ?config.format,
        file_output = config.file.is_some(),
        "Tracing initialised"
    );

    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_level_is_rejected() {
        if std::env::var("RUST_LOG").is_ok() {
            return;
        }
        let config = LoggerConfig {
            level: "nightingale=verbose".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            init_tracing(&config),
            Err(LoggerError::InvalidFilter { .. })
        ));
    }
}
