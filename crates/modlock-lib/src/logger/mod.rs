use crate::primitives::*;
use std::sync::OnceLock;
use tracing_indicatif::IndicatifLayer;
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Global logger instance - ensures single initialization
static GLOBAL_LOGGER: OnceLock<Logger> = OnceLock::new();

/// HTTP stack crates that are far too chatty below `warn`
const QUIET_CRATES: &[&str] = &["hyper", "hyper_util", "reqwest", "h2", "rustls", "mio", "want"];

/// Logger implementation using tracing with indicatif progress integration
#[derive(Debug)]
pub struct Logger {
    config: LoggerConfig,
}

impl Logger {
    /// Initialize the global logger
    pub fn init(config: LoggerConfig) -> Result<&'static Self, LoggerError> {
        if GLOBAL_LOGGER.get().is_some() {
            return Err(LoggerError::AlreadyInitialized);
        }

        let indicatif_layer = IndicatifLayer::new();

        let env_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(default_filter(config.level)));

        let writer = match config.output {
            LogOutput::Stderr => indicatif_layer.get_stderr_writer().boxed_writer(),
            LogOutput::Stdout => indicatif_layer.get_stdout_writer().boxed_writer(),
        };

        let fmt_layer = match config.format {
            LogFormat::Text => fmt::layer()
                .with_writer(writer)
                .with_ansi(config.color)
                .with_target(false)
                .compact()
                .boxed(),
            LogFormat::Json => fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .json()
                .boxed(),
            LogFormat::Pretty => fmt::layer()
                .with_writer(writer)
                .with_ansi(config.color)
                .pretty()
                .boxed(),
        };

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .with(indicatif_layer)
            .try_init()
            .map_err(|e| LoggerError::InitializationFailed {
                reason: e.to_string(),
            })?;

        let logger = GLOBAL_LOGGER.get_or_init(|| Logger {
            config: config.clone(),
        });

        tracing::debug!(
            level = ?config.level,
            format = ?config.format,
            output = ?config.output,
            color = config.color,
            "Logger initialized"
        );

        Ok(logger)
    }

    /// Get reference to the global logger instance
    pub fn global() -> Option<&'static Self> {
        GLOBAL_LOGGER.get()
    }

    pub fn is_initialized() -> bool {
        GLOBAL_LOGGER.get().is_some()
    }

    /// Configuration the logger was installed with
    pub fn config(&self) -> &LoggerConfig {
        &self.config
    }
}

/// Filter used when `RUST_LOG` is not set: modlock at the configured level,
/// HTTP plumbing at warn, everything else at the configured level
pub fn default_filter(level: LogLevel) -> String {
    let level = level.as_filter();
    let mut directives = vec![format!("modlock={level}"), format!("modlock_lib={level}")];
    directives.extend(QUIET_CRATES.iter().map(|krate| format!("{krate}=warn")));
    directives.push(level.to_string());
    directives.join(",")
}

/// Erase the concrete indicatif writer type so both outputs share one match arm type
trait BoxedWriter {
    fn boxed_writer(self) -> fmt::writer::BoxMakeWriter;
}

impl<W> BoxedWriter for W
where
    W: for<'a> fmt::MakeWriter<'a> + Send + Sync + 'static,
{
    fn boxed_writer(self) -> fmt::writer::BoxMakeWriter {
        fmt::writer::BoxMakeWriter::new(self)
    }
}

#[cfg(test)]
mod tests {
    include!("mod.test.rs");
}
