use crate::{
    config::LogConfig,
    error::{
        BoardError,
        Result,
    },
};
use tracing_appender::{
    non_blocking::WorkerGuard,
    rolling::{
        RollingFileAppender,
        Rotation,
    },
};
use tracing_subscriber::{
    EnvFilter,
    fmt,
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

/// Keeps the background log writer alive; drop it only at exit.
pub struct LogGuard {
    _guard: WorkerGuard,
}

/// File logging always; console output only when no terminal UI owns stdout.
pub fn init_tracing(config: &LogConfig, console: bool) -> Result<LogGuard> {
    let file_appender = rolling_file(config)?;
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.level));

    let file_layer = fmt::layer()
        .with_writer(file_writer)
        .with_ansi(false)
        .with_target(false);
    let console_layer = console.then(|| fmt::layer().with_writer(std::io::stderr));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(console_layer)
        .try_init();

    tracing::info!(
        directory = %config.directory.display(),
        prefix = %config.file_prefix,
        "logging initialised"
    );
    Ok(LogGuard { _guard: guard })
}

fn rolling_file(config: &LogConfig) -> Result<RollingFileAppender> {
    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(&config.file_prefix)
        .build(&config.directory)
        .map_err(|err| BoardError::Config {
            message: format!("log directory {}: {err}", config.directory.display()),
        })
}
