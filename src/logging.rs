use std::path::PathBuf;
use std::sync::OnceLock;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

static FILE_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// Initialise logging. The default level is `info`; `debug` can be enabled
/// via the settings file, in which case `RUST_LOG` may override it.
/// When `log_file` is given, output is also appended to that file.
pub fn init(debug: bool, log_file: Option<PathBuf>) {
    // When debug logging is disabled we force `info` level regardless of the
    // `RUST_LOG` environment variable.
    let level = if debug { "debug" } else { "info" };

    let filter = if debug {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
    } else {
        EnvFilter::new(level)
    };

    let registry = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr));

    let Some(path) = log_file else {
        let _ = registry.try_init();
        return;
    };

    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    let Some(file_name) = path.file_name() else {
        let _ = registry.try_init();
        tracing::warn!(
            path = %path.display(),
            "log file path has no file name; file logging disabled"
        );
        return;
    };

    let appender = tracing_appender::rolling::never(dir, file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    if registry
        .with(fmt::layer().with_ansi(false).with_writer(writer))
        .try_init()
        .is_ok()
    {
        let _ = FILE_GUARD.set(guard);
    }
}
