/*!
 * Logging and tracing initialization
 */

use std::fs::File;
use std::path::Path;
use tracing::Level;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

use crate::config::{ConfigError, LoggingConfig};

/// Crates whose events pass the default filter
const LOG_TARGETS: &[&str] = &["vfolder", "vfolder_server", "tower_http"];

/// Initialize structured logging based on configuration
///
/// `RUST_LOG` takes precedence over the configured level.
pub fn init_logging(config: &LoggingConfig) -> Result<(), ConfigError> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_directives(config.level.to_tracing_level())))
        .map_err(|e| ConfigError::Invalid {
            field: "logging.level".to_string(),
            message: format!("Failed to create log filter: {}", e),
        })?;

    if let Some(ref log_path) = config.file {
        init_file_logging(log_path, env_filter)?;
    } else {
        init_stdout_logging(env_filter);
    }

    Ok(())
}

/// Filter directives enabling `level` for this service's crates
pub fn default_directives(level: Level) -> String {
    LOG_TARGETS
        .iter()
        .map(|target| format!("{}={}", target, level))
        .collect::<Vec<_>>()
        .join(",")
}

/// Initialize logging to stdout
fn init_stdout_logging(env_filter: EnvFilter) {
    let fmt_layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_file(false)
        .with_line_number(false)
        .with_span_events(FmtSpan::NONE)
        .compact();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}

/// Initialize JSON logging to a file
fn init_file_logging(log_path: &Path, env_filter: EnvFilter) -> Result<(), ConfigError> {
    let file = File::create(log_path).map_err(|e| ConfigError::Invalid {
        field: "logging.file".to_string(),
        message: format!("Failed to create log file {}: {}", log_path.display(), e),
    })?;

    let fmt_layer = fmt::layer()
        .with_writer(file)
        .with_target(true)
        .with_thread_ids(true)
        .with_thread_names(true)
        .with_file(true)
        .with_line_number(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(false) // No ANSI colors in file
        .json();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();

    Ok(())
}

/// Initialize logging for tests, once per process
#[doc(hidden)]
pub fn init_test_logging() {
    use std::sync::Once;
    static INIT: Once = Once::new();

    INIT.call_once(|| {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("vfolder=debug"));

        let fmt_layer = fmt::layer().with_test_writer().with_target(false).compact();

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()
            .ok(); // Ignore error if already initialized
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directives() {
        assert_eq!(
            default_directives(Level::DEBUG),
            "vfolder=DEBUG,vfolder_server=DEBUG,tower_http=DEBUG"
        );
    }

    #[test]
    fn test_directives_parse_as_filter() {
        for level in [Level::ERROR, Level::WARN, Level::INFO, Level::TRACE] {
            assert!(EnvFilter::try_new(default_directives(level)).is_ok());
        }
    }

    #[test]
    fn test_unwritable_log_file_is_config_error() {
        let filter = EnvFilter::new("vfolder=info");
        let err = init_file_logging(Path::new("/nonexistent-dir/vfolder.log"), filter).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }
}
