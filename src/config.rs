/*!
 * Configuration types for vfolder
 */

use crate::backend::{BackendError, StoreConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

/// Default listen address
pub const DEFAULT_BIND: &str = "127.0.0.1:8080";

/// Default upload size limit (64 MiB)
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 64 * 1024 * 1024;

/// Errors raised while loading or checking configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for {field}: {message}")]
    Invalid { field: String, message: String },

    #[error(transparent)]
    Store(#[from] BackendError),
}

/// Top-level service configuration
///
/// Every section and every field has a default, so an empty file (or no file
/// at all) yields a working in-memory service on [`DEFAULT_BIND`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub server: ServerConfig,
    pub store: StoreConfig,
    pub logging: LoggingConfig,
    pub download: DownloadConfig,
}

/// HTTP listener settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Socket address to listen on
    pub bind: String,

    /// Largest accepted request body, in bytes
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.to_string(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

/// Log output settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level for diagnostic output
    pub level: LogLevel,

    /// Log file path (None = stdout)
    pub file: Option<PathBuf>,
}

/// Transient download file settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DownloadConfig {
    /// Directory for temporary copies (None = OS temp dir)
    pub temp_dir: Option<PathBuf>,
}

impl ServiceConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    /// Load from `path` (or defaults), then apply environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Apply `VFOLDER_*` overrides; `lookup` returns a variable's value if set
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(bind) = lookup("VFOLDER_BIND") {
            self.server.bind = bind;
        }
        if let Some(level) = lookup("VFOLDER_LOG_LEVEL") {
            self.logging.level = level.parse()?;
        }
        self.store.apply_env(&lookup)?;
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.bind.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "server.bind".to_string(),
                message: "must not be empty".to_string(),
            });
        }

        if self.server.max_upload_bytes == 0 {
            return Err(ConfigError::Invalid {
                field: "server.max_upload_bytes".to_string(),
                message: "must be greater than zero".to_string(),
            });
        }

        self.store.validate()?;
        Ok(())
    }
}

/// Log level for diagnostic output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Only errors
    Error,

    /// Warnings and errors
    Warn,

    /// Info, warnings, and errors
    #[default]
    Info,

    /// Debug and above
    Debug,

    /// All messages including traces
    Trace,
}

impl LogLevel {
    /// Convert to tracing::Level
    pub fn to_tracing_level(&self) -> tracing::Level {
        match self {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}

impl FromStr for LogLevel {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "error" => Ok(LogLevel::Error),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            other => Err(ConfigError::Invalid {
                field: "logging.level".to_string(),
                message: format!("unknown level '{}'", other),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = ServiceConfig::from_toml_str("").unwrap();
        assert_eq!(config, ServiceConfig::default());
        assert_eq!(config.server.bind, DEFAULT_BIND);
        assert_eq!(config.server.max_upload_bytes, DEFAULT_MAX_UPLOAD_BYTES);
        assert_eq!(config.store, StoreConfig::Memory);
        assert_eq!(config.logging.level, LogLevel::Info);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_full_config_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[server]
bind = "0.0.0.0:9000"
max_upload_bytes = 1048576

[store]
kind = "local"
root = "/var/lib/vfolder"

[logging]
level = "debug"
file = "/var/log/vfolder.json"

[download]
temp_dir = "/var/tmp"
"#
        )
        .unwrap();

        let config = ServiceConfig::from_file(file.path()).unwrap();
        assert_eq!(config.server.bind, "0.0.0.0:9000");
        assert_eq!(config.server.max_upload_bytes, 1024 * 1024);
        assert_eq!(config.store, StoreConfig::local("/var/lib/vfolder"));
        assert_eq!(config.logging.level, LogLevel::Debug);
        assert_eq!(
            config.logging.file.as_deref(),
            Some(Path::new("/var/log/vfolder.json"))
        );
        assert_eq!(config.download.temp_dir.as_deref(), Some(Path::new("/var/tmp")));
    }

    #[test]
    fn test_missing_file() {
        let err = ServiceConfig::from_file(Path::new("/nonexistent/vfolder.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            ("VFOLDER_BIND", "127.0.0.1:9999"),
            ("VFOLDER_LOG_LEVEL", "TRACE"),
            ("VFOLDER_STORE", "local"),
            ("VFOLDER_LOCAL_ROOT", "/tmp/objects"),
        ]
        .into_iter()
        .collect();

        let mut config = ServiceConfig::default();
        config
            .apply_env(|key| vars.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.server.bind, "127.0.0.1:9999");
        assert_eq!(config.logging.level, LogLevel::Trace);
        assert_eq!(config.store, StoreConfig::local("/tmp/objects"));
    }

    #[test]
    fn test_validate_rejects_zero_upload_limit() {
        let mut config = ServiceConfig::default();
        config.server.max_upload_bytes = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_bad_bucket() {
        let config = ServiceConfig::from_toml_str(
            r#"
[store]
kind = "s3"
bucket = "Not_Valid"
"#,
        )
        .unwrap();
        assert!(matches!(config.validate(), Err(ConfigError::Store(_))));
    }

    #[test]
    fn test_log_level_parse() {
        assert_eq!("warning".parse::<LogLevel>().unwrap(), LogLevel::Warn);
        assert_eq!(" Info ".parse::<LogLevel>().unwrap(), LogLevel::Info);
        assert!("loud".parse::<LogLevel>().is_err());
    }

    #[test]
    fn test_log_level_conversion() {
        assert_eq!(LogLevel::Error.to_tracing_level(), tracing::Level::ERROR);
        assert_eq!(LogLevel::Trace.to_tracing_level(), tracing::Level::TRACE);
    }
}
