//! XML configuration loading for the engine binary.
//!
//! Expected document shape:
//!
//! ```xml
//! <Configuration>
//!     <OrderBookScheduler>
//!         <WorkerPrefix>OB_Worker</WorkerPrefix>
//!         <WorkerCount>4</WorkerCount>
//!     </OrderBookScheduler>
//! </Configuration>
//! ```
//!
//! Missing or empty required elements fail loading; configuration failures
//! are fatal at startup.

use serde::Deserialize;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Errors raised while loading configuration.
#[derive(Debug)]
#[non_exhaustive]
pub enum ConfigError {
    /// The file could not be read.
    Io {
        /// Path that failed to open.
        path: PathBuf,
        /// Underlying I/O error message.
        message: String,
    },

    /// The document is not well-formed or misses a required element.
    Parse {
        /// Underlying parser message.
        message: String,
    },

    /// An element is present but holds an unusable value.
    InvalidValue {
        /// The offending element name.
        element: String,
        /// What was wrong with it.
        message: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io { path, message } => {
                write!(f, "failed to read configuration {}: {message}", path.display())
            }
            ConfigError::Parse { message } => {
                write!(f, "failed to parse configuration: {message}")
            }
            ConfigError::InvalidValue { element, message } => {
                write!(f, "configuration element <{element}>: {message}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Deserialize)]
struct ConfigurationXml {
    #[serde(rename = "OrderBookScheduler")]
    order_book_scheduler: OrderBookSchedulerXml,
}

#[derive(Debug, Deserialize)]
struct OrderBookSchedulerXml {
    #[serde(rename = "WorkerPrefix")]
    worker_prefix: String,
    #[serde(rename = "WorkerCount")]
    worker_count: String,
}

/// Validated engine configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Name prefix for the book workers.
    pub worker_prefix: String,
    /// Number of book workers to create.
    pub worker_count: usize,
}

impl EngineConfig {
    /// Load and validate the configuration file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<EngineConfig, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|err| ConfigError::Io {
            path: path.to_path_buf(),
            message: err.to_string(),
        })?;
        Self::from_xml(&text)
    }

    /// Parse and validate a configuration document.
    pub fn from_xml(text: &str) -> Result<EngineConfig, ConfigError> {
        let parsed: ConfigurationXml =
            quick_xml::de::from_str(text).map_err(|err| ConfigError::Parse {
                message: err.to_string(),
            })?;

        let worker_prefix = parsed.order_book_scheduler.worker_prefix.trim().to_string();
        if worker_prefix.is_empty() {
            return Err(ConfigError::InvalidValue {
                element: "WorkerPrefix".to_string(),
                message: "cannot be empty".to_string(),
            });
        }

        let worker_count: usize = parsed
            .order_book_scheduler
            .worker_count
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue {
                element: "WorkerCount".to_string(),
                message: "is not a valid positive integer".to_string(),
            })?;
        if worker_count == 0 {
            return Err(ConfigError::InvalidValue {
                element: "WorkerCount".to_string(),
                message: "must be at least 1".to_string(),
            });
        }

        Ok(EngineConfig {
            worker_prefix,
            worker_count,
        })
    }
}
