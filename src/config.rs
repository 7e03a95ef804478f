//! Session configuration: where the native library lives and where it logs.
//!
//! Passed explicitly to [`Session::open`](crate::Session::open); nothing is read from or written
//! to the process environment.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[cfg(windows)]
const DEFAULT_BIN_NAME: &str = "LinkamSDK";
#[cfg(not(windows))]
const DEFAULT_BIN_NAME: &str = "libLinkamSDK.so";

const DEFAULT_LOG_FILE: &str = "Linkam.log";
const DEFAULT_LICENSE_FILE: &str = "Linkam.lsk";

/// Verbosity of the native library's own log file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoggingLevel {
    #[default]
    Minimal,
    Informative,
    Verbose,
    Investigation,
}

impl LoggingLevel {
    pub fn code(self) -> u32 {
        match self {
            LoggingLevel::Minimal => 0,
            LoggingLevel::Informative => 1,
            LoggingLevel::Verbose => 2,
            LoggingLevel::Investigation => 3,
        }
    }
}

fn default_sdk_root() -> PathBuf {
    PathBuf::from(".")
}

fn default_bin_name() -> String {
    DEFAULT_BIN_NAME.to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Directory searched for the library and used for default log/license paths.
    #[serde(default = "default_sdk_root")]
    pub sdk_root: PathBuf,
    #[serde(default = "default_bin_name")]
    pub bin_name: String,
    #[serde(default)]
    pub log_path: Option<PathBuf>,
    #[serde(default)]
    pub license_path: Option<PathBuf>,
    #[serde(default)]
    pub logging_level: LoggingLevel,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            sdk_root: default_sdk_root(),
            bin_name: default_bin_name(),
            log_path: None,
            license_path: None,
            logging_level: LoggingLevel::default(),
        }
    }
}

impl SessionConfig {
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        SessionConfig {
            sdk_root: root.into(),
            ..Default::default()
        }
    }

    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn bin_path(&self) -> PathBuf {
        self.sdk_root.join(&self.bin_name)
    }

    pub fn log_path(&self) -> PathBuf {
        self.log_path
            .clone()
            .unwrap_or_else(|| self.sdk_root.join(DEFAULT_LOG_FILE))
    }

    pub fn license_path(&self) -> PathBuf {
        self.license_path
            .clone()
            .unwrap_or_else(|| self.sdk_root.join(DEFAULT_LICENSE_FILE))
    }
}
