//! Controller configuration parameters
//!
//! All tunable parameters for the bus controller.
//! Values can be overridden from a JSON file passed to the binary.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::rpc::chunked::DEFAULT_CHUNK_SIZE;

/// Errors from loading or validating a [`ControllerConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A field failed range validation.
    /// The `&'static str` describes which field and why.
    #[error("validation failed: {0}")]
    Invalid(&'static str),
    /// The JSON document could not be parsed.
    #[error("parse error: {0}")]
    Parse(#[from] serde_json::Error),
    /// The config file could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Core controller configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    // --- Local identity ---
    /// `DeviceName` property of the local interface; also the `from`
    /// field of outgoing notifications
    pub device_name: String,
    /// `DeviceOS` property of the local interface
    pub device_os: String,

    // --- Transfer ---
    /// Maximum bytes per `fileData` call
    pub chunk_size: usize,

    // --- Discovery ---
    /// Substituted for `DeviceName` / `DeviceOS` when a peer's property
    /// query fails
    pub unknown_placeholder: String,

    // --- Worker ---
    /// Name of the dispatcher thread
    pub worker_name: String,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            device_name: "IZConnect Controller".into(),
            device_os: std::env::consts::OS.into(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            unknown_placeholder: "UNKNOWN".into(),
            worker_name: "bus-dispatcher".into(),
        }
    }
}

impl ControllerConfig {
    /// Range-check every field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.chunk_size == 0 {
            return Err(ConfigError::Invalid("chunk_size must be greater than zero"));
        }
        if self.device_name.trim().is_empty() {
            return Err(ConfigError::Invalid("device_name must not be empty"));
        }
        if self.worker_name.is_empty() {
            return Err(ConfigError::Invalid("worker_name must not be empty"));
        }
        Ok(())
    }

    /// Parse and validate a JSON document.  Missing fields take defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }
}
