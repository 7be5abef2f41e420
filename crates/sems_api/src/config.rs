use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("tickIntervalMs must be greater than zero")]
    ZeroTickInterval,
}

/// Server configuration, loaded from an optional JSON file.
///
/// Every field has a default, so an empty object is a valid configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerConfig {
    /// Live update cadence in milliseconds
    pub tick_interval_ms: u64,
    /// Badge uid to label. Uids are matched case-insensitively.
    pub rfid_whitelist: HashMap<String, String>,
    /// Directory served under `/static`
    pub static_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            tick_interval_ms: 1000,
            rfid_whitelist: HashMap::from([
                ("04A1B2C3D4".to_string(), "Camera 203".to_string()),
                ("DEADBEEF01".to_string(), "Admin".to_string()),
            ]),
            static_dir: PathBuf::from("static"),
        }
    }
}

impl ServerConfig {
    pub fn from_json(content: &str) -> Result<Self, ConfigError> {
        let config: ServerConfig = serde_json::from_str(content)?;
        config.validated()
    }

    /// Check invariants and normalize whitelist keys to upper case.
    pub fn validated(mut self) -> Result<Self, ConfigError> {
        if self.tick_interval_ms == 0 {
            return Err(ConfigError::ZeroTickInterval);
        }
        self.rfid_whitelist = self
            .rfid_whitelist
            .into_iter()
            .map(|(uid, label)| (uid.to_uppercase(), label))
            .collect();
        Ok(self)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn rfid_label(&self, uid: &str) -> Option<&str> {
        self.rfid_whitelist
            .get(&uid.to_uppercase())
            .map(String::as_str)
    }
}
