/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::debug;
use serde::Deserialize;

use crate::error::ConfigError;

/// Harness-wide settings the controller needs but does not own.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct HarnessConfig {
    /// Directory that `pathToLocalResource` resolves names against.
    pub sandbox_root: PathBuf,
    /// Origin whose quota `setDatabaseQuota` changes. Historically an empty-path file URI.
    pub database_quota_origin: String,
    /// Upper bound on waiting for the engine thread to produce a layer tree dump.
    pub layer_tree_timeout_ms: u64,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            sandbox_root: PathBuf::from("/sdcard/webkit"),
            database_quota_origin: "file://".to_owned(),
            layer_tree_timeout_ms: 5000,
        }
    }
}

impl HarnessConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        debug!("Reading harness config from {}", path.display());
        let contents = fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    pub fn layer_tree_timeout(&self) -> Duration {
        Duration::from_millis(self.layer_tree_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let config = HarnessConfig::from_json_str(r#"{ "sandbox_root": "/tmp/sandbox" }"#)
            .unwrap();
        assert_eq!(config.sandbox_root, PathBuf::from("/tmp/sandbox"));
        assert_eq!(config.database_quota_origin, "file://");
        assert_eq!(config.layer_tree_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let result = HarnessConfig::from_json_str("{ sandbox_root: ");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let result = HarnessConfig::from_file(Path::new("/nonexistent/harness.json"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }
}
