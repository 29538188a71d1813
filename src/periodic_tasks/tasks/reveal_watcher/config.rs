use std::{path::PathBuf, time::Duration};

use serde::{Deserialize, Serialize};

use super::RevealConditionKind;
use crate::config::ConfigError;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct RevealWatcherConfig {
    /// Whether the watcher runs at all. The metadata server runs regardless.
    pub enabled: bool,
    /// Directory holding the published `<id>.json` files.
    pub metadata_path: PathBuf,
    /// Generation script, invoked as `script_path <staging_dir>`.
    pub script_path: PathBuf,
    pub script_timeout_secs: u64,
    pub condition: RevealConditionKind,
    pub poll_interval_secs: u64,
    /// Ceiling for the delay between failed ticks.
    pub max_backoff_secs: u64,
}

impl RevealWatcherConfig {
    pub(crate) fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub(crate) fn max_backoff(&self) -> Duration {
        Duration::from_secs(self.max_backoff_secs)
    }

    pub(crate) fn script_timeout(&self) -> Duration {
        Duration::from_secs(self.script_timeout_secs)
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.metadata_path.as_os_str().is_empty() {
            return Err(ConfigError::InvalidConfig(
                "reveal.metadata_path must not be empty".to_string(),
            ));
        }
        if self.script_path.as_os_str().is_empty() {
            return Err(ConfigError::InvalidConfig(
                "reveal.script_path must not be empty".to_string(),
            ));
        }
        if self.poll_interval_secs == 0 {
            return Err(ConfigError::InvalidConfig(
                "reveal.poll_interval_secs must be greater than 0".to_string(),
            ));
        }
        if self.max_backoff_secs < self.poll_interval_secs {
            return Err(ConfigError::InvalidConfig(format!(
                "reveal.max_backoff_secs ({}) must be at least poll_interval_secs ({})",
                self.max_backoff_secs, self.poll_interval_secs
            )));
        }
        if self.script_timeout_secs == 0 {
            return Err(ConfigError::InvalidConfig(
                "reveal.script_timeout_secs must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}
