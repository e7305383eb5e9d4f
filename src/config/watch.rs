use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;

use crate::Error;
use crate::Result;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct WatchConfig {
    /// Interval between sync-state polls while waiting for a watch's
    /// initial listing.
    #[serde(default = "default_sync_poll_interval_ms")]
    pub sync_poll_interval_ms: u64,

    /// Upper bound on how long a caller waits for a watch's initial
    /// listing to complete.
    #[serde(default = "default_sync_timeout_ms")]
    pub sync_timeout_ms: u64,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            sync_poll_interval_ms: default_sync_poll_interval_ms(),
            sync_timeout_ms: default_sync_timeout_ms(),
        }
    }
}

impl WatchConfig {
    /// Validates sync-wait parameters
    /// # Errors
    /// Returns `Error::InvalidConfig` when:
    /// - the poll interval is zero
    /// - the timeout is shorter than the poll interval
    pub fn validate(&self) -> Result<()> {
        if self.sync_poll_interval_ms == 0 {
            return Err(Error::InvalidConfig("sync_poll_interval_ms cannot be 0".into()));
        }

        if self.sync_timeout_ms < self.sync_poll_interval_ms {
            return Err(Error::InvalidConfig(format!(
                "sync_timeout_ms {} is shorter than sync_poll_interval_ms {}",
                self.sync_timeout_ms, self.sync_poll_interval_ms
            )));
        }

        Ok(())
    }

    pub fn sync_poll_interval(&self) -> Duration {
        Duration::from_millis(self.sync_poll_interval_ms)
    }

    pub fn sync_timeout(&self) -> Duration {
        Duration::from_millis(self.sync_timeout_ms)
    }
}

fn default_sync_poll_interval_ms() -> u64 {
    10
}

fn default_sync_timeout_ms() -> u64 {
    5_000
}
