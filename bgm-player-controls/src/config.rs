use std::time::Duration;

use crate::fade::FadeConfig;

#[derive(Debug, Clone, Copy, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub fade: FadeConfig,
    /// How long a finished track waits for the next source before giving up
    /// on the ready signal.
    pub transition_timeout_ms: u64,
    pub time_update_ms: u64,
    pub autoplay_delay_ms: u64,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            fade: FadeConfig::default(),
            transition_timeout_ms: 2000,
            time_update_ms: 500,
            autoplay_delay_ms: 500,
        }
    }
}

impl PlayerConfig {
    pub fn transition_timeout(&self) -> Duration {
        Duration::from_millis(self.transition_timeout_ms)
    }

    pub fn time_update_interval(&self) -> Duration {
        Duration::from_millis(self.time_update_ms.max(1))
    }

    pub fn autoplay_delay(&self) -> Duration {
        Duration::from_millis(self.autoplay_delay_ms)
    }
}
