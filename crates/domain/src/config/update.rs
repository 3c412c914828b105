use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UpdateConfig {
    /// Seconds between block list reloads, 0 disables them
    #[serde(default = "default_period_secs")]
    pub period_secs: u64,
}

impl UpdateConfig {
    pub fn period(&self) -> Option<Duration> {
        (self.period_secs > 0).then(|| Duration::from_secs(self.period_secs))
    }
}

impl Default for UpdateConfig {
    fn default() -> Self {
        Self {
            period_secs: default_period_secs(),
        }
    }
}

fn default_period_secs() -> u64 {
    86_400
}
