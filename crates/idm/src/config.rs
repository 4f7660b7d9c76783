//! Configuration types for the IDM bridge

use std::time::Duration;

/// Tunables for header fetching and completion polling
#[derive(Debug, Clone)]
pub struct IdmConfig {
    /// Timeout applied to the HEAD request used for file-name resolution
    pub head_timeout: Duration,
    /// User agent sent with the HEAD request
    pub user_agent: String,
    /// Interval between filesystem checks while waiting for a download
    pub poll_interval: Duration,
}

impl Default for IdmConfig {
    fn default() -> Self {
        Self {
            head_timeout: Duration::from_secs(30),
            user_agent: "idm/0.1.0".to_string(),
            poll_interval: Duration::from_secs(1),
        }
    }
}
