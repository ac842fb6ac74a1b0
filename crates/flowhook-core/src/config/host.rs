//! Hook host configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Settings governing how the host invokes user hooks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostConfig {
    /// Per-invocation time budget in seconds. Exceeding it counts as an
    /// abnormal termination of the hook.
    #[serde(default = "default_hook_timeout")]
    pub hook_timeout_seconds: u64,
    /// Maximum number of links in a `parentJob` chain.
    #[serde(default = "default_max_job_depth")]
    pub max_job_depth: usize,
    /// When set, `postAggregate` is never invoked.
    #[serde(default)]
    pub skip_aggregation: bool,
    /// Largest page (in records) the host will hand to a page-level hook.
    #[serde(default = "default_max_page_size")]
    pub max_page_size: usize,
}

impl HostConfig {
    /// Timeout as a [`Duration`].
    pub fn hook_timeout(&self) -> Duration {
        Duration::from_secs(self.hook_timeout_seconds)
    }

    /// Check the settings are usable.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.hook_timeout_seconds == 0 {
            return Err(AppError::configuration(
                "host.hook_timeout_seconds must be greater than zero",
            ));
        }
        if self.max_job_depth == 0 {
            return Err(AppError::configuration(
                "host.max_job_depth must be greater than zero",
            ));
        }
        if self.max_page_size == 0 {
            return Err(AppError::configuration(
                "host.max_page_size must be greater than zero",
            ));
        }
        Ok(())
    }
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            hook_timeout_seconds: default_hook_timeout(),
            max_job_depth: default_max_job_depth(),
            skip_aggregation: false,
            max_page_size: default_max_page_size(),
        }
    }
}

fn default_hook_timeout() -> u64 {
    30
}

fn default_max_job_depth() -> usize {
    32
}

fn default_max_page_size() -> usize {
    10_000
}
