//! Session configuration.

use interpreter::DEFAULT_POLL_INTERVAL;
use module_resolver::CdnConfig;
use std::time::Duration;

/// Everything a [`Session`](crate::Session) can be tuned with.
///
/// # Examples
///
/// ```
/// use orchestrator::SessionConfig;
/// use std::time::Duration;
///
/// let config = SessionConfig::default();
/// assert_eq!(config.grace_period, Duration::from_millis(10));
/// assert_eq!(config.inspect_depth, 2);
/// assert_eq!(config.cdn.primary_host, "cdn.jsdelivr.net");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// How long an execution runs before the executing indicator is shown
    pub grace_period: Duration,
    /// CDN hosts and reachability probe
    pub cdn: CdnConfig,
    /// Nesting depth of rendered values
    pub inspect_depth: usize,
    /// Poll interval of a pending async submission
    pub poll_interval: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            grace_period: Duration::from_millis(10),
            cdn: CdnConfig::default(),
            inspect_depth: 2,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}
