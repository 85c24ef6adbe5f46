//! CDN host selection.

use std::time::Duration;
use tracing::{debug, info, warn};

/// Primary package CDN.
pub const PRIMARY_HOST: &str = "cdn.jsdelivr.net";

/// Mirror used when the primary host does not answer the probe.
pub const MIRROR_HOST: &str = "fastly.jsdelivr.net";

/// Where packages are loaded from and how the primary host is probed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CdnConfig {
    /// Preferred host
    pub primary_host: String,
    /// Fallback host
    pub mirror_host: String,
    /// Path requested by the reachability probe
    pub probe_path: String,
    /// Probe timeout
    pub timeout: Duration,
    /// When false the primary host is assumed reachable
    pub probe: bool,
}

impl Default for CdnConfig {
    fn default() -> Self {
        Self {
            primary_host: PRIMARY_HOST.to_string(),
            mirror_host: MIRROR_HOST.to_string(),
            probe_path: "/npm/".to_string(),
            timeout: Duration::from_secs(3),
            probe: true,
        }
    }
}

impl CdnConfig {
    /// URL requested by the probe.
    pub fn probe_url(&self) -> String {
        let path = self.probe_path.trim_start_matches('/');
        format!("https://{}/{}", self.primary_host, path)
    }
}

/// Chooses the host imports are rewritten to.
///
/// Sends one `HEAD` request to the primary host. Any transport error, error
/// status or timeout selects the mirror.
pub async fn select_host(config: &CdnConfig) -> String {
    if !config.probe {
        debug!(host = %config.primary_host, "CDN probe disabled");
        return config.primary_host.clone();
    }

    let url = config.probe_url();
    let client = match reqwest::Client::builder().timeout(config.timeout).build() {
        Ok(client) => client,
        Err(e) => {
            warn!(error = %e, "cannot build probe client, using mirror");
            return config.mirror_host.clone();
        }
    };

    match client.head(&url).send().await {
        Ok(response) if !response.status().is_server_error() && !response.status().is_client_error() => {
            info!(host = %config.primary_host, "CDN reachable");
            config.primary_host.clone()
        }
        Ok(response) => {
            warn!(status = %response.status(), mirror = %config.mirror_host, "CDN probe failed");
            config.mirror_host.clone()
        }
        Err(e) => {
            warn!(error = %e, mirror = %config.mirror_host, "CDN unreachable");
            config.mirror_host.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probe_url() {
        let config = CdnConfig::default();
        assert_eq!(config.probe_url(), "https://cdn.jsdelivr.net/npm/");

        let config = CdnConfig {
            primary_host: "example.test".to_string(),
            probe_path: "health".to_string(),
            ..CdnConfig::default()
        };
        assert_eq!(config.probe_url(), "https://example.test/health");
    }

    #[tokio::test]
    async fn test_disabled_probe_keeps_primary() {
        let config = CdnConfig {
            probe: false,
            ..CdnConfig::default()
        };
        assert_eq!(select_host(&config).await, PRIMARY_HOST);
    }

    #[tokio::test]
    async fn test_unreachable_primary_selects_mirror() {
        let config = CdnConfig {
            primary_host: "127.0.0.1:9".to_string(),
            timeout: Duration::from_millis(500),
            ..CdnConfig::default()
        };
        assert_eq!(select_host(&config).await, MIRROR_HOST);
    }
}
