//! Cluster Client Configuration
//!
//! Connection settings shared by the Kubernetes and OpenShift clients, with
//! environment variable overrides.

use std::time::Duration;

/// Connection settings for a cluster API
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KubeClientConfig {
    /// API server URL (env: KUBE_CLUSTER_URL)
    pub cluster_url: String,

    /// Bearer token sent on every request (env: KUBE_BEARER_TOKEN)
    pub bearer_token: String,

    /// Namespace the user's resources live in (env: KUBE_NAMESPACE)
    pub user_namespace: String,

    /// Connect and read timeout (env: KUBE_TIMEOUT_SECS)
    pub timeout: Duration,
}

impl Default for KubeClientConfig {
    fn default() -> Self {
        Self {
            cluster_url: "https://kubernetes.default.svc".to_string(),
            bearer_token: String::new(),
            user_namespace: "default".to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

impl KubeClientConfig {
    /// Create configuration from environment variables with defaults
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(url) = std::env::var("KUBE_CLUSTER_URL") {
            config.cluster_url = url;
        }

        if let Ok(token) = std::env::var("KUBE_BEARER_TOKEN") {
            config.bearer_token = token;
        }

        if let Ok(namespace) = std::env::var("KUBE_NAMESPACE") {
            config.user_namespace = namespace;
        }

        if let Ok(secs) = std::env::var("KUBE_TIMEOUT_SECS") {
            if let Ok(parsed) = secs.parse::<u64>() {
                config.timeout = Duration::from_secs(parsed);
            }
        }

        config
    }

    /// Cluster URL without a trailing slash, ready for path concatenation.
    pub fn base_url(&self) -> &str {
        self.cluster_url.trim_end_matches('/')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = KubeClientConfig::default();
        assert_eq!(config.user_namespace, "default");
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert!(config.bearer_token.is_empty());
    }

    #[test]
    fn test_base_url_trims_trailing_slash() {
        let config = KubeClientConfig {
            cluster_url: "http://api.myCluster/".to_string(),
            ..Default::default()
        };
        assert_eq!(config.base_url(), "http://api.myCluster");
    }
}
