//! Cluster API Clients
//!
//! Builds the Kubernetes (kube-rs) and OpenShift (plain REST over reqwest)
//! clients from a single [`KubeClientConfig`], and resolves the most recent
//! replication controller of a deployment config.

use crate::config::KubeClientConfig;
use crate::error::{Error, Result};
use crate::versions::select_most_recent;
use async_trait::async_trait;
use k8s_openapi::api::core::v1::ReplicationController;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::api::{Api, ListParams};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, instrument};

/// Label linking a replication controller to its deployment config.
pub const DEPLOYMENT_CONFIG_LABEL: &str = "openshift.io/deployment-config.name";

/// Kubernetes API surface used by rollout lookups.
#[async_trait]
pub trait KubeRestApi: Send + Sync {
    /// Replication controllers in `namespace` matching `label_selector`, keyed by name.
    async fn replication_controllers(
        &self,
        namespace: &str,
        label_selector: &str,
    ) -> Result<BTreeMap<String, ReplicationController>>;
}

/// OpenShift API surface used by rollout lookups.
#[async_trait]
pub trait OpenShiftRestApi: Send + Sync {
    async fn deployment_config(&self, namespace: &str, name: &str) -> Result<DeploymentConfig>;
}

/// Constructs API clients from a [`KubeClientConfig`].
pub trait ClientGetter {
    type Kube: KubeRestApi;
    type OpenShift: OpenShiftRestApi;

    fn kube_rest_api(&self, config: &KubeClientConfig) -> Result<Self::Kube>;
    fn openshift_rest_api(&self, config: &KubeClientConfig) -> Result<Self::OpenShift>;
}

/// Getter producing real network clients.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultGetter;

impl ClientGetter for DefaultGetter {
    type Kube = KubeApiClient;
    type OpenShift = OpenShiftApiClient;

    fn kube_rest_api(&self, config: &KubeClientConfig) -> Result<KubeApiClient> {
        KubeApiClient::new(config)
    }

    fn openshift_rest_api(&self, config: &KubeClientConfig) -> Result<OpenShiftApiClient> {
        OpenShiftApiClient::new(config)
    }
}

/// Kubernetes client together with the configuration it was built from.
#[derive(Clone)]
pub struct KubeApiClient {
    rest_config: kube::Config,
    client: kube::Client,
}

impl KubeApiClient {
    /// Must be called from within a tokio runtime.
    pub fn new(config: &KubeClientConfig) -> Result<Self> {
        let rest_config = rest_config(config)?;
        let client = kube::Client::try_from(rest_config.clone())?;
        debug!(cluster = %rest_config.cluster_url, "Kubernetes client created");
        Ok(Self {
            rest_config,
            client,
        })
    }

    pub fn rest_config(&self) -> &kube::Config {
        &self.rest_config
    }

    pub fn client(&self) -> &kube::Client {
        &self.client
    }
}

fn rest_config(config: &KubeClientConfig) -> Result<kube::Config> {
    let cluster_url =
        config
            .cluster_url
            .parse::<http::Uri>()
            .map_err(|source| Error::InvalidClusterUrl {
                url: config.cluster_url.clone(),
                source,
            })?;

    let mut rest_config = kube::Config::new(cluster_url);
    rest_config.default_namespace = config.user_namespace.clone();
    rest_config.connect_timeout = Some(config.timeout);
    rest_config.read_timeout = Some(config.timeout);
    if !config.bearer_token.is_empty() {
        rest_config.auth_info.token = Some(config.bearer_token.clone().into());
    }
    Ok(rest_config)
}

#[async_trait]
impl KubeRestApi for KubeApiClient {
    #[instrument(skip(self))]
    async fn replication_controllers(
        &self,
        namespace: &str,
        label_selector: &str,
    ) -> Result<BTreeMap<String, ReplicationController>> {
        let api: Api<ReplicationController> = Api::namespaced(self.client.clone(), namespace);
        let list = api.list(&ListParams::default().labels(label_selector)).await?;

        Ok(list
            .items
            .into_iter()
            .filter_map(|rc| rc.metadata.name.clone().map(|name| (name, rc)))
            .collect())
    }
}

/// OpenShift DeploymentConfig, reduced to the fields rollouts care about.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentConfig {
    #[serde(default)]
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub status: DeploymentConfigStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentConfigStatus {
    /// Version of the most recently started deployment.
    #[serde(default)]
    pub latest_version: i64,
}

/// REST client for OpenShift-only APIs.
#[derive(Debug, Clone)]
pub struct OpenShiftApiClient {
    config: KubeClientConfig,
    http_client: reqwest::Client,
}

impl OpenShiftApiClient {
    pub fn new(config: &KubeClientConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.timeout)
            .build()?;
        Ok(Self {
            config: config.clone(),
            http_client,
        })
    }

    pub fn config(&self) -> &KubeClientConfig {
        &self.config
    }

    pub fn timeout(&self) -> Duration {
        self.config.timeout
    }

    pub fn http_client(&self) -> &reqwest::Client {
        &self.http_client
    }

    fn deployment_config_url(&self, namespace: &str, name: &str) -> String {
        format!(
            "{}/apis/apps.openshift.io/v1/namespaces/{}/deploymentconfigs/{}",
            self.config.base_url(),
            namespace,
            name
        )
    }
}

#[async_trait]
impl OpenShiftRestApi for OpenShiftApiClient {
    #[instrument(skip(self))]
    async fn deployment_config(&self, namespace: &str, name: &str) -> Result<DeploymentConfig> {
        let response = self
            .http_client
            .get(self.deployment_config_url(namespace, name))
            .bearer_auth(&self.config.bearer_token)
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(Error::NotFound {
                kind: "DeploymentConfig",
                namespace: namespace.to_string(),
                name: name.to_string(),
            });
        }

        Ok(response.error_for_status()?.json().await?)
    }
}

/// Most recent replication controller created for deployment config `dc_name`.
#[instrument(skip(api))]
pub async fn most_recent_replication_controller<K>(
    api: &K,
    namespace: &str,
    dc_name: &str,
) -> Result<Option<ReplicationController>>
where
    K: KubeRestApi + ?Sized,
{
    let selector = format!("{}={}", DEPLOYMENT_CONFIG_LABEL, dc_name);
    let rcs = api.replication_controllers(namespace, &selector).await?;
    debug!(count = rcs.len(), "Listed replication controllers");

    Ok(select_most_recent(&rcs)?.cloned())
}
