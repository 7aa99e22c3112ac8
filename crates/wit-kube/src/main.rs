//! wit-kube
//!
//! Command line access to deployment rollout lookups.

use clap::{Args, Parser, Subcommand};
use std::time::Duration;
use tracing::info;
use wit_kube::{
    logging::{init_logging, LoggingConfig},
    most_recent_replication_controller, ClientGetter, DefaultGetter, KubeClientConfig,
    OpenShiftRestApi, Versioned,
};

#[derive(Parser)]
#[command(name = "wit-kube")]
#[command(about = "Deployment rollout helpers for Kubernetes and OpenShift")]
struct Cli {
    #[command(flatten)]
    cluster: ClusterArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct ClusterArgs {
    /// API server URL
    #[arg(long, env = "KUBE_CLUSTER_URL")]
    cluster_url: Option<String>,

    /// Bearer token
    #[arg(long, env = "KUBE_BEARER_TOKEN", hide_env_values = true)]
    bearer_token: Option<String>,

    /// Namespace to query
    #[arg(long, short = 'n', env = "KUBE_NAMESPACE")]
    namespace: Option<String>,

    /// Request timeout in seconds
    #[arg(long, env = "KUBE_TIMEOUT_SECS")]
    timeout_secs: Option<u64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the most recent replication controller of a deployment config
    LatestRc {
        /// Deployment config name
        deployment_config: String,
    },
    /// Print the latest version recorded on a deployment config
    LatestVersion {
        /// Deployment config name
        deployment_config: String,
    },
}

impl ClusterArgs {
    fn into_config(self) -> KubeClientConfig {
        let mut config = KubeClientConfig::default();
        if let Some(url) = self.cluster_url {
            config.cluster_url = url;
        }
        if let Some(token) = self.bearer_token {
            config.bearer_token = token;
        }
        if let Some(namespace) = self.namespace {
            config.user_namespace = namespace;
        }
        if let Some(secs) = self.timeout_secs {
            config.timeout = Duration::from_secs(secs);
        }
        config
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Install rustls crypto provider
    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|_| anyhow::anyhow!("Failed to install rustls crypto provider"))?;

    init_logging(&LoggingConfig::from_env());

    let cli = Cli::parse();
    let config = cli.cluster.into_config();
    info!(cluster = %config.cluster_url, namespace = %config.user_namespace, "Using cluster");

    match cli.command {
        Commands::LatestRc { deployment_config } => {
            let api = DefaultGetter.kube_rest_api(&config)?;
            match most_recent_replication_controller(&api, &config.user_namespace, &deployment_config)
                .await?
            {
                Some(rc) => println!(
                    "{}\t{}",
                    rc.metadata.name.as_deref().unwrap_or_default(),
                    rc.version_marker().unwrap_or("<unset>")
                ),
                None => info!(deployment_config = %deployment_config, "No replication controllers found"),
            }
        }
        Commands::LatestVersion { deployment_config } => {
            let api = DefaultGetter.openshift_rest_api(&config)?;
            let dc = api
                .deployment_config(&config.user_namespace, &deployment_config)
                .await?;
            println!("{}", dc.status.latest_version);
        }
    }

    Ok(())
}
