//! Errors for cluster client construction and queries

use crate::versions::VersionError;
use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid cluster URL {url:?}: {source}")]
    InvalidClusterUrl {
        url: String,
        #[source]
        source: http::uri::InvalidUri,
    },
    #[error("Kubernetes error: {0}")]
    Kube(#[from] kube::Error),
    #[error("OpenShift request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{kind} {namespace}/{name} not found")]
    NotFound {
        kind: &'static str,
        namespace: String,
        name: String,
    },
    #[error(transparent)]
    Version(#[from] VersionError),
}
