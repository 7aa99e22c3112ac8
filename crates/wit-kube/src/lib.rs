//! wit-kube
//!
//! Thin wrapper around the Kubernetes and OpenShift APIs used by deployment
//! workflows: builds REST clients from one config struct and finds the most
//! recent replication controller of a deployment config.

pub mod client;
pub mod config;
pub mod error;
pub mod logging;
pub mod versions;

pub use client::{
    most_recent_replication_controller, ClientGetter, DefaultGetter, DeploymentConfig,
    KubeApiClient, KubeRestApi, OpenShiftApiClient, OpenShiftRestApi,
};
pub use config::KubeClientConfig;
pub use error::{Error, Result};
pub use versions::{select_most_recent, Versioned, VersionedRecord, VersionError};
