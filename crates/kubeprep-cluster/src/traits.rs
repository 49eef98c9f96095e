//! Collaborator trait definitions
//!
//! Each trait covers one external system the bootstrap depends on. Only the
//! operations the workflow needs are modelled; implementations live next to
//! this module and tests substitute recording fakes.

use crate::helm::InstallChartOptions;
use async_trait::async_trait;
use camino::Utf8PathBuf;
use kubeprep_core::{HelmInitConfig, Result};
use std::collections::BTreeMap;

/// Subject of a cluster role binding
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Subject {
    User(String),
    ServiceAccount { namespace: String, name: String },
}

/// Kubernetes API operations used by the bootstrap
#[async_trait]
pub trait KubeClient: Send + Sync {
    /// Create the namespace with `labels` unless it already exists
    async fn ensure_namespace(&self, name: &str, labels: &BTreeMap<String, String>) -> Result<()>;

    /// Number of ready pods of a deployment
    ///
    /// A deployment that does not exist is a not-found error.
    async fn deployment_ready_pods(&self, namespace: &str, name: &str) -> Result<u32>;

    /// Load-balancer IP or hostname of a service, once one is assigned
    async fn service_external_address(&self, namespace: &str, name: &str)
        -> Result<Option<String>>;

    async fn cluster_role_binding_exists(&self, name: &str) -> Result<bool>;

    async fn create_cluster_role_binding(
        &self,
        name: &str,
        cluster_role: &str,
        subject: &Subject,
    ) -> Result<()>;

    /// Create the service account unless it already exists
    async fn ensure_service_account(&self, namespace: &str, name: &str) -> Result<()>;

    /// Value of `label` on the first node carrying it
    async fn node_label(&self, label: &str) -> Result<Option<String>>;
}

/// Helm runtime initialisation and chart installation
#[async_trait]
pub trait Helm: Send + Sync {
    async fn init(&self, config: &HelmInitConfig) -> Result<()>;

    async fn install_chart(&self, options: &InstallChartOptions) -> Result<()>;
}

/// Default build pack repositories
#[async_trait]
pub trait BuildPacks: Send + Sync {
    /// Make the default packs available locally, returning their directory
    async fn install_default(&self, recreate: bool) -> Result<Utf8PathBuf>;
}

/// Pinned chart versions
#[async_trait]
pub trait VersionStream: Send + Sync {
    /// Version pinned for `chart`, `None` when the stream does not pin it
    async fn chart_version(&self, chart: &str) -> Result<Option<String>>;
}

/// Turns an external address into a usable domain
#[async_trait]
pub trait DomainResolver: Send + Sync {
    async fn domain_for(&self, address: &str) -> Result<String>;
}

/// Global git identity
#[async_trait]
pub trait GitConfig: Send + Sync {
    /// Global value for `key`, `None` when unset or blank
    async fn get(&self, key: &str) -> Result<Option<String>>;

    async fn set_global(&self, key: &str, value: &str) -> Result<()>;
}

/// Cloud provider lookups
#[async_trait]
pub trait CloudApi: Send + Sync {
    /// Identifier of the named cluster
    async fn cluster_id(&self, cluster_name: &str) -> Result<String>;
}
