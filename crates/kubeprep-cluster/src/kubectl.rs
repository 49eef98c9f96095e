//! kubectl-backed Kubernetes client
//!
//! Reads are done with `-o json` and parsed into the small serde structs at
//! the bottom of this module; only the fields the bootstrap looks at are
//! modelled.

use crate::process;
use crate::traits::{KubeClient, Subject};
use async_trait::async_trait;
use camino::Utf8PathBuf;
use kubeprep_core::Result;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, info};

/// Kubernetes client that shells out to kubectl
#[derive(Debug, Clone, Default)]
pub struct KubectlClient {
    /// Explicit kubeconfig file; kubectl's own lookup otherwise
    kubeconfig: Option<Utf8PathBuf>,
}

impl KubectlClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a specific kubeconfig file
    pub fn with_kubeconfig(path: impl Into<Utf8PathBuf>) -> Self {
        Self {
            kubeconfig: Some(path.into()),
        }
    }

    fn args<'a>(&'a self, args: &[&'a str]) -> Vec<&'a str> {
        let mut full = Vec::with_capacity(args.len() + 2);
        if let Some(path) = &self.kubeconfig {
            full.push("--kubeconfig");
            full.push(path.as_str());
        }
        full.extend_from_slice(args);
        full
    }

    async fn kubectl(&self, args: &[&str]) -> Result<String> {
        process::run("kubectl", &self.args(args)).await
    }

    /// Run a `get`, mapping not-found to `None`
    async fn get_optional(&self, args: &[&str]) -> Result<Option<String>> {
        match self.kubectl(args).await {
            Ok(out) => Ok(Some(out)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }
}

#[async_trait]
impl KubeClient for KubectlClient {
    async fn ensure_namespace(&self, name: &str, labels: &BTreeMap<String, String>) -> Result<()> {
        if self
            .get_optional(&["get", "namespace", name, "-o", "name"])
            .await?
            .is_some()
        {
            debug!("Namespace {} already exists", name);
            return Ok(());
        }

        info!("Creating namespace {}", name);
        self.kubectl(&["create", "namespace", name]).await?;

        if !labels.is_empty() {
            let pairs: Vec<String> = labels.iter().map(|(k, v)| format!("{k}={v}")).collect();
            let mut args = vec!["label", "namespace", name, "--overwrite"];
            args.extend(pairs.iter().map(String::as_str));
            self.kubectl(&args).await?;
        }
        Ok(())
    }

    async fn deployment_ready_pods(&self, namespace: &str, name: &str) -> Result<u32> {
        let json = self
            .kubectl(&["get", "deployment", name, "-n", namespace, "-o", "json"])
            .await?;
        let deployment: KubeDeployment = serde_json::from_str(&json)?;
        Ok(deployment.status.ready_replicas.unwrap_or(0))
    }

    async fn service_external_address(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Option<String>> {
        let json = self
            .kubectl(&["get", "service", name, "-n", namespace, "-o", "json"])
            .await?;
        let service: KubeService = serde_json::from_str(&json)?;
        Ok(service.external_address())
    }

    async fn cluster_role_binding_exists(&self, name: &str) -> Result<bool> {
        Ok(self
            .get_optional(&["get", "clusterrolebinding", name, "-o", "name"])
            .await?
            .is_some())
    }

    async fn create_cluster_role_binding(
        &self,
        name: &str,
        cluster_role: &str,
        subject: &Subject,
    ) -> Result<()> {
        let subject_args = subject_args(subject);
        let mut args = vec!["create", "clusterrolebinding", name, "--clusterrole", cluster_role];
        args.extend(subject_args.iter().map(String::as_str));
        self.kubectl(&args).await?;
        info!("Created cluster role binding {}", name);
        Ok(())
    }

    async fn ensure_service_account(&self, namespace: &str, name: &str) -> Result<()> {
        if self
            .get_optional(&["get", "serviceaccount", name, "-n", namespace, "-o", "name"])
            .await?
            .is_some()
        {
            return Ok(());
        }

        self.kubectl(&["create", "serviceaccount", name, "-n", namespace])
            .await?;
        info!("Created service account {}/{}", namespace, name);
        Ok(())
    }

    async fn node_label(&self, label: &str) -> Result<Option<String>> {
        let json = self.kubectl(&["get", "nodes", "-o", "json"]).await?;
        let nodes: KubeNodeList = serde_json::from_str(&json)?;
        Ok(nodes
            .items
            .into_iter()
            .find_map(|node| node.metadata.labels.get(label).cloned())
            .filter(|value| !value.is_empty()))
    }
}

fn subject_args(subject: &Subject) -> [String; 2] {
    match subject {
        Subject::User(user) => ["--user".to_string(), user.clone()],
        Subject::ServiceAccount { namespace, name } => {
            ["--serviceaccount".to_string(), format!("{namespace}:{name}")]
        }
    }
}

// Kubernetes API types for JSON parsing

#[derive(Debug, Deserialize)]
struct KubeDeployment {
    #[serde(default)]
    status: DeploymentStatus,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DeploymentStatus {
    ready_replicas: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct KubeService {
    #[serde(default)]
    status: ServiceStatus,
}

impl KubeService {
    fn external_address(&self) -> Option<String> {
        self.status
            .load_balancer
            .ingress
            .iter()
            .find_map(|i| {
                i.ip
                    .as_deref()
                    .filter(|ip| !ip.is_empty())
                    .or(i.hostname.as_deref().filter(|h| !h.is_empty()))
            })
            .map(str::to_string)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ServiceStatus {
    #[serde(default)]
    load_balancer: LoadBalancerStatus,
}

#[derive(Debug, Default, Deserialize)]
struct LoadBalancerStatus {
    #[serde(default)]
    ingress: Vec<LoadBalancerIngress>,
}

#[derive(Debug, Deserialize)]
struct LoadBalancerIngress {
    ip: Option<String>,
    hostname: Option<String>,
}

#[derive(Debug, Deserialize)]
struct KubeNodeList {
    items: Vec<KubeNode>,
}

#[derive(Debug, Deserialize)]
struct KubeNode {
    metadata: NodeMetadata,
}

#[derive(Debug, Deserialize)]
struct NodeMetadata {
    #[serde(default)]
    labels: HashMap<String, String>,
}
