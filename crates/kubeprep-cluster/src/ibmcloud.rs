//! IBM Cloud cluster lookups

use crate::process;
use crate::traits::CloudApi;
use async_trait::async_trait;
use kubeprep_core::{Error, Result};
use serde::Deserialize;

/// Node label carrying the IBM Cloud cluster id
pub const CLUSTER_ID_LABEL: &str = "ibm-cloud.kubernetes.io/cluster-id";

#[derive(Debug, Deserialize)]
struct ClusterInfo {
    id: String,
}

/// Cluster lookups through the `ibmcloud ks` plugin
#[derive(Debug, Clone, Copy, Default)]
pub struct IbmCloudCli;

impl IbmCloudCli {
    pub fn new() -> Self {
        Self
    }
}

fn parse_cluster_id(json: &str, cluster_name: &str) -> Result<String> {
    let info: ClusterInfo = serde_json::from_str(json)?;
    Some(info.id)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| Error::not_found("cluster id for", cluster_name))
}

#[async_trait]
impl CloudApi for IbmCloudCli {
    async fn cluster_id(&self, cluster_name: &str) -> Result<String> {
        let json = process::run(
            "ibmcloud",
            &["ks", "cluster", "get", "--cluster", cluster_name, "--json"],
        )
        .await?;
        parse_cluster_id(&json, cluster_name)
    }
}
