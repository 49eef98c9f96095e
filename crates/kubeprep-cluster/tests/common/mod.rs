//! Shared test utilities for kubeprep-cluster integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use kubeprep_cluster::{KubeClient, Subject};
use kubeprep_core::{Error, Result};
use std::collections::{BTreeMap, VecDeque};
use std::sync::Mutex;

/// Skip test if a tool is not on PATH
pub fn skip_if_not_installed(tool: &str) -> bool {
    if which::which(tool).is_err() {
        eprintln!("Skipping test: {} not installed", tool);
        true
    } else {
        false
    }
}

/// Skip test if kubectl cannot reach a cluster
pub fn skip_if_no_cluster() -> bool {
    let reachable = std::process::Command::new("kubectl")
        .args(["cluster-info"])
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false);
    if !reachable {
        eprintln!("Skipping test: no reachable cluster");
    }
    !reachable
}

/// Kube client whose deployment and service reads replay a script
#[derive(Default)]
pub struct ScriptedKube {
    pub ready_pods: Mutex<VecDeque<Result<u32>>>,
    pub addresses: Mutex<VecDeque<Option<String>>>,
    pub polls: Mutex<u32>,
}

impl ScriptedKube {
    pub fn with_ready_pods(script: Vec<Result<u32>>) -> Self {
        Self {
            ready_pods: Mutex::new(script.into()),
            ..Default::default()
        }
    }

    pub fn with_addresses(script: Vec<Option<String>>) -> Self {
        Self {
            addresses: Mutex::new(script.into()),
            ..Default::default()
        }
    }

    pub fn polls(&self) -> u32 {
        *self.polls.lock().unwrap()
    }
}

#[async_trait]
impl KubeClient for ScriptedKube {
    async fn ensure_namespace(&self, _name: &str, _labels: &BTreeMap<String, String>) -> Result<()> {
        Ok(())
    }

    async fn deployment_ready_pods(&self, _namespace: &str, name: &str) -> Result<u32> {
        *self.polls.lock().unwrap() += 1;
        self.ready_pods
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(Error::not_found("deployment", name)))
    }

    async fn service_external_address(&self, _namespace: &str, _name: &str) -> Result<Option<String>> {
        *self.polls.lock().unwrap() += 1;
        Ok(self.addresses.lock().unwrap().pop_front().flatten())
    }

    async fn cluster_role_binding_exists(&self, _name: &str) -> Result<bool> {
        Ok(false)
    }

    async fn create_cluster_role_binding(&self, _name: &str, _role: &str, _subject: &Subject) -> Result<()> {
        Ok(())
    }

    async fn ensure_service_account(&self, _namespace: &str, _name: &str) -> Result<()> {
        Ok(())
    }

    async fn node_label(&self, _label: &str) -> Result<Option<String>> {
        Ok(None)
    }
}
