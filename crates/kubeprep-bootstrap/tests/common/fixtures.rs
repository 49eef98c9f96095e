//! Kubeconfig and configuration fixtures

#![allow(dead_code)]

use camino::{Utf8Path, Utf8PathBuf};
use kubeprep_core::{ClusterConfig, InitFlags, Provider};
use std::fs;
use tempfile::TempDir;

/// Two contexts, `prod` current, each with its own server and namespace
pub const TWO_CONTEXTS: &str = r#"apiVersion: v1
kind: Config
preferences: {}
clusters:
- name: prod-cluster
  cluster:
    server: https://prod.corp.example:6443
    certificate-authority-data: UFJPRA==
- name: staging-cluster
  cluster:
    server: https://10.0.0.5:6443
contexts:
- name: prod
  context:
    cluster: prod-cluster
    user: admin@corp.example
    namespace: jx-production
- name: staging
  context:
    cluster: staging-cluster
    user: admin@corp.example
    namespace: jx-staging
current-context: prod
users:
- name: admin@corp.example
  user:
    token: s3cr3t
"#;

/// A kubeconfig with no contexts at all
pub const NO_CONTEXTS: &str = "apiVersion: v1\nkind: Config\nclusters: []\ncontexts: []\n";

/// Write `content` as `config` inside a fresh temporary directory
pub fn kubeconfig_file(content: &str) -> (TempDir, Utf8PathBuf) {
    let dir = TempDir::new().unwrap();
    let path = Utf8Path::from_path(dir.path()).unwrap().join("config");
    fs::write(&path, content).unwrap();
    (dir, path)
}

/// Finalised configuration for a provider, batch defaults otherwise
pub fn cluster_config(provider: Provider, tweak: impl FnOnce(&mut InitFlags)) -> ClusterConfig {
    let mut flags = InitFlags {
        provider: Some(provider.id().to_string()),
        batch_mode: true,
        ..InitFlags::default()
    };
    flags.apply_profile(&provider.profile());
    tweak(&mut flags);
    flags.finalize(provider, None).unwrap()
}
