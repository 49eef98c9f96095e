//! Mock implementations for testing
//!
//! Recording fakes of the cluster collaborators. Each one answers from
//! pre-configured state and records every call so tests can assert on what
//! the workflow did, without kubectl, helm or git.

#![allow(dead_code)]

use async_trait::async_trait;
use camino::Utf8PathBuf;
use kubeprep_bootstrap::Collaborators;
use kubeprep_cluster::{
    BuildPacks, CloudApi, DomainResolver, GitConfig, Helm, InstallChartOptions, KubeClient,
    Subject, VersionStream,
};
use kubeprep_core::{BatchPrompter, Error, HelmInitConfig, Prompter, Result};
use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex};

/// Mock Kubernetes API
#[derive(Default)]
pub struct MockKube {
    /// Ready pod counts by `namespace/deployment`, replayed then repeated
    ready_pods: Mutex<HashMap<String, VecDeque<u32>>>,
    /// External address by `namespace/service`
    addresses: Mutex<HashMap<String, String>>,
    bindings: Mutex<HashSet<String>>,
    node_labels: Mutex<HashMap<String, String>>,
    fail_namespace: Mutex<Option<String>>,
    /// kubectl stderr returned by every binding create
    fail_binding_create: Mutex<Option<String>>,
    calls: Mutex<Vec<String>>,
}

impl MockKube {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the ready pod counts returned for a deployment; the last one repeats
    pub fn with_ready_pods(self, namespace: &str, deployment: &str, counts: &[u32]) -> Self {
        self.ready_pods
            .lock()
            .unwrap()
            .insert(format!("{namespace}/{deployment}"), counts.iter().copied().collect());
        self
    }

    pub fn with_address(self, namespace: &str, service: &str, address: &str) -> Self {
        self.addresses
            .lock()
            .unwrap()
            .insert(format!("{namespace}/{service}"), address.to_string());
        self
    }

    pub fn with_binding(self, name: &str) -> Self {
        self.bindings.lock().unwrap().insert(name.to_string());
        self
    }

    pub fn with_node_label(self, label: &str, value: &str) -> Self {
        self.node_labels
            .lock()
            .unwrap()
            .insert(label.to_string(), value.to_string());
        self
    }

    pub fn failing_namespace(self, message: &str) -> Self {
        *self.fail_namespace.lock().unwrap() = Some(message.to_string());
        self
    }

    pub fn failing_binding_create(self, stderr: &str) -> Self {
        *self.fail_binding_create.lock().unwrap() = Some(stderr.to_string());
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.calls().iter().filter(|c| c.starts_with(prefix)).count()
    }

    pub fn bindings(&self) -> HashSet<String> {
        self.bindings.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl KubeClient for MockKube {
    async fn ensure_namespace(&self, name: &str, labels: &BTreeMap<String, String>) -> Result<()> {
        let labels: Vec<String> = labels.iter().map(|(k, v)| format!("{k}={v}")).collect();
        self.record(format!("ensure_namespace {name} {}", labels.join(",")));
        match self.fail_namespace.lock().unwrap().clone() {
            Some(message) => Err(Error::command("kubectl", &["create", "namespace", name], message)),
            None => Ok(()),
        }
    }

    async fn deployment_ready_pods(&self, namespace: &str, name: &str) -> Result<u32> {
        self.record(format!("deployment_ready_pods {namespace}/{name}"));
        let mut pods = self.ready_pods.lock().unwrap();
        let script = pods
            .get_mut(&format!("{namespace}/{name}"))
            .ok_or_else(|| Error::not_found("deployment", name))?;
        let count = if script.len() > 1 {
            script.pop_front()
        } else {
            script.front().copied()
        };
        Ok(count.unwrap_or(0))
    }

    async fn service_external_address(&self, namespace: &str, name: &str) -> Result<Option<String>> {
        self.record(format!("service_external_address {namespace}/{name}"));
        Ok(self
            .addresses
            .lock()
            .unwrap()
            .get(&format!("{namespace}/{name}"))
            .cloned())
    }

    async fn cluster_role_binding_exists(&self, name: &str) -> Result<bool> {
        self.record(format!("cluster_role_binding_exists {name}"));
        Ok(self.bindings.lock().unwrap().contains(name))
    }

    async fn create_cluster_role_binding(&self, name: &str, role: &str, subject: &Subject) -> Result<()> {
        self.record(format!("create_cluster_role_binding {name} {role} {subject:?}"));
        if let Some(stderr) = self.fail_binding_create.lock().unwrap().clone() {
            return Err(Error::command(
                "kubectl",
                &["create", "clusterrolebinding", name],
                stderr,
            ));
        }
        if !self.bindings.lock().unwrap().insert(name.to_string()) {
            return Err(Error::already_exists("clusterrolebinding", name));
        }
        Ok(())
    }

    async fn ensure_service_account(&self, namespace: &str, name: &str) -> Result<()> {
        self.record(format!("ensure_service_account {namespace}/{name}"));
        Ok(())
    }

    async fn node_label(&self, label: &str) -> Result<Option<String>> {
        self.record(format!("node_label {label}"));
        Ok(self.node_labels.lock().unwrap().get(label).cloned())
    }
}

/// Mock helm that fails the first `init_failures` inits and every install
/// when `install_fails` is set
#[derive(Default)]
pub struct MockHelm {
    init_failures: Mutex<u32>,
    install_fails: bool,
    pub inits: Mutex<Vec<HelmInitConfig>>,
    pub installs: Mutex<Vec<InstallChartOptions>>,
}

impl MockHelm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_init(failures: u32) -> Self {
        Self {
            init_failures: Mutex::new(failures),
            ..Self::default()
        }
    }

    pub fn failing_install() -> Self {
        Self {
            install_fails: true,
            ..Self::default()
        }
    }

    pub fn init_count(&self) -> usize {
        self.inits.lock().unwrap().len()
    }

    pub fn install_count(&self) -> usize {
        self.installs.lock().unwrap().len()
    }

    pub fn last_install(&self) -> Option<InstallChartOptions> {
        self.installs.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl Helm for MockHelm {
    async fn init(&self, config: &HelmInitConfig) -> Result<()> {
        self.inits.lock().unwrap().push(config.clone());
        let mut failures = self.init_failures.lock().unwrap();
        if *failures > 0 {
            *failures -= 1;
            return Err(Error::command("helm", &["init"], "connection refused"));
        }
        Ok(())
    }

    async fn install_chart(&self, options: &InstallChartOptions) -> Result<()> {
        self.installs.lock().unwrap().push(options.clone());
        if self.install_fails {
            return Err(Error::command("helm", &["upgrade", "--install"], "chart repo unavailable"));
        }
        Ok(())
    }
}

/// Mock build packs recording each install
#[derive(Default)]
pub struct MockBuildPacks {
    pub installs: Mutex<Vec<bool>>,
}

#[async_trait]
impl BuildPacks for MockBuildPacks {
    async fn install_default(&self, recreate: bool) -> Result<Utf8PathBuf> {
        self.installs.lock().unwrap().push(recreate);
        Ok(Utf8PathBuf::from("/tmp/kubeprep/draft/packs"))
    }
}

/// Mock version stream pinning a single version for every chart
pub struct MockVersions(pub Option<String>);

#[async_trait]
impl VersionStream for MockVersions {
    async fn chart_version(&self, _chart: &str) -> Result<Option<String>> {
        Ok(self.0.clone())
    }
}

/// Version stream whose repository cannot be read
pub struct FailingVersions;

#[async_trait]
impl VersionStream for FailingVersions {
    async fn chart_version(&self, _chart: &str) -> Result<Option<String>> {
        Err(Error::command(
            "git",
            &["clone", "https://github.com/jenkins-x/jenkins-x-versions.git"],
            "fatal: unable to access repository",
        ))
    }
}

/// Mock domain resolver producing `<address>.nip.io`
#[derive(Default)]
pub struct MockDomains {
    pub lookups: Mutex<Vec<String>>,
}

#[async_trait]
impl DomainResolver for MockDomains {
    async fn domain_for(&self, address: &str) -> Result<String> {
        self.lookups.lock().unwrap().push(address.to_string());
        Ok(format!("{address}.nip.io"))
    }
}

/// Mock global git config backed by a map
#[derive(Default)]
pub struct MockGit {
    pub values: Mutex<HashMap<String, String>>,
}

impl MockGit {
    pub fn configured() -> Self {
        let git = Self::default();
        {
            let mut values = git.values.lock().unwrap();
            values.insert("user.name".into(), "Dev".into());
            values.insert("user.email".into(), "dev@corp.io".into());
        }
        git
    }

    pub fn value(&self, key: &str) -> Option<String> {
        self.values.lock().unwrap().get(key).cloned()
    }
}

#[async_trait]
impl GitConfig for MockGit {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.value(key))
    }

    async fn set_global(&self, key: &str, value: &str) -> Result<()> {
        self.values
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Mock cloud API answering a fixed cluster id and recording the names asked about
pub struct MockCloud {
    id: String,
    pub lookups: Mutex<Vec<String>>,
}

impl MockCloud {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            lookups: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl CloudApi for MockCloud {
    async fn cluster_id(&self, cluster_name: &str) -> Result<String> {
        self.lookups.lock().unwrap().push(cluster_name.to_string());
        Ok(self.id.clone())
    }
}

/// Typed handles on the fakes behind a `Collaborators` bundle
pub struct Fakes {
    pub kube: Arc<MockKube>,
    pub helm: Arc<MockHelm>,
    pub build_packs: Arc<MockBuildPacks>,
    pub domains: Arc<MockDomains>,
    pub git: Arc<MockGit>,
    pub cloud: Arc<MockCloud>,
}

impl Fakes {
    pub fn new(kube: MockKube, helm: MockHelm) -> Self {
        Self {
            kube: Arc::new(kube),
            helm: Arc::new(helm),
            build_packs: Arc::new(MockBuildPacks::default()),
            domains: Arc::new(MockDomains::default()),
            git: Arc::new(MockGit::configured()),
            cloud: Arc::new(MockCloud::new("BQ2D8E0D0")),
        }
    }

    pub fn collaborators(&self, prompter: Arc<dyn Prompter>) -> Collaborators {
        Collaborators {
            kube: self.kube.clone(),
            helm: self.helm.clone(),
            build_packs: self.build_packs.clone(),
            versions: Arc::new(MockVersions(Some("1.3.1".into()))),
            domains: self.domains.clone(),
            git: self.git.clone(),
            cloud: self.cloud.clone(),
            prompter,
        }
    }

    pub fn batch(&self) -> Collaborators {
        self.collaborators(Arc::new(BatchPrompter))
    }
}
