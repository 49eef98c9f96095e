//! Ingress provisioning
//!
//! Drives the ingress namespace, controller, external address and domain
//! through a fixed sequence of phases:
//!
//! ```text
//! Start -> NamespaceEnsured -> Skipped
//!                           -> ControllerPresent     -> DeploymentReady
//!                           -> ControllerInstalling  -> DeploymentReady
//!                           -> Declined
//! DeploymentReady -> ExternalIpResolved -> DomainResolved -> Done
//! ```
//!
//! `Skipped`, `Declined` and `Done` are terminal successes. Any wait that
//! expires ends provisioning with a timeout error.

use camino::{Utf8Path, Utf8PathBuf};
use kubeprep_cluster::helm::InstallChartOptions;
use kubeprep_cluster::wait::{
    wait_for_deployment_ready, wait_for_external_address, DEPLOYMENT_READY_TIMEOUT,
    EXTERNAL_IP_TIMEOUT,
};
use kubeprep_cluster::{DomainResolver, Helm, KubeClient, VersionStream};
use kubeprep_core::config::{options, DEFAULT_INGRESS_SERVICE_NAME};
use kubeprep_core::retry::retry;
use kubeprep_core::{ClusterConfig, Error, Prompter, ProviderProfile, Result, RetryPolicy};
use std::collections::BTreeMap;
use std::io::Write;
use tempfile::NamedTempFile;
use tracing::{debug, error, info, warn};
use url::Url;

/// Release name of the installed ingress controller
pub const INGRESS_RELEASE: &str = "jxing";

/// Label put on the ingress namespace
pub const INGRESS_NAMESPACE_LABEL: (&str, &str) = ("jenkins.io/kind", "ingress");

/// Helm values file picked up from the working directory when present
pub const USER_VALUES_FILE: &str = "myvalues.yaml";

/// Phases of ingress provisioning
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngressPhase {
    Start,
    NamespaceEnsured,
    /// The provider routes traffic itself
    Skipped,
    ControllerPresent,
    ControllerInstalling,
    /// The operator chose not to install a controller
    Declined,
    DeploymentReady,
    ExternalIpResolved,
    DomainResolved,
    Done,
}

impl IngressPhase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Skipped | Self::Declined | Self::Done)
    }
}

/// What provisioning found and did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngressState {
    pub phase: IngressPhase,
    pub controller_present: bool,
    /// Whether the chart install succeeded
    pub installed: bool,
    pub deployment_ready: bool,
    pub external_ip: Option<String>,
    pub domain: Option<String>,
}

impl IngressState {
    fn new() -> Self {
        Self {
            phase: IngressPhase::Start,
            controller_present: false,
            installed: false,
            deployment_ready: false,
            external_ip: None,
            domain: None,
        }
    }

    fn advance(&mut self, phase: IngressPhase) {
        debug!("Ingress: {:?} -> {:?}", self.phase, phase);
        self.phase = phase;
    }
}

/// Detects, installs and waits for the ingress controller, then resolves a domain
pub struct IngressProvisioner<'a> {
    kube: &'a dyn KubeClient,
    helm: &'a dyn Helm,
    versions: &'a dyn VersionStream,
    domains: &'a dyn DomainResolver,
    prompter: &'a dyn Prompter,
    /// API server URL of the current context, used in on-premise mode
    current_server: Option<&'a str>,
    values_dir: Utf8PathBuf,
}

impl<'a> IngressProvisioner<'a> {
    pub fn new(
        kube: &'a dyn KubeClient,
        helm: &'a dyn Helm,
        versions: &'a dyn VersionStream,
        domains: &'a dyn DomainResolver,
        prompter: &'a dyn Prompter,
    ) -> Self {
        Self {
            kube,
            helm,
            versions,
            domains,
            prompter,
            current_server: None,
            values_dir: Utf8PathBuf::from("."),
        }
    }

    pub fn with_current_server(mut self, server: Option<&'a str>) -> Self {
        self.current_server = server;
        self
    }

    /// Directory searched for the user values file
    pub fn with_values_dir(mut self, dir: impl Into<Utf8PathBuf>) -> Self {
        self.values_dir = dir.into();
        self
    }

    pub async fn provision(&self, config: &ClusterConfig) -> Result<IngressState> {
        let profile = config.profile();
        let namespace = config.ingress_namespace();
        let mut state = IngressState::new();

        let labels = BTreeMap::from([(
            INGRESS_NAMESPACE_LABEL.0.to_string(),
            INGRESS_NAMESPACE_LABEL.1.to_string(),
        )]);
        self.kube
            .ensure_namespace(namespace, &labels)
            .await
            .map_err(|e| Error::NamespaceCreate {
                namespace: namespace.to_string(),
                message: e.to_string(),
            })?;
        state.advance(IngressPhase::NamespaceEnsured);

        if profile.skips_ingress() {
            info!("{} provides its own routing, skipping ingress", profile.provider);
            state.advance(IngressPhase::Skipped);
            return Ok(state);
        }

        let pods = self
            .kube
            .deployment_ready_pods(namespace, config.ingress_deployment())
            .await
            .unwrap_or_else(|e| {
                debug!("Treating ingress pod count as 0: {}", e);
                0
            });

        if pods > 0 {
            info!(
                "Existing ingress controller found in the {} namespace, no need to install a new one",
                namespace
            );
            state.controller_present = true;
            state.advance(IngressPhase::ControllerPresent);
        } else if profile.awaits_injected_ingress() {
            wait_for_deployment_ready(
                self.kube,
                namespace,
                config.ingress_deployment(),
                DEPLOYMENT_READY_TIMEOUT,
            )
            .await?;
        } else {
            if !self.confirm_install(config)? {
                info!("Not installing an ingress controller");
                state.advance(IngressPhase::Declined);
                return Ok(state);
            }

            state.advance(IngressPhase::ControllerInstalling);
            state.installed = self.install_controller(config, &profile).await?;

            wait_for_deployment_ready(
                self.kube,
                namespace,
                config.ingress_deployment(),
                DEPLOYMENT_READY_TIMEOUT,
            )
            .await?;
        }
        state.deployment_ready = true;
        state.advance(IngressPhase::DeploymentReady);

        let external_ip = self.resolve_external_ip(config, &profile).await?;
        state.external_ip = Some(external_ip.clone());
        state.advance(IngressPhase::ExternalIpResolved);

        let domain = self.resolve_domain(config, &external_ip).await?;
        state.domain = Some(domain);
        state.advance(IngressPhase::DomainResolved);

        state.advance(IngressPhase::Done);
        Ok(state)
    }

    fn confirm_install(&self, config: &ClusterConfig) -> Result<bool> {
        let namespace = config.ingress_namespace();
        if self.prompter.is_batch() {
            return Ok(true);
        }
        if config.advanced_mode() {
            return self.prompter.confirm(
                &format!(
                    "No existing ingress controller found in the {namespace} namespace, shall we install one?"
                ),
                true,
            );
        }
        info!(
            "No existing ingress controller found in the {} namespace, installing one",
            namespace
        );
        Ok(true)
    }

    /// Install the controller chart under the ingress retry policy
    ///
    /// Exhausting the retries is logged and reported as `false`. Failures
    /// preparing the install, including reading the pinned chart version,
    /// are errors.
    async fn install_controller(
        &self,
        config: &ClusterConfig,
        profile: &ProviderProfile,
    ) -> Result<bool> {
        let version = self
            .versions
            .chart_version(profile.chart)
            .await
            .map_err(|e| Error::version_lookup(profile.chart, e))?;

        let mut value_files = Vec::new();
        let user_values = self.values_dir.join(USER_VALUES_FILE);
        if user_values.exists() {
            value_files.push(user_values);
        }

        // Kept alive until the install has run
        let provider_values = profile
            .chart_values
            .map(write_values_file)
            .transpose()?;
        if let Some(file) = &provider_values {
            value_files.push(utf8_path(file.path())?);
        }

        let options = InstallChartOptions {
            chart: profile.chart.to_string(),
            release_name: INGRESS_RELEASE.to_string(),
            version,
            namespace: config.ingress_namespace().to_string(),
            set_values: vec![
                "rbac.create=true".to_string(),
                format!(
                    "controller.extraArgs.publish-service={}/{}",
                    config.ingress_namespace(),
                    DEFAULT_INGRESS_SERVICE_NAME
                ),
            ],
            value_files,
            helm_update: true,
        };

        let installed = retry(
            "install ingress chart",
            &RetryPolicy::INGRESS_CHART,
            || self.helm.install_chart(&options),
        )
        .await;

        match installed {
            Ok(()) => Ok(true),
            Err(e) => {
                error!("Failed to install the ingress controller: {}", e);
                Ok(false)
            }
        }
    }

    async fn resolve_external_ip(
        &self,
        config: &ClusterConfig,
        profile: &ProviderProfile,
    ) -> Result<String> {
        if let Some(ip) = config.external_ip() {
            debug!("Using supplied external IP {}", ip);
            return Ok(ip.to_string());
        }

        if config.on_premise() {
            match self.current_server {
                Some(server) => return host_of(server),
                None => warn!(
                    "No API server URL in the current context, waiting for a load balancer instead"
                ),
            }
        }

        if let Some(note) = profile.load_balancer_note {
            warn!("Note: {}", note);
        }

        wait_for_external_address(
            self.kube,
            config.ingress_namespace(),
            config.ingress_service(),
            EXTERNAL_IP_TIMEOUT,
        )
        .await
    }

    async fn resolve_domain(&self, config: &ClusterConfig, external_ip: &str) -> Result<String> {
        let domain = match config.domain() {
            Some(domain) => domain.to_string(),
            None => {
                let derived = self.domains.domain_for(external_ip).await?;
                info!(
                    "You can now configure a wildcard DNS pointing to the new loadbalancer address {}",
                    external_ip
                );
                if self.prompter.is_batch() {
                    derived
                } else {
                    self.prompter.input("Domain", &derived)?
                }
            }
        };

        let domain = domain.trim().to_string();
        if domain.is_empty() {
            return Err(Error::missing_option(options::DOMAIN));
        }
        Ok(domain)
    }
}

/// Host part of an API server URL
pub fn host_of(server: &str) -> Result<String> {
    let url = Url::parse(server).map_err(|e| {
        Error::invalid_url(
            server,
            format!("{e}. Try supplying the ingress address with --external-ip"),
        )
    })?;
    url.host_str()
        .filter(|h| !h.is_empty())
        .map(|h| h.trim_matches(|c| c == '[' || c == ']').to_string())
        .ok_or_else(|| {
            Error::invalid_url(
                server,
                "no host. Try supplying the ingress address with --external-ip",
            )
        })
}

fn write_values_file(content: &str) -> Result<NamedTempFile> {
    let mut file = tempfile::Builder::new()
        .prefix("ingress-values-")
        .suffix(".yaml")
        .tempfile()?;
    file.write_all(content.as_bytes())?;
    file.flush()?;
    Ok(file)
}

fn utf8_path(path: &std::path::Path) -> Result<Utf8PathBuf> {
    Utf8Path::from_path(path)
        .map(Utf8Path::to_path_buf)
        .ok_or_else(|| Error::invalid_config("temporary directory path is not valid UTF-8"))
}
