//! Cluster bootstrap orchestration
//!
//! Runs the fixed bootstrap sequence against a cluster. `InitFlags` is only
//! written by the configuration phases (normalisation, provider resolution,
//! provider pre-configuration, injected-ingress renaming); after
//! `InitFlags::finalize` every phase reads the frozen `ClusterConfig`.
//! The first fatal failure aborts the remaining phases; nothing is rolled back.

use crate::admin::{ensure_user_role_binding, resolve_username};
use crate::git::validate_git;
use crate::ingress::{IngressProvisioner, IngressState};
use camino::Utf8PathBuf;
use kubeprep_cluster::helm::TILLER_SERVICE_ACCOUNT;
use kubeprep_cluster::ibmcloud::CLUSTER_ID_LABEL;
use kubeprep_cluster::wait::{wait_for_deployment_ready, INJECTED_INGRESS_TIMEOUT};
use kubeprep_cluster::{
    BuildPacks, CloudApi, DomainResolver, GitConfig, Helm, KubeClient, KubeConfig, Subject,
    VersionStream,
};
use kubeprep_core::config::options;
use kubeprep_core::provider::injected_ingress_name;
use kubeprep_core::retry::retry;
use kubeprep_core::{
    ClusterConfig, Error, InitFlags, Prompter, Provider, ProviderProfile, Result, RetryPolicy,
};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Everything outside the process the bootstrap talks to
#[derive(Clone)]
pub struct Collaborators {
    pub kube: Arc<dyn KubeClient>,
    pub helm: Arc<dyn Helm>,
    pub build_packs: Arc<dyn BuildPacks>,
    pub versions: Arc<dyn VersionStream>,
    pub domains: Arc<dyn DomainResolver>,
    pub git: Arc<dyn GitConfig>,
    pub cloud: Arc<dyn CloudApi>,
    pub prompter: Arc<dyn Prompter>,
}

/// Outcome of a successful bootstrap
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapReport {
    pub provider: Provider,
    pub namespace: String,
    /// Domain from the configuration, external DNS or ingress provisioning
    pub domain: Option<String>,
    /// `None` when ingress was skipped with `--skip-ingress`
    pub ingress: Option<IngressState>,
}

/// The cluster bootstrap orchestrator
pub struct Bootstrap {
    collaborators: Collaborators,
    kubeconfig: KubeConfig,
    values_dir: Utf8PathBuf,
}

impl Bootstrap {
    /// Create an orchestrator; `kubeconfig` is the snapshot used for the
    /// current user, namespace and API server
    pub fn new(collaborators: Collaborators, kubeconfig: KubeConfig) -> Self {
        Self {
            collaborators,
            kubeconfig,
            values_dir: Utf8PathBuf::from("."),
        }
    }

    /// Directory searched for the user ingress values file
    pub fn with_values_dir(mut self, dir: impl Into<Utf8PathBuf>) -> Self {
        self.values_dir = dir.into();
        self
    }

    fn prompter(&self) -> &dyn Prompter {
        self.collaborators.prompter.as_ref()
    }

    fn kube(&self) -> &dyn KubeClient {
        self.collaborators.kube.as_ref()
    }

    pub async fn run(&self, mut flags: InitFlags) -> Result<BootstrapReport> {
        flags.normalize();

        let provider = self.resolve_provider(&flags)?;
        let profile = provider.profile();
        info!("Preparing a {} cluster", provider);

        if flags.no_git_validate {
            debug!("Skipping git identity validation");
        } else {
            validate_git(self.collaborators.git.as_ref(), self.prompter()).await?;
        }

        if !flags.skip_cluster_role {
            let user = resolve_username(
                flags.username.as_deref(),
                self.kubeconfig.current_user(),
                self.prompter(),
            )?;
            ensure_user_role_binding(self.kube(), &user, &flags.user_cluster_role).await?;
            flags.username = Some(user);
        }

        self.preconfigure(&mut flags, &profile)?;

        if profile.awaits_injected_ingress() {
            self.await_injected_ingress(&mut flags).await?;
        }

        let current_namespace = if flags.needs_current_namespace() {
            self.kubeconfig.current_namespace()
        } else {
            None
        };
        let mut config = flags.finalize(provider, current_namespace)?;

        self.init_helm(&config).await?;

        let packs = self
            .collaborators
            .build_packs
            .install_default(config.recreate_existing_draft_repos())
            .await?;
        debug!("Build packs installed in {}", packs);

        if config.external_dns() {
            if let Some(domain) = self.external_dns_domain(&config)? {
                config = config.with_domain(domain);
            }
        }

        let ingress = if config.skip_ingress() {
            info!("Skipping ingress installation");
            None
        } else {
            let provisioner = IngressProvisioner::new(
                self.kube(),
                self.collaborators.helm.as_ref(),
                self.collaborators.versions.as_ref(),
                self.collaborators.domains.as_ref(),
                self.prompter(),
            )
            .with_current_server(self.kubeconfig.current_server())
            .with_values_dir(self.values_dir.clone());
            Some(provisioner.provision(&config).await?)
        };

        let domain = ingress
            .as_ref()
            .and_then(|state| state.domain.clone())
            .or_else(|| config.domain().map(str::to_string));

        Ok(BootstrapReport {
            provider,
            namespace: config.namespace().to_string(),
            domain,
            ingress,
        })
    }

    fn resolve_provider(&self, flags: &InitFlags) -> Result<Provider> {
        if let Some(id) = flags.provider.as_deref().filter(|id| !id.trim().is_empty()) {
            return Ok(Provider::parse(id).unwrap_or_else(|| {
                warn!("Unknown provider '{}', using the generic kubernetes defaults", id);
                Provider::Kubernetes
            }));
        }

        if self.prompter().is_batch() {
            return Err(Error::missing_option(options::PROVIDER));
        }

        let choice = self
            .prompter()
            .select("Cloud Provider", &Provider::ids(), None)?
            .ok_or_else(|| Error::missing_option(options::PROVIDER))?;
        Ok(Provider::from_id_or_default(&choice))
    }

    /// Apply the profile's overrides and collect anything it needs up front
    fn preconfigure(&self, flags: &mut InitFlags, profile: &ProviderProfile) -> Result<()> {
        flags.apply_profile(profile);
        for note in profile.setup_notes {
            info!("{}", note);
        }

        if !profile.collect_ip_and_domain || flags.external_ip.is_some() {
            return Ok(());
        }
        if self.prompter().is_batch() {
            return Ok(());
        }

        let ip = self.prompter().input(
            "Provide the external IP to use, typically the IP of your master node",
            "",
        )?;
        let ip = ip.trim();
        if ip.is_empty() {
            return Ok(());
        }
        flags.external_ip = Some(ip.to_string());

        if flags.domain.is_none() {
            let domain = self
                .prompter()
                .input("Provide the domain to use", &format!("{ip}.nip.io"))?;
            flags.domain = Some(domain.trim().to_string()).filter(|d| !d.is_empty());
        }
        Ok(())
    }

    /// Point the ingress names at the platform's controller and wait for it
    async fn await_injected_ingress(&self, flags: &mut InitFlags) -> Result<()> {
        let cluster_id = match self.kube().node_label(CLUSTER_ID_LABEL).await {
            Ok(Some(id)) => id,
            other => {
                if let Err(e) = other {
                    debug!("Could not read {} from the nodes: {}", CLUSTER_ID_LABEL, e);
                }
                let cluster = self
                    .kubeconfig
                    .current_context()
                    .and_then(|c| self.kubeconfig.context(c))
                    .map(|c| c.cluster)
                    .ok_or(Error::NoContexts)?;
                self.collaborators.cloud.cluster_id(&cluster).await?
            }
        };

        let name = injected_ingress_name(&cluster_id);
        flags.use_injected_ingress(&name);
        info!("Waiting for the platform ingress controller {}", name);

        wait_for_deployment_ready(
            self.kube(),
            &flags.ingress_namespace,
            &name,
            INJECTED_INGRESS_TIMEOUT,
        )
        .await
    }

    async fn init_helm(&self, config: &ClusterConfig) -> Result<()> {
        let helm_init = config.helm_init();

        if !helm_init.skip_tiller {
            let namespace = if helm_init.global_tiller {
                config.tiller_namespace()
            } else {
                config.namespace()
            };
            self.kube()
                .ensure_service_account(namespace, TILLER_SERVICE_ACCOUNT)
                .await?;

            let binding = format!("{TILLER_SERVICE_ACCOUNT}-{namespace}");
            if !self.kube().cluster_role_binding_exists(&binding).await? {
                let subject = Subject::ServiceAccount {
                    namespace: namespace.to_string(),
                    name: TILLER_SERVICE_ACCOUNT.to_string(),
                };
                match self
                    .kube()
                    .create_cluster_role_binding(&binding, config.tiller_cluster_role(), &subject)
                    .await
                {
                    Err(e) if !e.is_already_exists() => return Err(e),
                    _ => {}
                }
            }
        }

        let helm = self.collaborators.helm.as_ref();
        retry("helm init", &RetryPolicy::HELM_INIT, || helm.init(&helm_init)).await?;
        info!("helm installed and configured");
        Ok(())
    }

    fn external_dns_domain(&self, config: &ClusterConfig) -> Result<Option<String>> {
        if self.prompter().is_batch() {
            return Ok(None);
        }
        let domain = self
            .prompter()
            .input("Provide the domain external DNS should manage", config.domain().unwrap_or(""))?;
        Ok(Some(domain.trim().to_string()).filter(|d| !d.is_empty()))
    }
}
