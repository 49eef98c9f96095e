//! Frozen bootstrap configuration

use super::flags::InitFlags;
use crate::provider::{Provider, ProviderProfile};

/// The validated configuration every bootstrap phase after finalisation reads
///
/// Built only by [`InitFlags::finalize`]. Fields are private so nothing can
/// change a value once later phases depend on it. The one post-freeze
/// change, the external DNS domain, produces a new value through
/// [`ClusterConfig::with_domain`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterConfig {
    provider: Provider,
    domain: Option<String>,
    namespace: String,
    tiller_cluster_role: String,
    tiller_namespace: String,
    ingress_namespace: String,
    ingress_service: String,
    ingress_deployment: String,
    external_ip: Option<String>,
    helm_client: bool,
    helm3: bool,
    helm_bin: Option<String>,
    recreate_existing_draft_repos: bool,
    global_tiller: bool,
    skip_ingress: bool,
    skip_tiller: bool,
    on_premise: bool,
    external_dns: bool,
    advanced_mode: bool,
}

/// Everything helm needs to initialise its client, and tiller when used
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HelmInitConfig {
    pub namespace: String,
    pub tiller_namespace: String,
    pub tiller_cluster_role: String,
    pub only_helm_client: bool,
    pub helm3: bool,
    pub skip_tiller: bool,
    pub global_tiller: bool,
}

impl ClusterConfig {
    pub(super) fn from_flags(flags: InitFlags, provider: Provider) -> Self {
        Self {
            provider,
            domain: flags.domain.filter(|d| !d.trim().is_empty()),
            namespace: flags.namespace,
            tiller_cluster_role: flags.tiller_cluster_role,
            tiller_namespace: flags.tiller_namespace,
            ingress_namespace: flags.ingress_namespace,
            ingress_service: flags.ingress_service,
            ingress_deployment: flags.ingress_deployment,
            external_ip: flags.external_ip.filter(|ip| !ip.trim().is_empty()),
            helm_client: flags.helm_client,
            helm3: flags.helm3,
            helm_bin: flags.helm_bin.filter(|b| !b.trim().is_empty()),
            recreate_existing_draft_repos: flags.recreate_existing_draft_repos,
            global_tiller: flags.global_tiller,
            skip_ingress: flags.skip_ingress,
            skip_tiller: flags.skip_tiller,
            on_premise: flags.on_premise,
            external_dns: flags.external_dns,
            advanced_mode: flags.advanced_mode,
        }
    }

    /// Copy of this configuration with the domain replaced
    pub fn with_domain(&self, domain: impl Into<String>) -> Self {
        Self {
            domain: Some(domain.into()),
            ..self.clone()
        }
    }

    pub fn provider(&self) -> Provider {
        self.provider
    }

    pub fn profile(&self) -> ProviderProfile {
        self.provider.profile()
    }

    pub fn domain(&self) -> Option<&str> {
        self.domain.as_deref()
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn tiller_cluster_role(&self) -> &str {
        &self.tiller_cluster_role
    }

    pub fn tiller_namespace(&self) -> &str {
        &self.tiller_namespace
    }

    pub fn ingress_namespace(&self) -> &str {
        &self.ingress_namespace
    }

    pub fn ingress_service(&self) -> &str {
        &self.ingress_service
    }

    pub fn ingress_deployment(&self) -> &str {
        &self.ingress_deployment
    }

    pub fn external_ip(&self) -> Option<&str> {
        self.external_ip.as_deref()
    }

    pub fn helm_client(&self) -> bool {
        self.helm_client
    }

    pub fn helm3(&self) -> bool {
        self.helm3
    }

    pub fn recreate_existing_draft_repos(&self) -> bool {
        self.recreate_existing_draft_repos
    }

    pub fn global_tiller(&self) -> bool {
        self.global_tiller
    }

    pub fn skip_ingress(&self) -> bool {
        self.skip_ingress
    }

    pub fn skip_tiller(&self) -> bool {
        self.skip_tiller
    }

    pub fn on_premise(&self) -> bool {
        self.on_premise
    }

    pub fn external_dns(&self) -> bool {
        self.external_dns
    }

    pub fn advanced_mode(&self) -> bool {
        self.advanced_mode
    }

    /// The helm executable to run
    pub fn helm_binary(&self) -> &str {
        super::flags::helm_binary(self.helm_bin.as_deref(), self.helm3)
    }

    /// Settings for the helm initialisation phase
    pub fn helm_init(&self) -> HelmInitConfig {
        HelmInitConfig {
            namespace: self.namespace.clone(),
            tiller_namespace: self.tiller_namespace.clone(),
            tiller_cluster_role: self.tiller_cluster_role.clone(),
            only_helm_client: self.helm_client,
            helm3: self.helm3,
            skip_tiller: self.skip_tiller,
            global_tiller: self.global_tiller,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ClusterConfig {
        InitFlags::default()
            .finalize(Provider::Eks, None)
            .expect("defaults finalize")
    }

    #[test]
    fn test_with_domain_leaves_original_untouched() {
        let original = config();
        let updated = original.with_domain("1.2.3.4.nip.io");
        assert_eq!(original.domain(), None);
        assert_eq!(updated.domain(), Some("1.2.3.4.nip.io"));
        assert_eq!(updated.namespace(), original.namespace());
    }

    #[test]
    fn test_blank_optionals_are_none() {
        let flags = InitFlags {
            domain: Some("  ".into()),
            external_ip: Some(String::new()),
            ..InitFlags::default()
        };
        let config = flags.finalize(Provider::Gke, None).unwrap();
        assert_eq!(config.domain(), None);
        assert_eq!(config.external_ip(), None);
    }

    #[test]
    fn test_helm_binary() {
        assert_eq!(config().helm_binary(), "helm");

        let helm3 = InitFlags {
            helm3: true,
            ..InitFlags::default()
        };
        assert_eq!(helm3.finalize(Provider::Gke, None).unwrap().helm_binary(), "helm3");

        let custom = InitFlags {
            helm3: true,
            helm_bin: Some("/opt/helm".into()),
            ..InitFlags::default()
        };
        assert_eq!(custom.finalize(Provider::Gke, None).unwrap().helm_binary(), "/opt/helm");
    }

    #[test]
    fn test_skip_tiller_implies_no_global_tiller() {
        let init = config().helm_init();
        assert!(init.skip_tiller);
        assert!(!init.global_tiller);
        assert!(init.only_helm_client);
    }
}
