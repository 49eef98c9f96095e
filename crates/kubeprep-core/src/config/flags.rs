//! Mutable init flags and the configuration phases that act on them

use super::cluster_config::ClusterConfig;
use super::{
    options, DEFAULT_CLUSTER_ROLE, DEFAULT_INGRESS_NAMESPACE, DEFAULT_INGRESS_SERVICE_NAME,
    DEFAULT_NAMESPACE, DEFAULT_TILLER_NAMESPACE, DEFAULT_VERSIONS_REF,
    DEFAULT_VERSIONS_REPOSITORY,
};
use crate::error::{Error, Result};
use crate::provider::{Provider, ProviderProfile};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Every option of `init`, before finalisation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct InitFlags {
    pub domain: Option<String>,
    pub provider: Option<String>,
    pub namespace: String,
    pub username: Option<String>,
    pub user_cluster_role: String,
    pub tiller_cluster_role: String,
    pub tiller_namespace: String,
    pub ingress_namespace: String,
    pub ingress_service: String,
    pub ingress_deployment: String,
    pub external_ip: Option<String>,
    pub versions_repository: String,
    pub versions_git_ref: String,
    pub draft_client: bool,
    pub helm_client: bool,
    pub helm3: bool,
    pub helm_bin: Option<String>,
    pub recreate_existing_draft_repos: bool,
    pub no_tiller: bool,
    pub remote_tiller: bool,
    pub global_tiller: bool,
    pub skip_ingress: bool,
    pub skip_tiller: bool,
    pub skip_cluster_role: bool,
    pub on_premise: bool,
    pub no_git_validate: bool,
    pub external_dns: bool,
    pub advanced_mode: bool,
    pub batch_mode: bool,
}

impl Default for InitFlags {
    fn default() -> Self {
        Self {
            domain: None,
            provider: None,
            namespace: DEFAULT_NAMESPACE.to_string(),
            username: None,
            user_cluster_role: DEFAULT_CLUSTER_ROLE.to_string(),
            tiller_cluster_role: DEFAULT_CLUSTER_ROLE.to_string(),
            tiller_namespace: DEFAULT_TILLER_NAMESPACE.to_string(),
            ingress_namespace: DEFAULT_INGRESS_NAMESPACE.to_string(),
            ingress_service: DEFAULT_INGRESS_SERVICE_NAME.to_string(),
            ingress_deployment: DEFAULT_INGRESS_SERVICE_NAME.to_string(),
            external_ip: None,
            versions_repository: DEFAULT_VERSIONS_REPOSITORY.to_string(),
            versions_git_ref: DEFAULT_VERSIONS_REF.to_string(),
            draft_client: false,
            helm_client: false,
            helm3: false,
            helm_bin: None,
            recreate_existing_draft_repos: false,
            no_tiller: true,
            remote_tiller: true,
            global_tiller: true,
            skip_ingress: false,
            skip_tiller: false,
            skip_cluster_role: false,
            on_premise: false,
            no_git_validate: false,
            external_dns: false,
            advanced_mode: false,
            batch_mode: false,
        }
    }
}

impl InitFlags {
    /// Reconcile the tiller and helm flags
    ///
    /// helm3 never uses tiller; without a remote tiller, or with tiller
    /// disabled, helm runs client-only. Applying this more than once yields
    /// the same flags.
    pub fn normalize(&mut self) {
        if self.helm3 {
            self.skip_tiller = true;
            self.no_tiller = true;
        }
        if !self.remote_tiller || self.no_tiller {
            self.helm_client = true;
            self.skip_tiller = true;
            self.global_tiller = false;
        }
        if self.skip_tiller {
            self.global_tiller = false;
        }
    }

    /// Apply a provider's naming overrides
    ///
    /// Conditional renames only replace names still at the generic default,
    /// so explicit `--ingress-deployment` / `--ingress-service` values survive.
    pub fn apply_profile(&mut self, profile: &ProviderProfile) {
        if let Some(ns) = profile.ingress_namespace {
            self.ingress_namespace = ns.to_string();
        }
        if let Some(svc) = profile.ingress_service {
            self.ingress_service = svc.to_string();
        }
        if let Some(deploy) = profile.ingress_deployment {
            self.ingress_deployment = deploy.to_string();
        }
        if let Some(ns) = profile.namespace {
            self.namespace = ns.to_string();
        }
        if let Some(ns) = profile.tiller_namespace {
            self.tiller_namespace = ns.to_string();
        }
        if let Some(renames) = profile.default_renames {
            if self.ingress_deployment == DEFAULT_INGRESS_SERVICE_NAME {
                self.ingress_deployment = renames.deployment.to_string();
            }
            if self.ingress_service == DEFAULT_INGRESS_SERVICE_NAME {
                self.ingress_service = renames.service.to_string();
            }
        }
    }

    /// Point the ingress deployment and service at a platform-injected controller
    pub fn use_injected_ingress(&mut self, name: &str) {
        self.ingress_deployment = name.to_string();
        self.ingress_service = name.to_string();
    }

    /// The helm executable to run
    ///
    /// An explicit `helm_bin` wins; otherwise helm3 runs as `helm3`.
    pub fn helm_binary(&self) -> &str {
        helm_binary(self.helm_bin.as_deref(), self.helm3)
    }

    /// Whether finalisation will need the namespace of the current context
    pub fn needs_current_namespace(&self) -> bool {
        self.namespace.trim().is_empty()
    }

    /// Validate the draft and freeze it
    ///
    /// `current_namespace` is the namespace of the active kube context, used
    /// when no namespace was configured.
    pub fn finalize(
        mut self,
        provider: Provider,
        current_namespace: Option<String>,
    ) -> Result<ClusterConfig> {
        self.normalize();

        if !self.skip_tiller && self.global_tiller && self.tiller_namespace.trim().is_empty() {
            return Err(Error::missing_option(options::TILLER_NAMESPACE));
        }

        if self.needs_current_namespace() {
            self.namespace = current_namespace
                .filter(|ns| !ns.trim().is_empty())
                .ok_or_else(|| Error::missing_option(options::NAMESPACE))?;
        }

        for (value, option) in [
            (&self.ingress_namespace, options::INGRESS_NAMESPACE),
            (&self.ingress_service, options::INGRESS_SERVICE),
            (&self.ingress_deployment, options::INGRESS_DEPLOYMENT),
        ] {
            if value.trim().is_empty() {
                return Err(Error::missing_option(option));
            }
        }

        if self.skip_ingress && self.external_ip.is_none() {
            warn!(
                "Expecting ingress controller to be installed in {}/{}",
                self.ingress_namespace, self.ingress_deployment
            );
        }

        Ok(ClusterConfig::from_flags(self, provider))
    }
}

pub(super) fn helm_binary(helm_bin: Option<&str>, helm3: bool) -> &str {
    match helm_bin.filter(|b| !b.trim().is_empty()) {
        Some(bin) => bin,
        None if helm3 => "helm3",
        None => "helm",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let flags = InitFlags::default();
        assert_eq!(flags.namespace, "jx");
        assert_eq!(flags.ingress_namespace, "kube-system");
        assert_eq!(flags.ingress_deployment, DEFAULT_INGRESS_SERVICE_NAME);
        assert!(flags.no_tiller);
        assert!(flags.remote_tiller);
    }

    #[test]
    fn test_helm3_forces_no_tiller_idempotently() {
        let mut flags = InitFlags {
            helm3: true,
            no_tiller: false,
            skip_tiller: false,
            global_tiller: true,
            ..InitFlags::default()
        };
        flags.normalize();
        let once = flags.clone();
        flags.normalize();

        assert!(once.skip_tiller);
        assert!(once.no_tiller);
        assert!(!once.global_tiller);
        assert_eq!(once, flags);
    }

    #[test]
    fn test_remote_tiller_off_means_client_only() {
        let mut flags = InitFlags {
            no_tiller: false,
            remote_tiller: false,
            ..InitFlags::default()
        };
        flags.normalize();
        assert!(flags.helm_client);
        assert!(flags.skip_tiller);
        assert!(!flags.global_tiller);
    }

    #[test]
    fn test_global_tiller_requires_tiller_namespace() {
        let flags = InitFlags {
            no_tiller: false,
            remote_tiller: true,
            skip_tiller: false,
            global_tiller: true,
            tiller_namespace: String::new(),
            ..InitFlags::default()
        };
        let err = flags.finalize(Provider::Gke, None).unwrap_err();
        assert!(matches!(err, Error::MissingOption { ref option } if option == "tiller-namespace"));
    }

    #[test]
    fn test_skip_tiller_does_not_need_tiller_namespace() {
        let flags = InitFlags {
            skip_tiller: true,
            tiller_namespace: String::new(),
            ..InitFlags::default()
        };
        let config = flags.finalize(Provider::Gke, None).unwrap();
        assert!(!config.global_tiller());
    }

    #[test]
    fn test_empty_namespace_uses_current_context() {
        let flags = InitFlags {
            namespace: String::new(),
            ..InitFlags::default()
        };
        assert!(flags.needs_current_namespace());
        let config = flags
            .clone()
            .finalize(Provider::Kubernetes, Some("team-a".into()))
            .unwrap();
        assert_eq!(config.namespace(), "team-a");

        let err = flags.finalize(Provider::Kubernetes, None).unwrap_err();
        assert!(matches!(err, Error::MissingOption { ref option } if option == "namespace"));
    }

    #[test]
    fn test_alibaba_renames_only_defaults() {
        let profile = Provider::Alibaba.profile();

        let mut flags = InitFlags::default();
        flags.apply_profile(&profile);
        assert_eq!(flags.ingress_deployment, "nginx-ingress-controller");
        assert_eq!(flags.ingress_service, "nginx-ingress-lb");

        let mut flags = InitFlags {
            ingress_deployment: "my-ingress".into(),
            ..InitFlags::default()
        };
        flags.apply_profile(&profile);
        assert_eq!(flags.ingress_deployment, "my-ingress");
        assert_eq!(flags.ingress_service, "nginx-ingress-lb");
    }

    #[test]
    fn test_icp_profile_applied() {
        let mut flags = InitFlags::default();
        flags.apply_profile(&Provider::Icp.profile());
        assert_eq!(flags.ingress_deployment, "default-backend");
        assert_eq!(flags.tiller_namespace, "default");
        assert_eq!(flags.namespace, "jx");
    }

    #[test]
    fn test_yaml_fields_are_kebab_case() {
        let flags: InitFlags =
            serde_yaml_ng::from_str("provider: eks\nskip-ingress: true\nexternal-ip: 10.0.0.1\n")
                .unwrap();
        assert_eq!(flags.provider.as_deref(), Some("eks"));
        assert!(flags.skip_ingress);
        assert_eq!(flags.external_ip.as_deref(), Some("10.0.0.1"));
        assert_eq!(flags.namespace, "jx");
    }
}
