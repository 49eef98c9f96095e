//! Provider policy
//!
//! Maps a provider identifier to the ingress defaults and special behaviours
//! the bootstrap must apply for it. The set of providers is closed; anything
//! unrecognised gets the generic `kubernetes` profile.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Chart used when an ingress controller has to be installed
pub const INGRESS_CHART: &str = "stable/nginx-ingress";

/// Helm values applied on AWS and EKS so the controller gets a network load balancer
pub const AWS_NLB_VALUES: &str = r#"---
rbac:
 create: true

controller:
 service:
   annotations:
     service.beta.kubernetes.io/aws-load-balancer-type: nlb
   enableHttp: true
   enableHttps: true
"#;

/// Cluster preparation the operator has to do by hand on IBM Cloud Private
pub const ICP_SETUP_NOTES: &[&str] = &[
    "Ensure an image repository policy allows docker.io/*, gcr.io/*, quay.io/*, k8s.gcr.io/* and <cluster-name>:8500/*",
    "kubeprep defaults the tiller namespace to 'default' and the platform namespace to 'jx' on IBM Cloud Private",
    "Builds pushing to the private registry at <cluster-name>:8500 need an image pull secret in the platform namespace",
];

/// Supported Kubernetes providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Provider {
    Aks,
    Aws,
    Docker,
    Eks,
    Gke,
    Alibaba,
    /// IBM Kubernetes Service: ingress is injected by the platform
    Iks,
    /// IBM Cloud Private: managed private cloud
    Icp,
    Oke,
    /// Generic Kubernetes cluster
    Kubernetes,
    Minikube,
    Minishift,
    /// OpenShift routes traffic itself
    Openshift,
    Pks,
    JxInfra,
}

impl Provider {
    /// Every supported provider, in presentation order
    pub const ALL: [Provider; 15] = [
        Provider::Aks,
        Provider::Aws,
        Provider::Docker,
        Provider::Eks,
        Provider::Gke,
        Provider::Alibaba,
        Provider::Iks,
        Provider::Icp,
        Provider::Oke,
        Provider::Kubernetes,
        Provider::Minikube,
        Provider::Minishift,
        Provider::Openshift,
        Provider::Pks,
        Provider::JxInfra,
    ];

    /// The identifier used on the command line
    pub fn id(&self) -> &'static str {
        match self {
            Provider::Aks => "aks",
            Provider::Aws => "aws",
            Provider::Docker => "docker",
            Provider::Eks => "eks",
            Provider::Gke => "gke",
            Provider::Alibaba => "alibaba",
            Provider::Iks => "iks",
            Provider::Icp => "icp",
            Provider::Oke => "oke",
            Provider::Kubernetes => "kubernetes",
            Provider::Minikube => "minikube",
            Provider::Minishift => "minishift",
            Provider::Openshift => "openshift",
            Provider::Pks => "pks",
            Provider::JxInfra => "jx-infra",
        }
    }

    /// All identifiers, for prompts and error messages
    pub fn ids() -> Vec<String> {
        Self::ALL.iter().map(|p| p.id().to_string()).collect()
    }

    /// Parse an identifier, case-insensitively
    pub fn parse(id: &str) -> Option<Provider> {
        let id = id.trim().to_lowercase();
        Self::ALL.into_iter().find(|p| p.id() == id)
    }

    /// Parse an identifier, falling back to the generic provider
    pub fn from_id_or_default(id: &str) -> Provider {
        Self::parse(id).unwrap_or(Provider::Kubernetes)
    }

    /// The resolved profile for this provider
    pub fn profile(&self) -> ProviderProfile {
        let base = ProviderProfile::generic(*self);
        match self {
            Provider::Icp => ProviderProfile {
                ingress_namespace: Some("kube-system"),
                ingress_service: Some("default-backend"),
                ingress_deployment: Some("default-backend"),
                namespace: Some("jx"),
                tiller_namespace: Some("default"),
                collect_ip_and_domain: true,
                setup_notes: ICP_SETUP_NOTES,
                ..base
            },
            Provider::Iks => ProviderProfile {
                ingress_mode: IngressMode::AwaitInjected,
                ..base
            },
            Provider::Openshift => ProviderProfile {
                ingress_mode: IngressMode::Skip,
                ..base
            },
            Provider::Alibaba => ProviderProfile {
                default_renames: Some(DefaultRenames {
                    deployment: "nginx-ingress-controller",
                    service: "nginx-ingress-lb",
                }),
                ..base
            },
            Provider::Aws | Provider::Eks => ProviderProfile {
                chart_values: Some(AWS_NLB_VALUES),
                ..base
            },
            Provider::Gke => ProviderProfile {
                load_balancer_note: Some(
                    "this loadbalancer will fail to be provisioned if you have insufficient quotas, \
                     this can happen easily on a GKE free account.\n\
                     To view quotas run: gcloud compute project-info describe",
                ),
                ..base
            },
            Provider::Oke => ProviderProfile {
                load_balancer_note: Some(
                    "this loadbalancer will fail to be provisioned if you have insufficient quotas, \
                     this can happen easily on a OCI free account",
                ),
                ..base
            },
            _ => base,
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Provider {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s).ok_or_else(|| Error::invalid_argument(s, Self::ids()))
    }
}

/// Resolve any identifier to its profile; unknown identifiers get the generic one
pub fn resolve(provider_id: &str) -> ProviderProfile {
    Provider::from_id_or_default(provider_id).profile()
}

/// How the bootstrap deals with the ingress controller for a provider
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngressMode {
    /// Detect an existing controller and install the chart when absent
    Install,
    /// The platform routes traffic itself; nothing to install or wait for
    Skip,
    /// The platform injects its own controller; wait for it instead of installing
    AwaitInjected,
}

/// Deployment and service names that replace the generic defaults, but never
/// an explicit override
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DefaultRenames {
    pub deployment: &'static str,
    pub service: &'static str,
}

/// Read-only naming and behaviour defaults for a provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderProfile {
    pub provider: Provider,
    pub ingress_mode: IngressMode,
    pub ingress_namespace: Option<&'static str>,
    pub ingress_service: Option<&'static str>,
    pub ingress_deployment: Option<&'static str>,
    /// Platform namespace override
    pub namespace: Option<&'static str>,
    pub tiller_namespace: Option<&'static str>,
    /// External IP and domain are asked for up front (interactive runs only)
    pub collect_ip_and_domain: bool,
    pub default_renames: Option<DefaultRenames>,
    pub chart: &'static str,
    /// Extra helm values file content for the ingress chart
    pub chart_values: Option<&'static str>,
    /// Logged before waiting for the load balancer
    pub load_balancer_note: Option<&'static str>,
    /// Manual preparation steps logged before the bootstrap starts
    pub setup_notes: &'static [&'static str],
}

impl ProviderProfile {
    fn generic(provider: Provider) -> Self {
        Self {
            provider,
            ingress_mode: IngressMode::Install,
            ingress_namespace: None,
            ingress_service: None,
            ingress_deployment: None,
            namespace: None,
            tiller_namespace: None,
            collect_ip_and_domain: false,
            default_renames: None,
            chart: INGRESS_CHART,
            chart_values: None,
            load_balancer_note: None,
            setup_notes: &[],
        }
    }

    /// Whether the bootstrap skips ingress entirely for this provider
    pub fn skips_ingress(&self) -> bool {
        self.ingress_mode == IngressMode::Skip
    }

    /// Whether the bootstrap waits for a platform-injected controller
    pub fn awaits_injected_ingress(&self) -> bool {
        self.ingress_mode == IngressMode::AwaitInjected
    }
}

/// Name of the platform-injected ingress deployment and service for a cluster
pub fn injected_ingress_name(cluster_id: &str) -> String {
    format!("public-cr{}-alb1", cluster_id.trim().to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_provider_gets_generic_profile() {
        for id in ["", "digitalocean", "???", "KIND"] {
            let profile = resolve(id);
            assert_eq!(profile.provider, Provider::Kubernetes);
            assert_eq!(profile, Provider::Kubernetes.profile());
        }
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!(Provider::parse(" EKS "), Some(Provider::Eks));
        assert_eq!("jx-infra".parse::<Provider>().unwrap(), Provider::JxInfra);
        assert!("nope".parse::<Provider>().is_err());
    }

    #[test]
    fn test_ids_round_trip() {
        for p in Provider::ALL {
            assert_eq!(Provider::parse(p.id()), Some(p));
        }
    }

    #[test]
    fn test_icp_overrides() {
        let profile = Provider::Icp.profile();
        assert_eq!(profile.ingress_namespace, Some("kube-system"));
        assert_eq!(profile.ingress_service, Some("default-backend"));
        assert_eq!(profile.ingress_deployment, Some("default-backend"));
        assert_eq!(profile.tiller_namespace, Some("default"));
        assert_eq!(profile.namespace, Some("jx"));
        assert!(profile.collect_ip_and_domain);
    }

    #[test]
    fn test_only_icp_carries_setup_notes() {
        let notes = Provider::Icp.profile().setup_notes;
        assert!(notes.iter().any(|n| n.contains("image repository policy")));
        assert!(notes.iter().any(|n| n.contains(":8500")));

        for p in Provider::ALL.into_iter().filter(|p| *p != Provider::Icp) {
            assert!(p.profile().setup_notes.is_empty(), "{p:?} has notes");
        }
    }

    #[test]
    fn test_special_modes() {
        assert!(Provider::Openshift.profile().skips_ingress());
        assert!(Provider::Iks.profile().awaits_injected_ingress());
        assert_eq!(Provider::Gke.profile().ingress_mode, IngressMode::Install);
    }

    #[test]
    fn test_aws_family_gets_nlb_values() {
        assert!(Provider::Aws.profile().chart_values.is_some());
        assert!(Provider::Eks.profile().chart_values.unwrap().contains("nlb"));
        assert!(Provider::Aks.profile().chart_values.is_none());
    }

    #[test]
    fn test_injected_ingress_name() {
        assert_eq!(injected_ingress_name("ABC123"), "public-crabc123-alb1");
    }
}
