//! Init configuration
//!
//! `InitFlags` is the mutable draft assembled from defaults, an optional YAML
//! file and command-line flags. The configuration phases of the bootstrap
//! normalise it and apply provider overrides; `InitFlags::finalize` then
//! produces the immutable `ClusterConfig` read by every later phase.

mod cluster_config;
mod flags;
mod loader;

pub use cluster_config::{ClusterConfig, HelmInitConfig};
pub use flags::InitFlags;

/// Namespace the platform is installed into
pub const DEFAULT_NAMESPACE: &str = "jx";

/// Namespace holding the ingress controller
pub const DEFAULT_INGRESS_NAMESPACE: &str = "kube-system";

/// Name of both the ingress controller deployment and its service
pub const DEFAULT_INGRESS_SERVICE_NAME: &str = "jxing-nginx-ingress-controller";

/// Namespace for a cluster-global tiller
pub const DEFAULT_TILLER_NAMESPACE: &str = "kube-system";

/// Cluster role granted to the invoking user and to tiller
pub const DEFAULT_CLUSTER_ROLE: &str = "cluster-admin";

/// Version stream repository used to pin chart versions
pub const DEFAULT_VERSIONS_REPOSITORY: &str = "https://github.com/jenkins-x/jenkins-x-versions.git";

/// Git ref of the version stream
pub const DEFAULT_VERSIONS_REF: &str = "master";

/// Option names used in missing-option errors
pub mod options {
    pub const USERNAME: &str = "username";
    pub const NAMESPACE: &str = "namespace";
    pub const TILLER_NAMESPACE: &str = "tiller-namespace";
    pub const PROVIDER: &str = "provider";
    pub const INGRESS_NAMESPACE: &str = "ingress-namespace";
    pub const INGRESS_SERVICE: &str = "ingress-service";
    pub const INGRESS_DEPLOYMENT: &str = "ingress-deployment";
    pub const DOMAIN: &str = "domain";
}
