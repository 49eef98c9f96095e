//! Cluster collaborators for kubeprep
//!
//! The bootstrap workflow talks to the outside world only through the traits
//! in [`traits`]. This crate defines them and provides implementations that
//! shell out to the usual command-line tools:
//!
//! ```text
//! KubeClient     -> KubectlClient   (kubectl)
//! Helm           -> HelmCli         (helm / helm3)
//! GitConfig      -> GitCli          (git config --global)
//! BuildPacks     -> DraftPacks      (git clone of the draft packs)
//! VersionStream  -> VersionStreamRepo (git clone of the versions repository)
//! DomainResolver -> NipIoResolver   (<ip>.nip.io)
//! CloudApi       -> IbmCloudCli     (ibmcloud ks)
//! ```
//!
//! It also owns the kubeconfig model used by the context switcher and the
//! bounded polling waits shared by the ingress phases.

pub mod buildpacks;
pub mod domain;
pub mod git;
pub mod helm;
pub mod ibmcloud;
pub mod kubeconfig;
pub mod kubectl;
pub mod paths;
mod process;
pub mod traits;
pub mod versions;
pub mod wait;

pub use buildpacks::DraftPacks;
pub use domain::NipIoResolver;
pub use git::GitCli;
pub use helm::{HelmCli, InstallChartOptions};
pub use ibmcloud::IbmCloudCli;
pub use kubeconfig::{KubeConfig, KubeContext};
pub use kubectl::KubectlClient;
pub use traits::{
    BuildPacks, CloudApi, DomainResolver, GitConfig, Helm, KubeClient, Subject, VersionStream,
};
pub use versions::VersionStreamRepo;
