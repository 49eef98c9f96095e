//! Cluster bootstrap workflows for kubeprep
//!
//! - [`Bootstrap`]: the ordered, provider-aware `init` sequence
//! - [`IngressProvisioner`]: detect, install and wait for an ingress controller
//!   and resolve a domain for it
//! - [`ContextSwitcher`]: select and persist the current kubeconfig context
//!
//! All cluster access goes through the traits in `kubeprep_cluster`, and all
//! operator interaction through `kubeprep_core::Prompter`, so every workflow
//! runs the same way interactively, in batch mode and under test.

pub mod admin;
pub mod context;
pub mod git;
pub mod ingress;
pub mod orchestrator;

pub use context::{ContextReport, ContextSwitcher};
pub use ingress::{IngressPhase, IngressProvisioner, IngressState};
pub use orchestrator::{Bootstrap, BootstrapReport, Collaborators};
