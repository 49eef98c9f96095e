//! # kubeprep-core
//!
//! Core library for the kubeprep CLI providing:
//! - Init flags, their normalisation and the frozen `ClusterConfig`
//! - Provider policy: the closed set of supported providers and their profiles
//! - Fixed-interval retry execution engine
//! - The prompt capability shared by interactive and batch runs
//! - Error types

pub mod config;
pub mod error;
pub mod naming;
pub mod prompt;
pub mod provider;
pub mod retry;
pub mod types;

pub use config::{ClusterConfig, HelmInitConfig, InitFlags};
pub use error::{Error, Result};
pub use prompt::{Answer, BatchPrompter, Prompter, ScriptedPrompter};
pub use provider::{IngressMode, Provider, ProviderProfile};
pub use types::RetryPolicy;
