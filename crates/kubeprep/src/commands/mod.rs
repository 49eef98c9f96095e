//! Command implementations

pub mod context;
pub mod init;

use crate::prompt::TerminalPrompter;
use anyhow::{Context, Result};
use camino::Utf8PathBuf;
use kubeprep_cluster::KubeConfig;
use kubeprep_core::{BatchPrompter, Prompter};
use std::sync::Arc;

/// The kubeconfig given on the command line, else the default location
fn kubeconfig_path(flag: Option<Utf8PathBuf>) -> Result<Utf8PathBuf> {
    match flag {
        Some(path) => Ok(path),
        None => KubeConfig::default_path().context("Failed to locate the kubeconfig"),
    }
}

fn prompter(batch: bool) -> Arc<dyn Prompter> {
    if batch {
        Arc::new(BatchPrompter)
    } else {
        Arc::new(TerminalPrompter)
    }
}
