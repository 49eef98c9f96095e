//! Global git configuration and repository checkouts

use crate::process;
use crate::traits::GitConfig;
use async_trait::async_trait;
use camino::Utf8Path;
use kubeprep_core::Result;
use tracing::{debug, info};

/// Git identity stored with `git config --global`
#[derive(Debug, Clone, Copy, Default)]
pub struct GitCli;

impl GitCli {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl GitConfig for GitCli {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        debug!("Getting git config: {}", key);
        let output = process::output("git", &["config", "--global", "--get", key]).await?;

        if !output.status.success() {
            // Config value not set
            return Ok(None);
        }

        let value = String::from_utf8_lossy(&output.stdout).trim().to_string();
        Ok(Some(value).filter(|v| !v.is_empty()))
    }

    async fn set_global(&self, key: &str, value: &str) -> Result<()> {
        debug!("Setting git config: {} = {}", key, value);
        process::run("git", &["config", "--global", key, value]).await?;
        Ok(())
    }
}

/// Shallow-clone `url` at `git_ref` into `destination`, or fast-forward an
/// existing checkout
pub(crate) async fn clone_or_pull(
    url: &str,
    git_ref: Option<&str>,
    destination: &Utf8Path,
) -> Result<()> {
    if destination.join(".git").exists() {
        debug!("Updating {}", destination);
        process::run("git", &["-C", destination.as_str(), "pull", "--ff-only"]).await?;
        return Ok(());
    }

    if let Some(parent) = destination.parent() {
        std::fs::create_dir_all(parent)?;
    }

    info!("Cloning {} into {}", url, destination);
    let mut args = vec!["clone", "--depth", "1"];
    if let Some(git_ref) = git_ref {
        args.extend(["--branch", git_ref]);
    }
    args.extend([url, destination.as_str()]);
    process::run("git", &args).await?;
    Ok(())
}
