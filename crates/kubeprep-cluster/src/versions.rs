//! Version stream lookups
//!
//! The version stream is a git repository pinning chart versions in files
//! named `charts/<repo>/<chart>.yml`, each with a top-level `version` key.

use crate::git::clone_or_pull;
use crate::paths;
use crate::traits::VersionStream;
use async_trait::async_trait;
use camino::{Utf8Path, Utf8PathBuf};
use kubeprep_core::Result;
use serde::Deserialize;
use tokio::sync::OnceCell;
use tracing::debug;

#[derive(Debug, Deserialize)]
struct StableVersion {
    #[serde(default)]
    version: Option<String>,
}

/// Version stream checked out from git on first use
#[derive(Debug)]
pub struct VersionStreamRepo {
    url: String,
    git_ref: String,
    dir: Utf8PathBuf,
    synced: OnceCell<()>,
}

impl VersionStreamRepo {
    pub fn new(
        url: impl Into<String>,
        git_ref: impl Into<String>,
        dir: impl Into<Utf8PathBuf>,
    ) -> Self {
        Self {
            url: url.into(),
            git_ref: git_ref.into(),
            dir: dir.into(),
            synced: OnceCell::new(),
        }
    }

    /// Checkout in `~/.kubeprep/versions`
    pub fn default_location(url: impl Into<String>, git_ref: impl Into<String>) -> Result<Self> {
        let dir = paths::kubeprep_dir()?.join("versions");
        Ok(Self::new(url, git_ref, dir))
    }

    async fn sync(&self) -> Result<()> {
        self.synced
            .get_or_try_init(|| async {
                let git_ref = Some(self.git_ref.as_str()).filter(|r| !r.is_empty());
                clone_or_pull(&self.url, git_ref, &self.dir).await
            })
            .await?;
        Ok(())
    }
}

/// Version pinned for `chart` in a checked-out version stream
pub fn read_chart_version(dir: &Utf8Path, chart: &str) -> Result<Option<String>> {
    let path = dir.join("charts").join(format!("{chart}.yml"));
    if !path.exists() {
        debug!("No pinned version for {} at {}", chart, path);
        return Ok(None);
    }

    let content = std::fs::read_to_string(&path)?;
    let pinned: StableVersion = serde_yaml_ng::from_str(&content)?;
    Ok(pinned.version.filter(|v| !v.trim().is_empty()))
}

#[async_trait]
impl VersionStream for VersionStreamRepo {
    async fn chart_version(&self, chart: &str) -> Result<Option<String>> {
        self.sync().await?;
        read_chart_version(&self.dir, chart)
    }
}
