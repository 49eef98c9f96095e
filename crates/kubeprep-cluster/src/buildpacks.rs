//! Default draft build packs

use crate::git::clone_or_pull;
use crate::paths;
use crate::traits::BuildPacks;
use async_trait::async_trait;
use camino::Utf8PathBuf;
use kubeprep_core::Result;
use tracing::info;

/// Repository holding the default build packs
pub const DEFAULT_PACKS_URL: &str = "https://github.com/jenkins-x/draft-packs.git";

/// Build packs cloned from a git repository into a local directory
#[derive(Debug, Clone)]
pub struct DraftPacks {
    url: String,
    dir: Utf8PathBuf,
}

impl DraftPacks {
    pub fn new(url: impl Into<String>, dir: impl Into<Utf8PathBuf>) -> Self {
        Self {
            url: url.into(),
            dir: dir.into(),
        }
    }

    /// The default packs in `~/.kubeprep/draft/packs`
    pub fn default_location() -> Result<Self> {
        let dir = paths::kubeprep_dir()?.join("draft").join("packs");
        Ok(Self::new(DEFAULT_PACKS_URL, dir))
    }

    pub fn dir(&self) -> &Utf8PathBuf {
        &self.dir
    }
}

#[async_trait]
impl BuildPacks for DraftPacks {
    async fn install_default(&self, recreate: bool) -> Result<Utf8PathBuf> {
        if recreate && self.dir.exists() {
            info!("Recreating build packs in {}", self.dir);
            std::fs::remove_dir_all(&self.dir)?;
        }

        clone_or_pull(&self.url, None, &self.dir).await?;
        info!("Build packs available in {}", self.dir);
        Ok(self.dir.clone())
    }
}
