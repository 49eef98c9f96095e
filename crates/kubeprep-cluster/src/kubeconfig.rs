//! Kubeconfig model
//!
//! Only contexts, cluster servers and the current-context pointer are typed.
//! Everything else in the file (credentials, certificate data, preferences)
//! is carried through untouched so a rewrite never loses it.

use camino::{Utf8Path, Utf8PathBuf};
use kubeprep_core::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_yaml_ng::Value;
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::io::Write;
use tracing::debug;

/// Namespace kubectl uses when a context names none
pub const DEFAULT_CONTEXT_NAMESPACE: &str = "default";

/// A named cluster/user/namespace reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KubeContext {
    pub name: String,
    pub cluster: String,
    pub user: String,
    pub namespace: Option<String>,
}

/// Parsed kubeconfig file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct KubeConfig {
    #[serde(default)]
    clusters: Vec<NamedCluster>,

    #[serde(default)]
    contexts: Vec<NamedContext>,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    current_context: String,

    #[serde(flatten)]
    extra: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct NamedCluster {
    name: String,
    #[serde(default)]
    cluster: ClusterEntry,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct ClusterEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    server: Option<String>,
    #[serde(flatten)]
    extra: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct NamedContext {
    name: String,
    #[serde(default)]
    context: ContextEntry,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct ContextEntry {
    #[serde(default)]
    cluster: String,
    #[serde(default)]
    user: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    namespace: Option<String>,
    #[serde(flatten)]
    extra: BTreeMap<String, Value>,
}

impl KubeConfig {
    /// Location of the kubeconfig
    ///
    /// The first entry of `KUBECONFIG` when set, otherwise `~/.kube/config`.
    pub fn default_path() -> Result<Utf8PathBuf> {
        if let Some(first) = std::env::var_os("KUBECONFIG")
            .and_then(|v| std::env::split_paths(&v).find(|p| !p.as_os_str().is_empty()))
        {
            return Utf8PathBuf::try_from(first)
                .map_err(|_| Error::invalid_config("KUBECONFIG path is not valid UTF-8"));
        }

        Ok(crate::paths::home_dir()?.join(".kube").join("config"))
    }

    /// Load a kubeconfig; a missing file is an empty configuration
    pub fn load(path: &Utf8Path) -> Result<Self> {
        let content = match fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No kubeconfig at {}", path);
                return Ok(Self::default());
            }
            Err(e) => return Err(Error::Io(e)),
        };
        Self::parse(&content)
    }

    /// Parse kubeconfig YAML, rejecting duplicate context names
    pub fn parse(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: KubeConfig = serde_yaml_ng::from_str(content)?;

        let mut seen = HashSet::new();
        for ctx in &config.contexts {
            if !seen.insert(ctx.name.as_str()) {
                return Err(Error::invalid_config(format!(
                    "duplicate context name '{}' in kubeconfig",
                    ctx.name
                )));
            }
        }
        Ok(config)
    }

    /// Write the configuration to a temporary sibling file and rename it
    /// over `path`
    ///
    /// The replacement keeps the permissions of the file it replaces; a new
    /// file is private to the owner.
    pub fn save_atomic(&self, path: &Utf8Path) -> Result<()> {
        let yaml = serde_yaml_ng::to_string(self)?;

        let parent = path
            .parent()
            .filter(|p| !p.as_str().is_empty())
            .unwrap_or_else(|| Utf8Path::new("."));
        fs::create_dir_all(parent)?;

        let file_name = path.file_name().unwrap_or("config");
        let mut temp_file = tempfile::Builder::new()
            .prefix(&format!(".{file_name}."))
            .suffix(".tmp")
            .tempfile_in(parent)?;
        temp_file.write_all(yaml.as_bytes())?;

        match fs::metadata(path) {
            Ok(existing) => temp_file.as_file().set_permissions(existing.permissions())?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(Error::Io(e)),
        }
        temp_file.as_file().sync_all()?;

        temp_file.persist(path).map_err(|e| Error::Io(e.error))?;
        debug!("Saved kubeconfig to {}", path);
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.contexts.is_empty()
    }

    /// Context names in file order
    pub fn context_names(&self) -> Vec<String> {
        self.contexts.iter().map(|c| c.name.clone()).collect()
    }

    pub fn context(&self, name: &str) -> Option<KubeContext> {
        self.contexts
            .iter()
            .find(|c| c.name == name)
            .map(|c| KubeContext {
                name: c.name.clone(),
                cluster: c.context.cluster.clone(),
                user: c.context.user.clone(),
                namespace: c.context.namespace.clone().filter(|ns| !ns.is_empty()),
            })
    }

    /// Name of the current context, `None` when unset
    pub fn current_context(&self) -> Option<&str> {
        Some(self.current_context.as_str()).filter(|c| !c.is_empty())
    }

    /// Namespace of a context, `default` when the context names none
    pub fn namespace_of(&self, context: &str) -> Option<String> {
        self.context(context).map(|c| {
            c.namespace
                .unwrap_or_else(|| DEFAULT_CONTEXT_NAMESPACE.to_string())
        })
    }

    pub fn current_namespace(&self) -> Option<String> {
        self.current_context().and_then(|c| self.namespace_of(c))
    }

    /// API server URL of the cluster a context points at
    pub fn server_for(&self, context: &str) -> Option<&str> {
        let cluster = &self.contexts.iter().find(|c| c.name == context)?.context.cluster;
        self.clusters
            .iter()
            .find(|c| &c.name == cluster)
            .and_then(|c| c.cluster.server.as_deref())
            .filter(|s| !s.is_empty())
    }

    pub fn current_server(&self) -> Option<&str> {
        self.current_context().and_then(|c| self.server_for(c))
    }

    /// User of the current context
    pub fn current_user(&self) -> Option<&str> {
        let current = self.current_context()?;
        self.contexts
            .iter()
            .find(|c| c.name == current)
            .map(|c| c.context.user.as_str())
            .filter(|u| !u.is_empty())
    }

    /// Point the current context at `name`, which must exist
    pub fn set_current_context(&mut self, name: &str) -> Result<()> {
        if !self.contexts.iter().any(|c| c.name == name) {
            return Err(Error::ContextNotFound {
                name: name.to_string(),
            });
        }
        self.current_context = name.to_string();
        Ok(())
    }
}
