//! Context switcher
//!
//! Lists the kubeconfig contexts, narrows them by a substring filter, picks
//! one (positionally, by prompt, or automatically when only one remains) and
//! persists it as the current context. The file is rewritten only when the
//! current context actually changes.

use camino::Utf8PathBuf;
use kubeprep_cluster::KubeConfig;
use kubeprep_core::{Error, Prompter, Result};
use std::fmt;
use tracing::debug;

/// Where the current context ended up
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextReport {
    /// Whether the kubeconfig was rewritten
    pub changed: bool,
    pub context: String,
    pub namespace: String,
    pub server: String,
}

impl fmt::Display for ContextReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = if self.changed { "Now using" } else { "Using" };
        write!(
            f,
            "{} namespace '{}' from context named '{}' on server '{}'.",
            prefix, self.namespace, self.context, self.server
        )
    }
}

/// Selects and persists the current kubeconfig context
pub struct ContextSwitcher<'a> {
    kubeconfig_path: Utf8PathBuf,
    prompter: &'a dyn Prompter,
}

impl<'a> ContextSwitcher<'a> {
    pub fn new(kubeconfig_path: impl Into<Utf8PathBuf>, prompter: &'a dyn Prompter) -> Self {
        Self {
            kubeconfig_path: kubeconfig_path.into(),
            prompter,
        }
    }

    /// Switch to `name`, or to a context picked from those matching `filter`
    pub fn run(
        &self,
        name: Option<&str>,
        filter: Option<&str>,
        batch: bool,
    ) -> Result<ContextReport> {
        let mut config = KubeConfig::load(&self.kubeconfig_path)?;
        if config.is_empty() {
            return Err(Error::NoContexts);
        }

        let candidates = candidate_names(&config, filter.unwrap_or(""));
        let current = config.current_context().map(str::to_string);

        let selected = match name {
            Some(name) if candidates.iter().any(|c| c == name) => Some(name.to_string()),
            Some(name) => return Err(Error::invalid_argument(name, candidates)),
            None if batch => None,
            None => self.pick_context(&candidates, current.as_deref())?,
        };

        match selected {
            Some(target) if current.as_deref() != Some(target.as_str()) => {
                config.set_current_context(&target)?;
                config.save_atomic(&self.kubeconfig_path)?;
                debug!("Switched current context to {}", target);
                Ok(report(&config, &target, true))
            }
            _ => Ok(report(&config, current.as_deref().unwrap_or_default(), false)),
        }
    }

    fn pick_context(&self, candidates: &[String], current: Option<&str>) -> Result<Option<String>> {
        match candidates {
            [] => Ok(None),
            [only] => Ok(Some(only.clone())),
            _ => self
                .prompter
                .select("Change Kubernetes context:", candidates, current),
        }
    }
}

/// Context names containing `filter`, sorted
pub fn candidate_names(config: &KubeConfig, filter: &str) -> Vec<String> {
    let mut names: Vec<String> = config
        .context_names()
        .into_iter()
        .filter(|name| name.contains(filter))
        .collect();
    names.sort();
    names
}

fn report(config: &KubeConfig, context: &str, changed: bool) -> ContextReport {
    ContextReport {
        changed,
        context: context.to_string(),
        namespace: config.namespace_of(context).unwrap_or_default(),
        server: config.server_for(context).unwrap_or_default().to_string(),
    }
}
