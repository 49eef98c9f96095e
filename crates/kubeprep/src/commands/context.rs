//! Context command

use crate::cli::ContextArgs;
use anyhow::{Context, Result};
use camino::Utf8PathBuf;
use kubeprep_bootstrap::ContextSwitcher;

pub fn run(args: ContextArgs, kubeconfig: Option<Utf8PathBuf>, batch: bool) -> Result<()> {
    let path = super::kubeconfig_path(kubeconfig)?;
    let prompter = super::prompter(batch);

    let report = ContextSwitcher::new(path.clone(), prompter.as_ref())
        .run(args.name.as_deref(), args.filter.as_deref(), batch)
        .with_context(|| format!("Failed to switch context in {path}"))?;

    println!("{report}");
    Ok(())
}
