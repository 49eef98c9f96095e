//! Init command

use crate::cli::InitArgs;
use crate::output;
use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use kubeprep_bootstrap::{Bootstrap, BootstrapReport, Collaborators};
use kubeprep_cluster::{
    DraftPacks, GitCli, HelmCli, IbmCloudCli, KubeConfig, KubectlClient, NipIoResolver,
    VersionStreamRepo,
};
use kubeprep_core::InitFlags;
use owo_colors::OwoColorize;
use std::sync::Arc;
use tracing::debug;

pub async fn run(
    args: InitArgs,
    config: Option<&Utf8Path>,
    kubeconfig: Option<Utf8PathBuf>,
    batch: bool,
) -> Result<()> {
    let mut flags = InitFlags::load_or_default(config).context("Failed to load init defaults")?;
    args.apply_to(&mut flags);
    flags.batch_mode |= batch;
    debug!("Init options: {:?}", flags);

    let kubeconfig_path = super::kubeconfig_path(kubeconfig)?;
    let kubeconfig = KubeConfig::load(&kubeconfig_path)
        .with_context(|| format!("Failed to read {kubeconfig_path}"))?;

    let collaborators = Collaborators {
        kube: Arc::new(KubectlClient::with_kubeconfig(kubeconfig_path)),
        helm: Arc::new(HelmCli::new(flags.helm_binary(), flags.helm3)),
        build_packs: Arc::new(DraftPacks::default_location()?),
        versions: Arc::new(VersionStreamRepo::default_location(
            flags.versions_repository.clone(),
            flags.versions_git_ref.clone(),
        )?),
        domains: Arc::new(NipIoResolver::new()),
        git: Arc::new(GitCli::new()),
        cloud: Arc::new(IbmCloudCli::new()),
        prompter: super::prompter(flags.batch_mode),
    };

    // Prompts and a spinner cannot share the terminal
    let spinner = flags
        .batch_mode
        .then(|| output::spinner("Preparing the cluster..."));

    let result = Bootstrap::new(collaborators, kubeconfig).run(flags).await;

    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }

    let report = result.context("Cluster initialisation failed")?;
    print_report(&report);
    Ok(())
}

fn print_report(report: &BootstrapReport) {
    output::success("Cluster initialised");
    output::header("Summary");
    output::kv("Provider", &report.provider.to_string());
    output::kv("Namespace", &report.namespace);
    match &report.domain {
        Some(domain) => output::kv("Domain", &domain.green().to_string()),
        None => output::kv("Domain", &"none".yellow().to_string()),
    }

    if let Some(ingress) = &report.ingress {
        output::kv("Ingress", &format!("{:?}", ingress.phase));
        if let Some(ip) = &ingress.external_ip {
            output::kv("External IP", ip);
        }
    }

    if report.domain.is_none() {
        output::info("No domain configured; pass --domain once wildcard DNS is set up");
    }
}
