//! helm-backed chart installer

use crate::process;
use crate::traits::Helm;
use async_trait::async_trait;
use camino::Utf8PathBuf;
use kubeprep_core::{HelmInitConfig, Result};
use tracing::{debug, info};

/// Repository added for helm3, which ships without one
pub const STABLE_REPO_URL: &str = "https://charts.helm.sh/stable";

/// Service account tiller runs as
pub const TILLER_SERVICE_ACCOUNT: &str = "tiller";

/// Parameters of a chart installation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstallChartOptions {
    pub chart: String,
    pub release_name: String,
    pub version: Option<String>,
    pub namespace: String,
    /// `key=value` overrides passed with `--set`
    pub set_values: Vec<String>,
    pub value_files: Vec<Utf8PathBuf>,
    /// Upgrade the release in place if it already exists
    pub helm_update: bool,
}

/// Helm client that shells out to the helm binary
#[derive(Debug, Clone)]
pub struct HelmCli {
    binary: String,
    helm3: bool,
}

impl HelmCli {
    pub fn new(binary: impl Into<String>, helm3: bool) -> Self {
        Self {
            binary: binary.into(),
            helm3,
        }
    }

    /// Arguments for `helm install` or `helm upgrade --install`
    pub fn install_args(&self, options: &InstallChartOptions) -> Vec<String> {
        let mut args: Vec<String> = if options.helm_update {
            vec![
                "upgrade".into(),
                "--install".into(),
                options.release_name.clone(),
                options.chart.clone(),
            ]
        } else if self.helm3 {
            vec![
                "install".into(),
                options.release_name.clone(),
                options.chart.clone(),
            ]
        } else {
            vec![
                "install".into(),
                "--name".into(),
                options.release_name.clone(),
                options.chart.clone(),
            ]
        };

        args.extend(["--namespace".into(), options.namespace.clone()]);

        if let Some(version) = options.version.as_deref().filter(|v| !v.is_empty()) {
            args.extend(["--version".into(), version.to_string()]);
        }
        for value in &options.set_values {
            args.extend(["--set".into(), value.clone()]);
        }
        for file in &options.value_files {
            args.extend(["--values".into(), file.to_string()]);
        }
        args
    }

    /// Command lines run to initialise helm, in order
    pub fn init_commands(&self, config: &HelmInitConfig) -> Vec<Vec<String>> {
        if config.helm3 {
            return vec![
                vec![
                    "repo".into(),
                    "add".into(),
                    "stable".into(),
                    STABLE_REPO_URL.into(),
                ],
                vec!["repo".into(), "update".into()],
            ];
        }

        if config.only_helm_client || config.skip_tiller {
            return vec![vec!["init".into(), "--client-only".into()]];
        }

        let tiller_namespace = if config.global_tiller {
            &config.tiller_namespace
        } else {
            &config.namespace
        };
        vec![vec![
            "init".into(),
            "--service-account".into(),
            TILLER_SERVICE_ACCOUNT.into(),
            "--tiller-namespace".into(),
            tiller_namespace.clone(),
            "--upgrade".into(),
            "--wait".into(),
        ]]
    }

    async fn helm(&self, args: &[String]) -> Result<String> {
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        process::run(&self.binary, &args).await
    }
}

#[async_trait]
impl Helm for HelmCli {
    async fn init(&self, config: &HelmInitConfig) -> Result<()> {
        for command in self.init_commands(config) {
            self.helm(&command).await?;
        }
        debug!("helm initialised");
        Ok(())
    }

    async fn install_chart(&self, options: &InstallChartOptions) -> Result<()> {
        info!(
            "Installing chart {} as release {} in namespace {}",
            options.chart, options.release_name, options.namespace
        );
        self.helm(&self.install_args(options)).await?;
        Ok(())
    }
}
