//! CLI argument parsing with clap

use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};
use kubeprep_core::InitFlags;

/// kubeprep - Prepare Kubernetes clusters and switch contexts
#[derive(Parser, Debug)]
#[command(name = "kubeprep")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Never prompt; use defaults and fail on anything that must be asked
    #[arg(short, long = "batch-mode", global = true)]
    pub batch: bool,

    /// YAML file with default values for the init options
    #[arg(short, long, global = true)]
    pub config: Option<Utf8PathBuf>,

    /// Kubeconfig to read and update (defaults to $KUBECONFIG or ~/.kube/config)
    #[arg(long, global = true, env = "KUBEPREP_KUBECONFIG")]
    pub kubeconfig: Option<Utf8PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// View or change the current Kubernetes context
    #[command(visible_alias = "ctx")]
    Context(ContextArgs),

    /// Prepare the current cluster: RBAC, helm, build packs and ingress
    Init(InitArgs),
}

#[derive(Args, Debug)]
pub struct ContextArgs {
    /// Context to switch to
    pub name: Option<String>,

    /// Only offer contexts whose name contains this text
    #[arg(short, long)]
    pub filter: Option<String>,
}

#[derive(Args, Debug, Default)]
pub struct InitArgs {
    /// Cloud provider (aks, eks, gke, iks, icp, openshift, minikube, ...)
    #[arg(long)]
    pub provider: Option<String>,

    /// Namespace the platform is installed into
    #[arg(long)]
    pub namespace: Option<String>,

    /// Domain to expose ingress endpoints on
    #[arg(long)]
    pub domain: Option<String>,

    /// Kubernetes user bound to the cluster role
    #[arg(long)]
    pub username: Option<String>,

    /// Cluster role granted to the user
    #[arg(long)]
    pub user_cluster_role: Option<String>,

    /// Cluster role granted to tiller
    #[arg(long)]
    pub tiller_cluster_role: Option<String>,

    /// Namespace for a cluster-wide tiller
    #[arg(long)]
    pub tiller_namespace: Option<String>,

    #[arg(long)]
    pub ingress_namespace: Option<String>,

    #[arg(long)]
    pub ingress_service: Option<String>,

    #[arg(long)]
    pub ingress_deployment: Option<String>,

    /// Use this address instead of waiting for a load balancer
    #[arg(long)]
    pub external_ip: Option<String>,

    /// Git repository of the version stream
    #[arg(long = "versions-repo")]
    pub versions_repository: Option<String>,

    /// Branch or tag of the version stream
    #[arg(long = "versions-ref")]
    pub versions_git_ref: Option<String>,

    /// Only install the draft client
    #[arg(long = "draft-client-only")]
    pub draft_client: bool,

    /// Only initialise the helm client, no tiller
    #[arg(long = "helm-client-only")]
    pub helm_client: bool,

    /// Use helm 3
    #[arg(long)]
    pub helm3: bool,

    /// helm executable to run
    #[arg(long)]
    pub helm_bin: Option<String>,

    /// Delete and re-clone the draft build packs
    #[arg(long)]
    pub recreate_existing_draft_repos: bool,

    /// Do not use tiller
    #[arg(long, value_name = "BOOL", num_args = 1)]
    pub no_tiller: Option<bool>,

    /// Use a tiller running in the cluster
    #[arg(long, value_name = "BOOL", num_args = 1)]
    pub remote_tiller: Option<bool>,

    /// Install a single tiller for the whole cluster
    #[arg(long, value_name = "BOOL", num_args = 1)]
    pub global_tiller: Option<bool>,

    /// Do not set up tiller
    #[arg(long = "skip-setup-tiller")]
    pub skip_tiller: bool,

    /// Do not bind the user to a cluster role
    #[arg(long)]
    pub skip_cluster_role: bool,

    /// Do not install an ingress controller
    #[arg(long)]
    pub skip_ingress: bool,

    /// The cluster has no load balancer; use the API server address
    #[arg(long)]
    pub on_premise: bool,

    /// Do not check the git user name and email
    #[arg(long)]
    pub no_git_validate: bool,

    /// Ask for the domain external DNS should manage
    #[arg(long)]
    pub external_dns: bool,

    /// Ask before installing an ingress controller
    #[arg(long)]
    pub advanced_mode: bool,
}

impl InitArgs {
    /// Overlay the options given on the command line onto `flags`
    ///
    /// Switches only ever turn an option on; unset values leave the defaults
    /// and the config file in place.
    pub fn apply_to(self, flags: &mut InitFlags) {
        fn set(target: &mut String, value: Option<String>) {
            if let Some(value) = value {
                *target = value;
            }
        }

        flags.provider = self.provider.or(flags.provider.take());
        flags.domain = self.domain.or(flags.domain.take());
        flags.username = self.username.or(flags.username.take());
        flags.external_ip = self.external_ip.or(flags.external_ip.take());
        flags.helm_bin = self.helm_bin.or(flags.helm_bin.take());

        set(&mut flags.namespace, self.namespace);
        set(&mut flags.user_cluster_role, self.user_cluster_role);
        set(&mut flags.tiller_cluster_role, self.tiller_cluster_role);
        set(&mut flags.tiller_namespace, self.tiller_namespace);
        set(&mut flags.ingress_namespace, self.ingress_namespace);
        set(&mut flags.ingress_service, self.ingress_service);
        set(&mut flags.ingress_deployment, self.ingress_deployment);
        set(&mut flags.versions_repository, self.versions_repository);
        set(&mut flags.versions_git_ref, self.versions_git_ref);

        flags.draft_client |= self.draft_client;
        flags.helm_client |= self.helm_client;
        flags.helm3 |= self.helm3;
        flags.recreate_existing_draft_repos |= self.recreate_existing_draft_repos;
        flags.skip_tiller |= self.skip_tiller;
        flags.skip_cluster_role |= self.skip_cluster_role;
        flags.skip_ingress |= self.skip_ingress;
        flags.on_premise |= self.on_premise;
        flags.no_git_validate |= self.no_git_validate;
        flags.external_dns |= self.external_dns;
        flags.advanced_mode |= self.advanced_mode;

        if let Some(v) = self.no_tiller {
            flags.no_tiller = v;
        }
        if let Some(v) = self.remote_tiller {
            flags.remote_tiller = v;
        }
        if let Some(v) = self.global_tiller {
            flags.global_tiller = v;
        }
    }
}
