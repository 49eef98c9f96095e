//! Cluster role binding for the invoking user

use kubeprep_cluster::{KubeClient, Subject};
use kubeprep_core::config::options;
use kubeprep_core::naming::to_valid_name;
use kubeprep_core::retry::retry;
use kubeprep_core::{Error, Prompter, Result, RetryPolicy};
use tracing::{debug, info};

/// Name of the binding granting `role` to `user`
pub fn role_binding_name(user: &str, role: &str) -> String {
    to_valid_name(&format!("{}-{}-binding", to_valid_name(user), role))
}

/// The user to bind: the flag, else the current kubeconfig user, else asked for
pub fn resolve_username(
    flag: Option<&str>,
    current_user: Option<&str>,
    prompter: &dyn Prompter,
) -> Result<String> {
    if let Some(user) = non_blank(flag).or_else(|| non_blank(current_user)) {
        return Ok(user.to_string());
    }

    if prompter.is_batch() {
        return Err(Error::missing_option(options::USERNAME));
    }

    let user = prompter.input("Enter your username", "")?;
    let user = user.trim();
    if user.is_empty() {
        return Err(Error::missing_option(options::USERNAME));
    }
    Ok(user.to_string())
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Get-or-create the cluster role binding for `user`
///
/// A binding that already exists, or appears while creating it, counts as
/// success. Returns the binding name.
pub async fn ensure_user_role_binding(
    kube: &dyn KubeClient,
    user: &str,
    role: &str,
) -> Result<String> {
    let name = role_binding_name(user, role);
    let subject = Subject::User(user.to_string());

    retry("cluster role binding", &RetryPolicy::ROLE_BINDING, || async {
        if kube.cluster_role_binding_exists(&name).await? {
            debug!("Cluster role binding {} already exists", name);
            return Ok(());
        }
        match kube.create_cluster_role_binding(&name, role, &subject).await {
            Err(e) if e.is_already_exists() => Ok(()),
            other => other,
        }
    })
    .await?;

    info!("User {} has the {} cluster role", user, role);
    Ok(name)
}
