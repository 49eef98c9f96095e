//! Git identity validation

use kubeprep_cluster::GitConfig;
use kubeprep_core::{Error, Prompter, Result};
use tracing::info;

const IDENTITY: [(&str, &str, &str); 2] = [
    (
        "user.name",
        "Please enter the name you wish to use with git",
        "Your Name",
    ),
    (
        "user.email",
        "Please enter the email address you wish to use with git",
        "you@example.com",
    ),
];

/// Make sure a global git name and email are configured
///
/// Missing values are asked for and stored globally. In batch mode a missing
/// value is an error naming the command that fixes it.
pub async fn validate_git(git: &dyn GitConfig, prompter: &dyn Prompter) -> Result<()> {
    for (key, question, example) in IDENTITY {
        if git.get(key).await?.is_some() {
            continue;
        }

        let missing = || {
            Error::Git(format!(
                "No Git {key} is defined. Please run the command: git config --global --add {key} \"{example}\""
            ))
        };

        if prompter.is_batch() {
            return Err(missing());
        }

        let value = prompter.input(question, "")?;
        let value = value.trim();
        if value.is_empty() {
            return Err(missing());
        }

        git.set_global(key, value).await?;
        info!("Git {} set to {}", key, value);
    }
    Ok(())
}
