//! External command execution

use kubeprep_core::{Error, Result};
use std::process::Output;
use tokio::process::Command;
use tracing::debug;

/// Run `program` and return its raw output, whatever the exit status
pub(crate) async fn output(program: &str, args: &[&str]) -> Result<Output> {
    if which::which(program).is_err() {
        return Err(Error::missing_executable(program));
    }

    debug!("Running: {} {}", program, args.join(" "));
    Ok(Command::new(program).args(args).output().await?)
}

/// Run `program` and return its trimmed stdout; a non-zero exit is an error
pub(crate) async fn run(program: &str, args: &[&str]) -> Result<String> {
    let output = output(program, args).await?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(Error::command(program, args, stderr));
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}
