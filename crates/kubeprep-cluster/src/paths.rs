//! Well-known local paths

use camino::Utf8PathBuf;
use kubeprep_core::{Error, Result};

/// The user's home directory
///
/// `HOME` wins over `dirs::home_dir()` so containers that remap it are honoured.
pub fn home_dir() -> Result<Utf8PathBuf> {
    let home = match std::env::var_os("HOME").filter(|h| !h.is_empty()) {
        Some(home) => home.into(),
        None => dirs::home_dir()
            .ok_or_else(|| Error::invalid_config("Could not determine home directory"))?,
    };
    Utf8PathBuf::try_from(home)
        .map_err(|_| Error::invalid_config("Home directory path is not valid UTF-8"))
}

/// Directory holding kubeprep's local state (`~/.kubeprep`)
pub fn kubeprep_dir() -> Result<Utf8PathBuf> {
    Ok(home_dir()?.join(".kubeprep"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_kubeprep_dir_under_home() {
        if std::env::var("HOME").is_ok() {
            let dir = kubeprep_dir().unwrap();
            assert!(dir.ends_with(".kubeprep"));
            assert!(dir.starts_with(home_dir().unwrap()));
        }
    }
}
