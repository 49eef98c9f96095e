//! Init defaults file loading

use super::flags::InitFlags;
use crate::error::{Error, Result};
use camino::Utf8Path;
use std::fs;

impl InitFlags {
    /// Load init defaults from a YAML file
    ///
    /// Keys are the kebab-case option names; anything absent keeps its
    /// built-in default.
    pub fn load(path: &Utf8Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::config_not_found(path.as_str())
            } else {
                Error::Io(e)
            }
        })?;

        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        Ok(serde_yaml_ng::from_str(&content)?)
    }

    /// Load the named file, or the built-in defaults when none is named
    ///
    /// A named file that does not exist is an error.
    pub fn load_or_default(path: Option<&Utf8Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }
}
