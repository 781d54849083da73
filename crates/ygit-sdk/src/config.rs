//! User identity configuration.
//!
//! Two TOML documents hold `{username, email}`: a local one inside the
//! repository metadata directory and a global one in the user's home
//! directory. Local values take precedence. The core never reads these; they
//! exist for the `config` command.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::error::{SdkError, SdkResult};

/// File name of the local configuration inside the metadata directory.
pub const LOCAL_CONFIG_FILE: &str = "config.toml";

/// File name of the global configuration inside the home directory.
pub const GLOBAL_CONFIG_FILE: &str = ".ygitconfig.toml";

/// Environment variable overriding the global configuration path.
pub const GLOBAL_CONFIG_ENV: &str = "YGIT_CONFIG_GLOBAL";

/// Which configuration document to act on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConfigScope {
    Local,
    Global,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl Config {
    /// Load a configuration document; a missing file yields the default.
    pub fn load(path: &Path) -> SdkResult<Self> {
        let data = match fs::read_to_string(path) {
            Ok(data) => data,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(e.into()),
        };
        toml::from_str(&data).map_err(|e| SdkError::Config(format!("{}: {e}", path.display())))
    }

    /// Write the document atomically, creating parent directories.
    pub fn save(&self, path: &Path) -> SdkResult<()> {
        let data = toml::to_string(self).map_err(|e| SdkError::Config(e.to_string()))?;
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir)?;

        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(data.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(path).map_err(|e| SdkError::Io(e.error))?;
        Ok(())
    }

    /// Layer `self` over `fallback`: fields set here win.
    fn or(self, fallback: Config) -> Config {
        Config {
            username: self.username.or(fallback.username),
            email: self.email.or(fallback.email),
        }
    }

    /// Load local over global. Either path may be absent.
    pub fn resolve(local: Option<&Path>, global: Option<&Path>) -> SdkResult<Self> {
        let local = local.map(Self::load).transpose()?.unwrap_or_default();
        let global = global.map(Self::load).transpose()?.unwrap_or_default();
        Ok(local.or(global))
    }

    /// Returns `true` if neither field is set.
    pub fn is_empty(&self) -> bool {
        self.username.is_none() && self.email.is_none()
    }
}

/// Location of the global configuration document.
///
/// `$YGIT_CONFIG_GLOBAL` if set, otherwise `$HOME/.ygitconfig.toml`.
pub fn global_config_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os(GLOBAL_CONFIG_ENV) {
        return Some(PathBuf::from(path));
    }
    std::env::var_os("HOME").map(|home| PathBuf::from(home).join(GLOBAL_CONFIG_FILE))
}
