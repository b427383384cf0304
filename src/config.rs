//! Which files take part in a merge.
//!
//! The defaults describe a typical zsh setup: `~/.zsh_history` is the file
//! being rewritten, `~/.zsh_history.pre-oh-my-zsh` is folded in once and then
//! moved aside, and `~/.bash_history` is folded in on every run. A TOML file
//! can override any of it:
//!
//! ```toml
//! primary = ".zsh_history"
//! backup = ".zsh_history.bak"
//!
//! [[source]]
//! path = ".bash_history"
//! ```

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use serde::Deserialize;

/// The complete merge configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MergeConfig {
    /// History file that is read, backed up and rewritten
    pub primary: PathBuf,

    /// Where the pre-merge copy of `primary` is written
    pub backup: PathBuf,

    /// Extra history files to fold in, in order
    #[serde(rename = "source")]
    pub sources: Vec<SourceConfig>,
}

/// An additional history file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SourceConfig {
    pub path: PathBuf,

    /// Rename the file to `<name>.bak` once it has been merged
    #[serde(default)]
    pub retire: bool,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            primary: PathBuf::from(".zsh_history"),
            backup: PathBuf::from(".zsh_history.bak"),
            sources: vec![
                SourceConfig {
                    path: PathBuf::from(".zsh_history.pre-oh-my-zsh"),
                    retire: true,
                },
                SourceConfig {
                    path: PathBuf::from(".bash_history"),
                    retire: false,
                },
            ],
        }
    }
}

impl MergeConfig {
    /// Parse a configuration from TOML content.
    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Read and parse a configuration file.
    pub fn load(path: &Path) -> Result<Self, Error> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::Read {
            path: path.display().to_string(),
            source: e,
        })?;
        Ok(Self::from_toml(&content)?)
    }
}

/// Pick the home directory: an explicit override, or `$HOME`.
pub fn resolve_home(explicit: Option<PathBuf>) -> Result<PathBuf, Error> {
    home_from(explicit, std::env::var_os("HOME"))
}

/// An empty value counts as missing, and an empty override does not fall
/// back to the environment.
fn home_from(explicit: Option<PathBuf>, env: Option<OsString>) -> Result<PathBuf, Error> {
    let home = match explicit {
        Some(path) => path,
        None => PathBuf::from(env.ok_or(Error::NoHome)?),
    };
    if home.as_os_str().is_empty() {
        return Err(Error::NoHome);
    }
    Ok(home)
}

/// Resolve a configured path against the home directory.
///
/// Absolute paths are returned unchanged.
pub fn in_home(home: &Path, path: &Path) -> PathBuf {
    home.join(path)
}

/// Errors from loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("no home directory: set $HOME or pass --home")]
    NoHome,

    #[error("failed to read config file '{path}'")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
}
