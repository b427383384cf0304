//! Run a full merge: parse every source, back up, rewrite.

use std::fs::{File, OpenOptions};
use std::io::BufReader;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::backup::backup;
use crate::config::{MergeConfig, in_home};
use crate::parse::MergeContext;
use crate::save::save;

/// Outcome of a successful merge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeReport {
    /// History files parsed, the primary included
    pub files_merged: usize,

    /// Logical lines read across all files, duplicates included
    pub commands_seen: usize,

    /// Distinct commands in the rewritten primary file
    pub commands_saved: usize,

    pub primary: PathBuf,
    pub backup: PathBuf,
}

/// Merge every configured history file into the primary one.
///
/// The primary file is opened first and kept open until the rewrite, and it
/// is backed up before anything replaces it. Secondary sources that cannot
/// be opened are skipped. Sources marked `retire` are renamed to
/// `<name>.bak` only after the merged history has been saved.
pub fn merge(config: &MergeConfig, home: &Path) -> Result<MergeReport, Error> {
    let primary_path = in_home(home, &config.primary);
    let backup_path = in_home(home, &config.backup);

    let mut primary = OpenOptions::new()
        .read(true)
        .write(true)
        .open(&primary_path)
        .map_err(|e| Error::OpenPrimary {
            path: primary_path.display().to_string(),
            source: e,
        })?;

    let mut cx = MergeContext::new();
    cx.parse(BufReader::new(&primary))
        .map_err(|e| Error::Read {
            path: primary_path.display().to_string(),
            source: e,
        })?;

    let mut retired = Vec::new();
    for source in &config.sources {
        let path = in_home(home, &source.path);
        let file = match File::open(&path) {
            Ok(file) => file,
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "skipping history source");
                continue;
            }
        };

        cx.parse(BufReader::new(file)).map_err(|e| Error::Read {
            path: path.display().to_string(),
            source: e,
        })?;
        if source.retire {
            retired.push(path);
        }
    }

    backup(&mut primary, &backup_path).map_err(|e| Error::Backup {
        path: backup_path.display().to_string(),
        source: e,
    })?;

    save(&primary_path, cx.store()).map_err(|e| Error::Save {
        path: primary_path.display().to_string(),
        source: e,
    })?;
    drop(primary);

    for path in retired {
        retire(&path);
    }

    Ok(MergeReport {
        files_merged: cx.files_processed(),
        commands_seen: cx.commands_processed(),
        commands_saved: cx.store().len(),
        primary: primary_path,
        backup: backup_path,
    })
}

/// Move a merged source out of the way so it is not merged again.
fn retire(path: &Path) {
    let mut retired = path.as_os_str().to_owned();
    retired.push(".bak");

    if let Err(e) = std::fs::rename(path, &retired) {
        tracing::warn!(path = %path.display(), error = %e, "failed to retire history source");
    }
}

/// Errors that abort a merge.
#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to open history file '{path}'")]
    OpenPrimary {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read history file '{path}'")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to back up history to '{path}'")]
    Backup {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to save history to '{path}'")]
    Save {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
