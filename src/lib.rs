//! Histmerge: fold several shell history files into one zsh history.
//!
//! Histmerge reads the zsh history file together with any legacy history
//! files (the pre-oh-my-zsh backup, bash history), keeps one entry per
//! distinct command stamped with its latest use, and rewrites the zsh
//! history in time order after taking a backup.
//!
//! # Architecture
//!
//! - **Classify**: Recognize zsh extended-history lines
//! - **Parse**: Read history sources into a shared context
//! - **Store**: Deduplicate commands and order them by timestamp
//! - **Backup**: Snapshot the primary file before it is replaced
//! - **Save**: Serialize the merged history and swap it in atomically
//! - **Merge**: Drive the whole run from a [`MergeConfig`]

mod backup;
mod classify;
pub mod config;
pub mod merge;
mod parse;
mod save;
mod store;

pub use backup::backup;
pub use classify::classify;
pub use config::{MergeConfig, SourceConfig};
pub use merge::{MergeReport, merge};
pub use parse::MergeContext;
pub use save::{save, write_history};
pub use store::{DedupStore, Timestamp};
