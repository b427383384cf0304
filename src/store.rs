//! Deduplicated command table.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::collections::hash_map::Entry;

/// When a command was run.
///
/// Commands from legacy history carry no time at all, so they are numbered
/// in the order they were read. Those always sort before recorded stamps:
/// untimestamped history predates the extended history that replaced it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Timestamp {
    /// Position of an untimestamped command in the overall read order.
    Synthetic(u64),

    /// The `: <epoch>:<elapsed>;` prefix of a zsh extended-history line.
    ///
    /// The digits are kept as written so the prefix is re-emitted unchanged.
    Recorded { epoch: String, elapsed: String },
}

impl Timestamp {
    /// The on-disk prefix for this stamp, if it has one.
    pub fn prefix(&self) -> Option<String> {
        match self {
            Timestamp::Synthetic(_) => None,
            Timestamp::Recorded { epoch, elapsed } => Some(format!(": {epoch}:{elapsed};")),
        }
    }
}

impl Ord for Timestamp {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Timestamp::Synthetic(a), Timestamp::Synthetic(b)) => a.cmp(b),
            (Timestamp::Synthetic(_), Timestamp::Recorded { .. }) => Ordering::Less,
            (Timestamp::Recorded { .. }, Timestamp::Synthetic(_)) => Ordering::Greater,
            (
                Timestamp::Recorded {
                    epoch: a_epoch,
                    elapsed: a_elapsed,
                },
                Timestamp::Recorded {
                    epoch: b_epoch,
                    elapsed: b_elapsed,
                },
            ) => cmp_decimal(a_epoch, b_epoch)
                .then_with(|| cmp_decimal(a_elapsed, b_elapsed))
                .then_with(|| a_epoch.cmp(b_epoch))
                .then_with(|| a_elapsed.cmp(b_elapsed)),
        }
    }
}

impl PartialOrd for Timestamp {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Compare two runs of ASCII digits by numeric value, whatever their width.
fn cmp_decimal(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

/// Every distinct command seen during a merge, with the latest stamp for each.
///
/// Commands are remembered in first-seen order; that order breaks ties when
/// two commands share a stamp.
#[derive(Debug, Default)]
pub struct DedupStore {
    order: Vec<Vec<u8>>,
    stamps: HashMap<Vec<u8>, Timestamp>,
}

impl DedupStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an occurrence of `command`.
    ///
    /// Returns `true` if the command was new or `timestamp` is later than the
    /// one already stored.
    pub fn upsert(&mut self, command: &[u8], timestamp: Timestamp) -> bool {
        match self.stamps.entry(command.to_vec()) {
            Entry::Vacant(slot) => {
                self.order.push(command.to_vec());
                slot.insert(timestamp);
                true
            }
            Entry::Occupied(mut slot) => {
                if timestamp > *slot.get() {
                    slot.insert(timestamp);
                    true
                } else {
                    false
                }
            }
        }
    }

    /// The stored stamp for `command`.
    pub fn get(&self, command: &[u8]) -> Option<&Timestamp> {
        self.stamps.get(command)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty() || self.stamps.is_empty()
    }

    /// All entries, oldest first.
    ///
    /// The sort is stable, so equal stamps keep their first-seen order.
    pub fn sorted(&self) -> Vec<(&[u8], &Timestamp)> {
        let mut entries: Vec<(&[u8], &Timestamp)> = self
            .order
            .iter()
            .filter_map(|cmd| self.stamps.get(cmd).map(|ts| (cmd.as_slice(), ts)))
            .collect();
        entries.sort_by(|a, b| a.1.cmp(b.1));
        entries
    }
}
