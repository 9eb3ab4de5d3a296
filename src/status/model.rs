use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Last known state of one Vagrant machine
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct InstanceStatus {
    pub id: String,
    pub name: String,
    pub provider: String,
    /// Opaque state text as reported by vagrant (running, poweroff, saved, ...)
    pub state: String,
    /// Vagrantfile directory of the machine
    pub cwd: String,
}

impl InstanceStatus {
    /// Record for an id the cache does not know: only `id` is set.
    pub fn placeholder(id: impl Into<String>) -> Self {
        InstanceStatus {
            id: id.into(),
            ..Default::default()
        }
    }

    /// True when every field the change detector looks at is equal.
    pub fn same_state(&self, other: &InstanceStatus) -> bool {
        self.name == other.name
            && self.provider == other.provider
            && self.state == other.state
            && self.cwd == other.cwd
    }
}

/// All instances returned by one global status query, keyed by id
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatusSnapshot {
    statuses: HashMap<String, InstanceStatus>,
}

impl StatusSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.statuses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statuses.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&InstanceStatus> {
        self.statuses.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.statuses.contains_key(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.statuses.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &InstanceStatus> {
        self.statuses.values()
    }
}

impl FromIterator<InstanceStatus> for StatusSnapshot {
    /// Later records with a duplicate id replace earlier ones.
    fn from_iter<T: IntoIterator<Item = InstanceStatus>>(iter: T) -> Self {
        let statuses = iter
            .into_iter()
            .map(|status| (status.id.clone(), status))
            .collect();
        StatusSnapshot { statuses }
    }
}
