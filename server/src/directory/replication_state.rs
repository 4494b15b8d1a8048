use std::collections::HashMap;

use replikit_shared::{diff, InstanceId, StatePatch, StateValue};

pub struct ReplicationEntry {
    snapshot: StateValue,
}

impl ReplicationEntry {
    pub fn snapshot(&self) -> &StateValue {
        &self.snapshot
    }
}

/// Last replicated snapshot of every live instance. Hydration reads it, and
/// patches are diffed against it.
#[derive(Default)]
pub struct ReplicationState {
    entries: HashMap<InstanceId, ReplicationEntry>,
}

impl ReplicationState {
    pub(crate) fn insert(&mut self, id: InstanceId, snapshot: StateValue) {
        self.entries.insert(id, ReplicationEntry { snapshot });
    }

    pub(crate) fn remove(&mut self, id: &InstanceId) -> Option<ReplicationEntry> {
        self.entries.remove(id)
    }

    /// Stores `state` as the new snapshot and returns what changed since the
    /// previous one
    pub(crate) fn record(&mut self, id: &InstanceId, state: StateValue) -> Option<StatePatch> {
        let entry = self.entries.get_mut(id)?;
        let patch = diff(&entry.snapshot, &state)?;
        entry.snapshot = state;
        Some(patch)
    }

    pub fn get(&self, id: &InstanceId) -> Option<&ReplicationEntry> {
        self.entries.get(id)
    }

    pub fn contains(&self, id: &InstanceId) -> bool {
        self.entries.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
