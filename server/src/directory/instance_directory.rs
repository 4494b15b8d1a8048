use std::collections::{BTreeMap, BTreeSet};

use log::info;

use replikit_shared::{InstanceId, StatePatch, StateValue, UserKey};

use super::replication_state::ReplicationState;

#[derive(Default)]
struct LiveInstance {
    // users that were told the instance exists
    visible_users: BTreeSet<UserKey>,
    // users that received the Init payload
    hydrated_users: BTreeSet<UserKey>,
}

/// Index of every started authoritative instance, plus what each user knows
/// about it.
///
/// The live index and the [`ReplicationState`] are only ever changed
/// together, so an id is either present in both or in neither.
#[derive(Default)]
pub struct InstanceDirectory {
    live: BTreeMap<InstanceId, LiveInstance>,
    state: ReplicationState,
}

impl InstanceDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` if the instance was already registered
    pub fn register_instance(&mut self, id: InstanceId, snapshot: StateValue) -> bool {
        if self.live.contains_key(&id) {
            return false;
        }

        self.live.insert(id, LiveInstance::default());
        self.state.insert(id, snapshot);
        info!("InstanceDirectory: registered {}", id);
        true
    }

    /// Removes the instance and returns the users it was visible to
    pub fn unregister_instance(&mut self, id: &InstanceId) -> Option<BTreeSet<UserKey>> {
        let instance = self.live.remove(id)?;
        self.state.remove(id);
        info!("InstanceDirectory: unregistered {}", id);
        Some(instance.visible_users)
    }

    pub fn contains(&self, id: &InstanceId) -> bool {
        self.live.contains_key(id)
    }

    /// Live ids, oldest first
    pub fn ids(&self) -> impl Iterator<Item = &InstanceId> {
        self.live.keys()
    }

    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    pub fn replication_state(&self) -> &ReplicationState {
        &self.state
    }

    pub fn snapshot(&self, id: &InstanceId) -> Option<&StateValue> {
        self.state.get(id).map(|entry| entry.snapshot())
    }

    pub(crate) fn record_state(&mut self, id: &InstanceId, state: StateValue) -> Option<StatePatch> {
        self.state.record(id, state)
    }

    // Visibility

    pub fn is_visible(&self, id: &InstanceId, user_key: &UserKey) -> bool {
        self.live
            .get(id)
            .is_some_and(|instance| instance.visible_users.contains(user_key))
    }

    pub fn is_hydrated(&self, id: &InstanceId, user_key: &UserKey) -> bool {
        self.live
            .get(id)
            .is_some_and(|instance| instance.hydrated_users.contains(user_key))
    }

    pub fn visible_users(&self, id: &InstanceId) -> Vec<UserKey> {
        self.live
            .get(id)
            .map(|instance| instance.visible_users.iter().copied().collect())
            .unwrap_or_default()
    }

    pub(crate) fn mark_visible(&mut self, id: &InstanceId, user_key: &UserKey) {
        if let Some(instance) = self.live.get_mut(id) {
            instance.visible_users.insert(*user_key);
        }
    }

    pub(crate) fn mark_hydrated(&mut self, id: &InstanceId, user_key: &UserKey) {
        if let Some(instance) = self.live.get_mut(id) {
            instance.visible_users.insert(*user_key);
            instance.hydrated_users.insert(*user_key);
        }
    }

    /// The user no longer knows about this instance
    pub(crate) fn forget(&mut self, id: &InstanceId, user_key: &UserKey) {
        if let Some(instance) = self.live.get_mut(id) {
            instance.visible_users.remove(user_key);
            instance.hydrated_users.remove(user_key);
        }
    }

    pub(crate) fn forget_user(&mut self, user_key: &UserKey) {
        for instance in self.live.values_mut() {
            instance.visible_users.remove(user_key);
            instance.hydrated_users.remove(user_key);
        }
    }
}
