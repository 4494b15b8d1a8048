use crate::{InstanceId, StateValue, SyncPayload, UserKey};

/// Application-defined half of a shared class.
///
/// A class factory returns one of these for every instance. Only
/// [`SharedBehavior::initial_state`] is required; the replication overrides
/// default to "everyone sees everything, unmodified".
pub trait SharedBehavior {
    /// State the instance holds before its first dispatch or hydration
    fn initial_state(&self) -> StateValue;

    /// Called once, when the instance starts
    fn on_start(&mut self, _id: &InstanceId) {}

    /// Called once, when the instance is destroyed
    fn on_destroy(&mut self, _id: &InstanceId) {}

    /// Whether `user` may know about this instance at all. A user failing
    /// this check is never announced the instance, never hydrated, never
    /// patched.
    fn resolve_replication_for_player(&self, _user: &UserKey) -> bool {
        true
    }

    /// Whether a particular payload is forwarded to `user`. The payload is
    /// shared between users and must not be relied upon after returning.
    fn resolve_is_sync_for_player(&self, _user: &UserKey, _payload: &SyncPayload) -> bool {
        true
    }

    /// Per-user redaction of a payload before it is sent
    fn resolve_sync_for_player(&self, _user: &UserKey, payload: SyncPayload) -> SyncPayload {
        payload
    }
}
